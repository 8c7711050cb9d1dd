//! Blocking byte-stream transport.

use std::io::{Read, Write};

use crate::error::{Error, Result};

/// Largest buffer used when discarding unwanted payload bytes.
const DISCARD_CHUNK: usize = 4096;

/// Most bytes reserved before a read. Larger replies grow as data arrives,
/// so a garbled length field cannot force a huge allocation.
const RECEIVE_PREALLOC: usize = 64 * 1024;

/// A connected, reliable, ordered byte stream.
///
/// Implemented for every [`Read`] + [`Write`] type, so a [`TcpStream`]
/// or an in-memory buffer can back a [`Client`](crate::Client).
///
/// [`TcpStream`]: std::net::TcpStream
pub trait Transport {
    /// Writes the whole buffer, looping over partial writes.
    fn send_all(&mut self, buf: &[u8]) -> Result<()>;

    /// Reads exactly `n` bytes, concatenating partial reads.
    ///
    /// Fails with [`Error::UnexpectedEof`] if the stream ends first.
    fn receive_exact(&mut self, n: usize) -> Result<Vec<u8>>;

    /// Reads and drops exactly `n` bytes.
    fn discard(&mut self, n: usize) -> Result<()> {
        let mut left = n;
        while left > 0 {
            let step = left.min(DISCARD_CHUNK);
            self.receive_exact(step).map_err(|e| match e {
                Error::UnexpectedEof { received, .. } => Error::UnexpectedEof {
                    expected: n,
                    received: n - left + received,
                },
                other => other,
            })?;
            left -= step;
        }
        Ok(())
    }
}

impl<S: Read + Write + ?Sized> Transport for S {
    fn send_all(&mut self, buf: &[u8]) -> Result<()> {
        self.write_all(buf)?;
        self.flush()?;
        Ok(())
    }

    fn receive_exact(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(n.min(RECEIVE_PREALLOC));
        let limit = u64::try_from(n).unwrap_or(u64::MAX);
        Read::take(&mut *self, limit).read_to_end(&mut buf)?;
        if buf.len() < n {
            return Err(Error::UnexpectedEof {
                expected: n,
                received: buf.len(),
            });
        }
        Ok(buf)
    }
}
