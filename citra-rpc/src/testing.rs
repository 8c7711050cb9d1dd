//! In-memory stream and frame helpers for unit tests.

use std::io::{self, Cursor, Read, Write};

use citra_rpc_proto::{HEADER_SIZE, Header, PROTOCOL_VERSION, RequestType};

/// Scripted stream: reads come from a fixed buffer, writes are recorded.
#[derive(Debug)]
pub(crate) struct MockStream {
    /// Bytes served to the client.
    input: Cursor<Vec<u8>>,
    /// Bytes the client sent.
    output: Vec<u8>,
    /// Upper bound per `read` call, to exercise partial reads.
    max_read: usize,
}

impl MockStream {
    /// Serves `input` verbatim.
    pub(crate) fn new(input: Vec<u8>) -> Self {
        Self {
            input: Cursor::new(input),
            output: Vec::new(),
            max_read: usize::MAX,
        }
    }

    /// Serves the concatenation of `replies`.
    pub(crate) fn replying(replies: &[Vec<u8>]) -> Self {
        Self::new(replies.concat())
    }

    /// Caps every `read` call at `n` bytes.
    pub(crate) fn with_max_read(mut self, n: usize) -> Self {
        self.max_read = n;
        self
    }

    /// Everything written so far.
    pub(crate) fn written(&self) -> &[u8] {
        &self.output
    }

    /// Splits the written bytes into `(header, payload)` messages.
    pub(crate) fn sent(&self) -> Vec<(Header, Vec<u8>)> {
        let mut out = Vec::new();
        let mut rest = self.output.as_slice();
        while !rest.is_empty() {
            let header = Header::decode(&rest[..HEADER_SIZE]).unwrap();
            let end = HEADER_SIZE + header.payload_len();
            out.push((header, rest[HEADER_SIZE..end].to_vec()));
            rest = &rest[end..];
        }
        out
    }

    /// Whether every scripted byte has been consumed.
    pub(crate) fn drained(&self) -> bool {
        self.input.position() as usize == self.input.get_ref().len()
    }
}

impl Read for MockStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.max_read);
        self.input.read(&mut buf[..n])
    }
}

impl Write for MockStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.output.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A well-formed reply of `ty` carrying `payload`.
pub(crate) fn reply(ty: RequestType, payload: &[u8]) -> Vec<u8> {
    raw_reply(PROTOCOL_VERSION, ty.as_u32(), payload)
}

/// A reply with arbitrary header fields.
pub(crate) fn raw_reply(version: u32, ty: u32, payload: &[u8]) -> Vec<u8> {
    let header = Header {
        version,
        request_type: ty,
        payload_size: u32::try_from(payload.len()).unwrap(),
    };
    let mut out = header.to_bytes().to_vec();
    out.extend_from_slice(payload);
    out
}

/// Reads the `(address, size)` fields of a memory request payload.
pub(crate) fn address_and_size(payload: &[u8]) -> (u32, u32) {
    let word = |i: usize| u32::from_le_bytes(payload[i..i + 4].try_into().unwrap());
    (word(0), word(4))
}
