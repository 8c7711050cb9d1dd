//! Guest memory access, split into messages within the payload cap.

use citra_rpc_proto::{MAX_MEMORY_REQUEST_DATA_SIZE, MAX_WRITE_CHUNK, Request};
use tracing::{trace, warn};

use crate::client::Client;
use crate::error::Result;
use crate::transport::Transport;

/// Most bytes reserved up front by [`Client::read_memory`]. Longer reads
/// grow the buffer chunk by chunk.
const READ_PREALLOC: usize = MAX_MEMORY_REQUEST_DATA_SIZE * 64;

impl<T: Transport> Client<T> {
    /// Reads `size` bytes of guest memory starting at `address`.
    ///
    /// Issues one request per [`MAX_MEMORY_REQUEST_DATA_SIZE`] bytes. The
    /// server may return fewer bytes than asked; the next request starts
    /// right after what was actually returned. Returns `None` if any
    /// reply is rejected or makes no progress; data read before that
    /// point is dropped.
    pub fn read_memory(&mut self, address: u32, size: usize) -> Result<Option<Vec<u8>>> {
        let mut data = Vec::with_capacity(size.min(READ_PREALLOC));
        let mut cursor = address;
        let mut remaining = size;

        while remaining > 0 {
            let want = remaining.min(MAX_MEMORY_REQUEST_DATA_SIZE);
            #[allow(clippy::cast_possible_truncation)]
            let req = Request::ReadMemory {
                address: cursor,
                size: want as u32,
            };
            let Some(chunk) = self.call(&req)? else {
                warn!(address = cursor, remaining, "memory read rejected");
                return Ok(None);
            };
            if chunk.is_empty() || chunk.len() > want {
                warn!(
                    address = cursor,
                    requested = want,
                    returned = chunk.len(),
                    "memory read returned an unusable chunk"
                );
                return Ok(None);
            }
            trace!(address = cursor, len = chunk.len(), "read chunk");

            #[allow(clippy::cast_possible_truncation)]
            let advance = chunk.len() as u32;
            cursor = cursor.wrapping_add(advance);
            remaining -= chunk.len();
            data.extend_from_slice(&chunk);
        }

        Ok(Some(data))
    }

    /// Writes `data` to guest memory starting at `address`.
    ///
    /// Sends [`MAX_WRITE_CHUNK`] bytes per request. Stops at the first
    /// rejected reply and returns `false`; chunks already written stay
    /// written.
    pub fn write_memory(&mut self, address: u32, data: &[u8]) -> Result<bool> {
        let mut cursor = address;

        for chunk in data.chunks(MAX_WRITE_CHUNK) {
            let req = Request::WriteMemory {
                address: cursor,
                data: chunk,
            };
            if self.call(&req)?.is_none() {
                warn!(address = cursor, len = chunk.len(), "memory write rejected");
                return Ok(false);
            }
            trace!(address = cursor, len = chunk.len(), "wrote chunk");

            #[allow(clippy::cast_possible_truncation)]
            let advance = chunk.len() as u32;
            cursor = cursor.wrapping_add(advance);
        }

        Ok(true)
    }
}
