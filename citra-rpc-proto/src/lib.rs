//! Wire protocol for the Citra emulator RPC interface.
//!
//! Every message is a 12-byte [`Header`] followed by exactly
//! `payload_size` bytes. All integers and floats are little-endian:
//!
//! ```text
//! ┌──────────┬──────────┬──────────────┬─────────────────────────┐
//! │ version  │ type     │ payload_size │ payload                 │
//! │ u32 LE   │ u32 LE   │ u32 LE       │ payload_size bytes      │
//! └──────────┴──────────┴──────────────┴─────────────────────────┘
//! ```
//!
//! Request payloads start with two `u32` fields. Memory requests use them
//! for `(address, size)`; every other request leaves them zeroed.

mod button;
mod error;
mod header;
mod message;

pub use button::Button;
pub use error::ProtoError;
pub use header::{HEADER_SIZE, Header, encode_header};
pub use message::{
    DEFAULT_PORT, MAX_MEMORY_REQUEST_DATA_SIZE, MAX_WRITE_CHUNK, MEMORY_REQUEST_OVERHEAD,
    PROTOCOL_VERSION, Request, RequestType,
};
