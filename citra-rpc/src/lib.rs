//! Blocking client for the Citra emulator RPC interface.
//!
//! `citra-rpc` talks to the RPC server built into the emulator over a
//! single TCP connection: read and write guest memory, inject input
//! state, and drive execution (pause, resume, restart, frame stepping).
//!
//! # Quick start
//!
//! ```no_run
//! use citra_rpc::{Button, Client};
//!
//! let mut citra = Client::connect_default()?;
//! citra.pause()?;
//!
//! if let Some(bytes) = citra.read_memory(0x0010_0000, 64)? {
//!     println!("{bytes:02x?}");
//! }
//!
//! citra.set_override_controls(true, false, false, false)?;
//! citra.set_pad_state(Button::A | Button::START)?;
//! citra.resume()?;
//! # Ok::<(), citra_rpc::Error>(())
//! ```
//!
//! Replies with the wrong protocol version or type are not errors:
//! operations report them as `None` or `false`. Errors are reserved for
//! a broken connection, a reply that cannot be interpreted, and input
//! rejected before sending.

mod client;
mod config;
mod error;
mod framer;
mod memory;
#[cfg(test)]
mod testing;
mod transport;

pub use citra_rpc_proto::{
    Button, DEFAULT_PORT, HEADER_SIZE, Header, MAX_MEMORY_REQUEST_DATA_SIZE, MAX_WRITE_CHUNK,
    PROTOCOL_VERSION, ProtoError, Request, RequestType,
};
pub use client::{Client, MAX_REFRESH_RATE, MIN_REFRESH_RATE};
pub use config::{Config, ENV_HOST, ENV_PORT};
pub use error::{Error, Result};
pub use framer::{decode_and_validate_header, send_request};
pub use transport::Transport;
