//! Error types for RPC client operations.

use citra_rpc_proto::{ProtoError, RequestType};

/// Alias for `Result<T, citra_rpc::Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by client operations.
///
/// A reply whose version or type does not match the request is not an
/// error: operations report it as `None` or `false`.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The stream closed before a header or payload was complete.
    #[error("unexpected end of stream: expected {expected} bytes, received {received}")]
    UnexpectedEof {
        /// Bytes the read needed.
        expected: usize,
        /// Bytes accumulated before the stream closed.
        received: usize,
    },

    /// A reply that could not be interpreted for its request.
    #[error("unexpected {request} reply: {detail}")]
    UnexpectedReply {
        /// The request that provoked the reply.
        request: RequestType,
        /// What was wrong with it.
        detail: String,
    },

    /// Resolution factor 0 is not accepted by the emulator.
    #[error("invalid resolution: must be non-zero")]
    InvalidResolution,

    /// Screen refresh rate outside `1..=1000`.
    #[error("invalid screen refresh rate {0}: must be within 1..=1000")]
    InvalidRefreshRate(f32),

    /// Client configuration could not be used.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A request could not be encoded.
    #[error(transparent)]
    Proto(#[from] ProtoError),

    /// An I/O error from the underlying stream.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the connection failed. The stream is no longer usable.
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::UnexpectedEof { .. } | Self::Io(_))
    }

    /// Whether the caller's input was rejected before anything was sent.
    pub const fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::InvalidResolution | Self::InvalidRefreshRate(_) | Self::Proto(_)
        )
    }
}
