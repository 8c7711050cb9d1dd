//! Errors raised while encoding or decoding wire data.

/// Errors produced by the wire codec.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ProtoError {
    /// A type tag outside `1..=19`.
    #[error("unknown request type {0}")]
    UnknownRequestType(u32),

    /// A payload whose length does not fit the `u32` size field.
    #[error("payload of {0} bytes exceeds u32::MAX")]
    PayloadTooLarge(usize),

    /// A header buffer that is not exactly 12 bytes long.
    #[error("header must be 12 bytes, got {0}")]
    HeaderLength(usize),

    /// A button name that is not part of the pad bitmask.
    #[error("unknown button: {0}")]
    UnknownButton(String),
}
