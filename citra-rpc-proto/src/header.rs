//! Fixed-size message header.

use crate::error::ProtoError;
use crate::message::{PROTOCOL_VERSION, RequestType};

/// Header size in bytes: three little-endian `u32` fields.
pub const HEADER_SIZE: usize = 12;

/// Header preceding every request and reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Protocol version of the sender.
    pub version: u32,
    /// Raw request type tag. Kept raw so replies carrying an unknown tag
    /// can still be parsed and rejected.
    pub request_type: u32,
    /// Number of payload bytes following the header.
    pub payload_size: u32,
}

impl Header {
    /// Builds a header for a request of `request_type` carrying
    /// `payload_size` bytes at the current protocol version.
    pub fn new(request_type: RequestType, payload_size: usize) -> Result<Self, ProtoError> {
        let payload_size =
            u32::try_from(payload_size).map_err(|_| ProtoError::PayloadTooLarge(payload_size))?;
        Ok(Self {
            version: PROTOCOL_VERSION,
            request_type: request_type.as_u32(),
            payload_size,
        })
    }

    /// Serializes the header to its wire form.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(&self.version.to_le_bytes());
        buf[4..8].copy_from_slice(&self.request_type.to_le_bytes());
        buf[8..12].copy_from_slice(&self.payload_size.to_le_bytes());
        buf
    }

    /// Parses a header from exactly [`HEADER_SIZE`] bytes.
    pub fn decode(buf: &[u8]) -> Result<Self, ProtoError> {
        let bytes: &[u8; HEADER_SIZE] = buf
            .try_into()
            .map_err(|_| ProtoError::HeaderLength(buf.len()))?;
        Ok(Self::from_bytes(bytes))
    }

    /// Parses a header from its wire form.
    pub fn from_bytes(bytes: &[u8; HEADER_SIZE]) -> Self {
        let field =
            |i: usize| u32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);
        Self {
            version: field(0),
            request_type: field(4),
            payload_size: field(8),
        }
    }

    /// Returns the payload size as a buffer length.
    pub const fn payload_len(&self) -> usize {
        self.payload_size as usize
    }

    /// Whether this header is a valid reply to a request of `expected`:
    /// same protocol version and same type tag.
    pub const fn is_reply_to(&self, expected: RequestType) -> bool {
        self.version == PROTOCOL_VERSION && self.request_type == expected.as_u32()
    }

    /// Decodes the type tag, if it names a known request.
    pub fn kind(&self) -> Option<RequestType> {
        RequestType::try_from(self.request_type).ok()
    }
}

/// Serializes the header for a request of `request_type` carrying
/// `payload_size` bytes.
pub fn encode_header(
    request_type: RequestType,
    payload_size: usize,
) -> Result<[u8; HEADER_SIZE], ProtoError> {
    Header::new(request_type, payload_size).map(|h| h.to_bytes())
}
