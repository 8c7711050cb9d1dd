//! Request emission and reply validation on top of a [`Transport`].

use citra_rpc_proto::{HEADER_SIZE, Header, Request, RequestType};
use tracing::{debug, warn};

use crate::error::Result;
use crate::transport::Transport;

/// Encodes `req` as header + payload and sends it in one write.
pub fn send_request<T: Transport + ?Sized>(transport: &mut T, req: &Request<'_>) -> Result<()> {
    let frame = req.to_frame()?;
    debug!(
        request = %req.request_type(),
        size = frame.len() - HEADER_SIZE,
        "sending request"
    );
    transport.send_all(&frame)
}

/// Reads one reply and validates it against `expected`.
///
/// Returns the payload when the reply carries the client's protocol
/// version and the expected type tag, `None` otherwise. A rejected
/// reply's payload is still consumed so the next read starts on a header.
///
/// A stream that closes mid-header or mid-payload is an error, never
/// `None`.
pub fn decode_and_validate_header<T: Transport + ?Sized>(
    transport: &mut T,
    expected: RequestType,
) -> Result<Option<Vec<u8>>> {
    let raw = transport.receive_exact(HEADER_SIZE)?;
    let header = Header::decode(&raw)?;

    if !header.is_reply_to(expected) {
        warn!(
            expected = %expected,
            version = header.version,
            request_type = header.request_type,
            size = header.payload_size,
            "discarding mismatched reply"
        );
        transport.discard(header.payload_len())?;
        return Ok(None);
    }

    let payload = transport.receive_exact(header.payload_len())?;
    debug!(reply = %expected, size = payload.len(), "received reply");
    Ok(Some(payload))
}

#[cfg(test)]
mod tests {
    use citra_rpc_proto::PROTOCOL_VERSION;

    use super::*;
    use crate::error::Error;
    use crate::testing::{MockStream, raw_reply, reply};

    #[test]
    fn returns_payload_of_matching_reply() {
        let mut s = MockStream::new(reply(RequestType::GetCurrentFrame, &[1, 2, 3]));
        let got = decode_and_validate_header(&mut s, RequestType::GetCurrentFrame).unwrap();
        assert_eq!(got.as_deref(), Some(&[1, 2, 3][..]));
    }

    #[test]
    fn empty_payload_is_some() {
        let mut s = MockStream::new(reply(RequestType::Pause, &[]));
        let got = decode_and_validate_header(&mut s, RequestType::Pause).unwrap();
        assert_eq!(got, Some(Vec::new()));
    }

    #[test]
    fn type_mismatch_is_none_and_keeps_stream_aligned() {
        let mut s = MockStream::replying(&[
            reply(RequestType::Resume, &[7, 7, 7]),
            reply(RequestType::Pause, &[]),
        ]);
        assert_eq!(
            decode_and_validate_header(&mut s, RequestType::Pause).unwrap(),
            None
        );
        assert_eq!(
            decode_and_validate_header(&mut s, RequestType::Pause).unwrap(),
            Some(Vec::new())
        );
        assert!(s.drained());
    }

    #[test]
    fn version_mismatch_is_none() {
        let mut s = MockStream::new(raw_reply(
            PROTOCOL_VERSION + 1,
            RequestType::ReadMemory.as_u32(),
            &[0; 4],
        ));
        assert_eq!(
            decode_and_validate_header(&mut s, RequestType::ReadMemory).unwrap(),
            None
        );
    }

    #[test]
    fn eof_in_header_is_fatal() {
        let mut s = MockStream::new(vec![2, 0, 0, 0, 1]);
        let err = decode_and_validate_header(&mut s, RequestType::ReadMemory).unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedEof {
                expected: HEADER_SIZE,
                received: 5
            }
        ));
    }

    #[test]
    fn eof_in_payload_is_fatal() {
        let mut bytes = reply(RequestType::ReadMemory, &[1, 2, 3, 4]);
        bytes.truncate(HEADER_SIZE + 2);
        let mut s = MockStream::new(bytes).with_max_read(1);
        let err = decode_and_validate_header(&mut s, RequestType::ReadMemory).unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedEof {
                expected: 4,
                received: 2
            }
        ));
    }

    #[test]
    fn send_request_writes_one_frame() {
        let mut s = MockStream::new(Vec::new());
        send_request(&mut s, &Request::SetSpeedLimit(200)).unwrap();
        let sent = s.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0.kind(), Some(RequestType::SetSpeedLimit));
        assert_eq!(sent[0].1, [0, 0, 0, 0, 0, 0, 0, 0, 200, 0]);
    }
}
