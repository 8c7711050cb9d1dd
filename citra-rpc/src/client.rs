//! Blocking client for a running emulator's RPC server.
//!
//! Every operation sends one request and waits for its reply before
//! returning; the server acknowledges setters with an empty payload.

use std::net::{TcpStream, ToSocketAddrs};

use citra_rpc_proto::{Button, Request, RequestType};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::framer;
use crate::transport::Transport;

/// Lowest accepted screen refresh rate, in Hz.
pub const MIN_REFRESH_RATE: f32 = 1.0;

/// Highest accepted screen refresh rate, in Hz.
pub const MAX_REFRESH_RATE: f32 = 1000.0;

/// A connection to the emulator's RPC server.
///
/// Operations take `&mut self`: one request is in flight at a time.
/// Setters return `Ok(true)` when the server acknowledged the request
/// and `Ok(false)` when the reply carried the wrong version or type.
#[derive(Debug)]
pub struct Client<T = TcpStream> {
    /// The underlying byte stream.
    transport: T,
}

impl Client<TcpStream> {
    /// Connects to `addr`.
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        Ok(Self::new(stream))
    }

    /// Connects using `config`, applying its socket timeouts.
    pub fn with_config(config: &Config) -> Result<Self> {
        let addr = config.address();
        let stream = TcpStream::connect(addr.as_str())?;
        stream.set_nodelay(true)?;
        stream.set_read_timeout(config.read_timeout)?;
        stream.set_write_timeout(config.write_timeout)?;
        info!(%addr, "connected to emulator");
        Ok(Self::new(stream))
    }

    /// Connects to `127.0.0.1:45987`.
    pub fn connect_default() -> Result<Self> {
        Self::with_config(&Config::default())
    }

    /// Whether the socket still has a peer.
    ///
    /// A `Client` only exists once connected, so this turns `false` only
    /// when the operating system no longer reports a peer address.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.transport.peer_addr().is_ok()
    }
}

impl<T: Transport> Client<T> {
    /// Wraps an already connected transport.
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Returns a reference to the underlying transport.
    pub const fn get_ref(&self) -> &T {
        &self.transport
    }

    /// Consumes the client, returning the underlying transport.
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Sends `req` and returns the validated reply payload.
    pub(crate) fn call(&mut self, req: &Request<'_>) -> Result<Option<Vec<u8>>> {
        framer::send_request(&mut self.transport, req)?;
        framer::decode_and_validate_header(&mut self.transport, req.request_type())
    }

    /// Sends `req` and reports whether it was acknowledged.
    fn acknowledged(&mut self, req: &Request<'_>) -> Result<bool> {
        let ok = self.call(req)?.is_some();
        if !ok {
            warn!(request = %req.request_type(), "request not acknowledged");
        }
        Ok(ok)
    }

    /// Overrides the pad button state.
    pub fn set_pad_state(&mut self, pad: Button) -> Result<bool> {
        self.acknowledged(&Request::PadState(pad))
    }

    /// Overrides the touch screen state. `valid` is written to HID
    /// shared memory as-is.
    pub fn set_touch_state(&mut self, x: i16, y: i16, valid: bool) -> Result<bool> {
        self.acknowledged(&Request::TouchState { x, y, valid })
    }

    /// Overrides the motion sensor state.
    pub fn set_motion_state(
        &mut self,
        x: i16,
        y: i16,
        z: i16,
        roll: i16,
        pitch: i16,
        yaw: i16,
    ) -> Result<bool> {
        self.acknowledged(&Request::MotionState {
            x,
            y,
            z,
            roll,
            pitch,
            yaw,
        })
    }

    /// Overrides the Circle Pad position.
    pub fn set_circle_state(&mut self, x: i16, y: i16) -> Result<bool> {
        self.acknowledged(&Request::CircleState { x, y })
    }

    /// Sets the internal resolution factor. `0` is rejected before
    /// anything is sent.
    pub fn set_resolution(&mut self, resolution: u16) -> Result<bool> {
        if resolution == 0 {
            return Err(Error::InvalidResolution);
        }
        self.acknowledged(&Request::SetResolution(resolution))
    }

    /// Loads the program at `path` (a path on the emulator's host).
    pub fn set_program(&mut self, path: &str) -> Result<bool> {
        self.acknowledged(&Request::SetProgram(path))
    }

    /// Selects which inputs use the overridden state instead of the
    /// emulator's own input devices.
    pub fn set_override_controls(
        &mut self,
        pad: bool,
        touch: bool,
        motion: bool,
        circle: bool,
    ) -> Result<bool> {
        self.acknowledged(&Request::SetOverrideControls {
            pad,
            touch,
            motion,
            circle,
        })
    }

    /// Pauses emulation.
    pub fn pause(&mut self) -> Result<bool> {
        self.acknowledged(&Request::Pause)
    }

    /// Resumes emulation.
    pub fn resume(&mut self) -> Result<bool> {
        self.acknowledged(&Request::Resume)
    }

    /// Restarts the running program.
    pub fn restart(&mut self) -> Result<bool> {
        self.acknowledged(&Request::Restart)
    }

    /// Sets the frame limiter, as a percentage of full speed.
    pub fn set_speed_limit(&mut self, speed_limit: u16) -> Result<bool> {
        self.acknowledged(&Request::SetSpeedLimit(speed_limit))
    }

    /// Sets the renderer background color; components are in `0.0..=1.0`.
    pub fn set_background_color(&mut self, r: f32, g: f32, b: f32) -> Result<bool> {
        self.acknowledged(&Request::SetBackgroundColor { r, g, b })
    }

    /// Sets the screen refresh rate. Rates outside `1..=1000` Hz are
    /// rejected before anything is sent.
    pub fn set_screen_refresh_rate(&mut self, rate: f32) -> Result<bool> {
        if !(MIN_REFRESH_RATE..=MAX_REFRESH_RATE).contains(&rate) {
            return Err(Error::InvalidRefreshRate(rate));
        }
        self.acknowledged(&Request::SetScreenRefreshRate(rate))
    }

    /// Whether any of `buttons` is currently pressed.
    ///
    /// A reply other than a single `0` or `1` byte, or one with the wrong
    /// version or type, is [`Error::UnexpectedReply`].
    pub fn are_buttons_pressed(&mut self, buttons: Button) -> Result<bool> {
        let request = RequestType::AreButtonsPressed;
        match self.call(&Request::AreButtonsPressed(buttons))?.as_deref() {
            Some([1]) => Ok(true),
            Some([0]) => Ok(false),
            Some(other) => Err(Error::UnexpectedReply {
                request,
                detail: format!("expected a single 0 or 1 byte, got {other:02x?}"),
            }),
            None => Err(Error::UnexpectedReply {
                request,
                detail: "version or type mismatch".to_owned(),
            }),
        }
    }

    /// Enables or disables frame advancing.
    pub fn set_frame_advancing(&mut self, enabled: bool) -> Result<bool> {
        self.acknowledged(&Request::SetFrameAdvancing(enabled))
    }

    /// Advances one frame, enabling frame advancing if needed.
    pub fn advance_frame(&mut self) -> Result<bool> {
        self.acknowledged(&Request::AdvanceFrame)
    }

    /// Captures the current framebuffer as raw 32-bit pixels.
    pub fn get_current_frame(&mut self) -> Result<Option<Vec<u8>>> {
        self.call(&Request::GetCurrentFrame)
    }
}

#[cfg(test)]
mod tests {
    use citra_rpc_proto::PROTOCOL_VERSION;

    use super::*;
    use crate::testing::{MockStream, raw_reply, reply};

    fn client(replies: &[Vec<u8>]) -> Client<MockStream> {
        Client::new(MockStream::replying(replies))
    }

    #[test]
    fn zero_resolution_sends_nothing() {
        let mut c = client(&[]);
        let err = c.set_resolution(0).unwrap_err();
        assert!(matches!(err, Error::InvalidResolution));
        assert!(err.is_precondition());
        assert!(c.get_ref().written().is_empty());
    }

    #[test]
    fn resolution_is_sent_as_u16() {
        let mut c = client(&[reply(RequestType::SetResolution, &[])]);
        assert!(c.set_resolution(4).unwrap());
        let sent = c.get_ref().sent();
        assert_eq!(sent[0].1, [0, 0, 0, 0, 0, 0, 0, 0, 4, 0]);
    }

    #[test]
    fn refresh_rate_bounds() {
        let mut c = client(&[]);
        for rate in [0.0, 0.5, 1000.5, 1001.0, f32::NAN, -60.0] {
            let err = c.set_screen_refresh_rate(rate).unwrap_err();
            assert!(matches!(err, Error::InvalidRefreshRate(_)), "{rate}");
        }
        assert!(c.get_ref().written().is_empty());
    }

    #[test]
    fn refresh_rate_sends_one_message() {
        let mut c = client(&[reply(RequestType::SetScreenRefreshRate, &[])]);
        assert!(c.set_screen_refresh_rate(60.0).unwrap());

        let sent = c.get_ref().sent();
        assert_eq!(sent.len(), 1);
        let (header, payload) = &sent[0];
        assert_eq!(header.version, PROTOCOL_VERSION);
        assert_eq!(header.kind(), Some(RequestType::SetScreenRefreshRate));
        assert_eq!(header.payload_len(), 12);
        let mut expected = vec![0u8; 8];
        expected.extend_from_slice(&60.0f32.to_le_bytes());
        assert_eq!(*payload, expected);
    }

    #[test]
    fn refresh_rate_accepts_inclusive_bounds() {
        let mut c = client(&[
            reply(RequestType::SetScreenRefreshRate, &[]),
            reply(RequestType::SetScreenRefreshRate, &[]),
        ]);
        assert!(c.set_screen_refresh_rate(1.0).unwrap());
        assert!(c.set_screen_refresh_rate(1000.0).unwrap());
    }

    #[test]
    fn buttons_pressed_decodes_single_byte() {
        let mut c = client(&[
            reply(RequestType::AreButtonsPressed, &[1]),
            reply(RequestType::AreButtonsPressed, &[0]),
        ]);
        assert!(c.are_buttons_pressed(Button::A | Button::B).unwrap());
        assert!(!c.are_buttons_pressed(Button::START).unwrap());

        let sent = c.get_ref().sent();
        assert_eq!(sent[0].1[8..], [0x03, 0, 0, 0]);
        assert_eq!(sent[1].1[8..], [0x08, 0, 0, 0]);
    }

    #[test]
    fn buttons_pressed_rejects_other_values() {
        let mut c = client(&[
            reply(RequestType::AreButtonsPressed, &[2]),
            reply(RequestType::AreButtonsPressed, &[]),
            reply(RequestType::AreButtonsPressed, &[1, 0]),
        ]);
        for _ in 0..3 {
            let err = c.are_buttons_pressed(Button::A).unwrap_err();
            assert!(matches!(err, Error::UnexpectedReply { .. }));
            assert!(!err.is_transport());
        }
    }

    #[test]
    fn buttons_pressed_mismatch_is_not_false() {
        let mut c = client(&[raw_reply(1, RequestType::AreButtonsPressed.as_u32(), &[0])]);
        let err = c.are_buttons_pressed(Button::A).unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedReply {
                request: RequestType::AreButtonsPressed,
                ..
            }
        ));
    }

    #[test]
    fn setters_consume_acknowledgement() {
        let mut c = client(&[
            reply(RequestType::Pause, &[]),
            reply(RequestType::SetOverrideControls, &[]),
            reply(RequestType::Resume, &[]),
        ]);
        assert!(c.pause().unwrap());
        assert!(c.set_override_controls(true, false, false, true).unwrap());
        assert!(c.resume().unwrap());
        assert!(c.get_ref().drained());

        let kinds: Vec<_> = c
            .get_ref()
            .sent()
            .iter()
            .map(|(h, _)| h.kind().unwrap())
            .collect();
        assert_eq!(
            kinds,
            [
                RequestType::Pause,
                RequestType::SetOverrideControls,
                RequestType::Resume
            ]
        );
    }

    #[test]
    fn mismatched_acknowledgement_is_false() {
        let mut c = client(&[reply(RequestType::Resume, &[]), reply(RequestType::Restart, &[])]);
        assert!(!c.restart().unwrap());
        assert!(c.restart().unwrap());
    }

    #[test]
    fn setter_payloads() {
        let mut c = client(&[
            reply(RequestType::PadState, &[]),
            reply(RequestType::CircleState, &[]),
            reply(RequestType::SetProgram, &[]),
            reply(RequestType::SetFrameAdvancing, &[]),
            reply(RequestType::AdvanceFrame, &[]),
        ]);
        assert!(c.set_pad_state(Button::CIRCLE_UP).unwrap());
        assert!(c.set_circle_state(-156, 156).unwrap());
        assert!(c.set_program("/roms/game.3ds").unwrap());
        assert!(c.set_frame_advancing(true).unwrap());
        assert!(c.advance_frame().unwrap());

        let sent = c.get_ref().sent();
        assert_eq!(sent[0].1[8..], (1u32 << 30).to_le_bytes());
        assert_eq!(sent[1].1[8..], [0x64, 0xFF, 0x9C, 0x00]);
        assert_eq!(sent[2].1[8..], *b"/roms/game.3ds");
        assert_eq!(sent[3].1[8..], [1]);
        assert_eq!(sent[4].1, [0; 8]);
    }

    #[test]
    fn current_frame_returns_raw_payload() {
        let pixels: Vec<u8> = (0..=255).collect();
        let mut c = client(&[
            reply(RequestType::GetCurrentFrame, &pixels),
            reply(RequestType::Pause, &[]),
        ]);
        assert_eq!(c.get_current_frame().unwrap(), Some(pixels));
        assert_eq!(c.get_current_frame().unwrap(), None);
    }

    #[test]
    fn closed_stream_is_transport_error() {
        let mut c = client(&[]);
        let err = c.pause().unwrap_err();
        assert!(err.is_transport());
    }
}
