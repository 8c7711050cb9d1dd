//! Request types and their payload layouts.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::button::Button;
use crate::error::ProtoError;
use crate::header::{HEADER_SIZE, Header};

/// Default TCP port the emulator's RPC server listens on.
pub const DEFAULT_PORT: u16 = 45987;

/// Protocol version spoken by this client.
pub const PROTOCOL_VERSION: u32 = 2;

/// Per-message payload cap for memory requests.
pub const MAX_MEMORY_REQUEST_DATA_SIZE: usize = 32;

/// Bytes of a memory request payload taken by the `(address, size)` fields.
pub const MEMORY_REQUEST_OVERHEAD: usize = 8;

/// Largest data chunk carried by a single write request.
pub const MAX_WRITE_CHUNK: usize = MAX_MEMORY_REQUEST_DATA_SIZE - MEMORY_REQUEST_OVERHEAD;

/// Request/reply type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[repr(u32)]
pub enum RequestType {
    /// Read a block of guest memory.
    ReadMemory = 1,
    /// Write a block of guest memory.
    WriteMemory = 2,
    /// Override the pad button state.
    PadState = 3,
    /// Override the touch screen state.
    TouchState = 4,
    /// Override the accelerometer/gyroscope state.
    MotionState = 5,
    /// Override the Circle Pad state.
    CircleState = 6,
    /// Set the internal resolution factor.
    SetResolution = 7,
    /// Load a different program.
    SetProgram = 8,
    /// Toggle which input sources use the overridden state.
    SetOverrideControls = 9,
    /// Pause emulation.
    Pause = 10,
    /// Resume emulation.
    Resume = 11,
    /// Restart the running program.
    Restart = 12,
    /// Set the frame limiter percentage.
    SetSpeedLimit = 13,
    /// Set the renderer background color.
    SetBackgroundColor = 14,
    /// Set the screen refresh rate.
    SetScreenRefreshRate = 15,
    /// Query whether any of the given buttons are pressed.
    AreButtonsPressed = 16,
    /// Enable or disable frame advancing.
    SetFrameAdvancing = 17,
    /// Advance a single frame.
    AdvanceFrame = 18,
    /// Capture the current framebuffer.
    GetCurrentFrame = 19,
}

impl RequestType {
    /// Every request type, in tag order.
    pub const ALL: [Self; 19] = [
        Self::ReadMemory,
        Self::WriteMemory,
        Self::PadState,
        Self::TouchState,
        Self::MotionState,
        Self::CircleState,
        Self::SetResolution,
        Self::SetProgram,
        Self::SetOverrideControls,
        Self::Pause,
        Self::Resume,
        Self::Restart,
        Self::SetSpeedLimit,
        Self::SetBackgroundColor,
        Self::SetScreenRefreshRate,
        Self::AreButtonsPressed,
        Self::SetFrameAdvancing,
        Self::AdvanceFrame,
        Self::GetCurrentFrame,
    ];

    /// Returns the wire tag.
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    /// Returns a stable, human-readable name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::ReadMemory => "read_memory",
            Self::WriteMemory => "write_memory",
            Self::PadState => "pad_state",
            Self::TouchState => "touch_state",
            Self::MotionState => "motion_state",
            Self::CircleState => "circle_state",
            Self::SetResolution => "set_resolution",
            Self::SetProgram => "set_program",
            Self::SetOverrideControls => "set_override_controls",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Restart => "restart",
            Self::SetSpeedLimit => "set_speed_limit",
            Self::SetBackgroundColor => "set_background_color",
            Self::SetScreenRefreshRate => "set_screen_refresh_rate",
            Self::AreButtonsPressed => "are_buttons_pressed",
            Self::SetFrameAdvancing => "set_frame_advancing",
            Self::AdvanceFrame => "advance_frame",
            Self::GetCurrentFrame => "get_current_frame",
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u32> for RequestType {
    type Error = ProtoError;

    fn try_from(tag: u32) -> Result<Self, Self::Error> {
        tag.checked_sub(1)
            .and_then(|i| Self::ALL.get(i as usize))
            .copied()
            .ok_or(ProtoError::UnknownRequestType(tag))
    }
}

/// A request and its operation-specific fields.
///
/// Borrowed data (`WriteMemory`, `SetProgram`) is copied only when the
/// payload is encoded.
#[derive(Debug, Clone, Copy, PartialEq)]
#[non_exhaustive]
pub enum Request<'a> {
    /// Read `size` bytes starting at `address`. `size` must not exceed
    /// [`MAX_MEMORY_REQUEST_DATA_SIZE`].
    ReadMemory {
        /// Guest address.
        address: u32,
        /// Bytes requested.
        size: u32,
    },
    /// Write `data` at `address`. `data` must not exceed
    /// [`MAX_WRITE_CHUNK`] bytes.
    WriteMemory {
        /// Guest address.
        address: u32,
        /// Bytes to write.
        data: &'a [u8],
    },
    /// Raw pad bitmask.
    PadState(Button),
    /// Touch screen coordinates.
    TouchState {
        /// X coordinate.
        x: i16,
        /// Y coordinate.
        y: i16,
        /// Written to HID shared memory as-is.
        valid: bool,
    },
    /// Motion sensor state.
    MotionState {
        /// X axis.
        x: i16,
        /// Y axis.
        y: i16,
        /// Z axis.
        z: i16,
        /// Roll.
        roll: i16,
        /// Pitch.
        pitch: i16,
        /// Yaw.
        yaw: i16,
    },
    /// Circle Pad position.
    CircleState {
        /// X coordinate.
        x: i16,
        /// Y coordinate.
        y: i16,
    },
    /// Resolution factor.
    SetResolution(u16),
    /// Full path of the program to load.
    SetProgram(&'a str),
    /// Which inputs use the overridden state.
    SetOverrideControls {
        /// Pad buttons.
        pad: bool,
        /// Touch screen.
        touch: bool,
        /// Motion sensors.
        motion: bool,
        /// Circle Pad.
        circle: bool,
    },
    /// Pause emulation.
    Pause,
    /// Resume emulation.
    Resume,
    /// Restart the program.
    Restart,
    /// Frame limiter percentage.
    SetSpeedLimit(u16),
    /// Background color components.
    SetBackgroundColor {
        /// Red.
        r: f32,
        /// Green.
        g: f32,
        /// Blue.
        b: f32,
    },
    /// Screen refresh rate in Hz.
    SetScreenRefreshRate(f32),
    /// Buttons to test.
    AreButtonsPressed(Button),
    /// Whether frame advancing is enabled.
    SetFrameAdvancing(bool),
    /// Advance one frame.
    AdvanceFrame,
    /// Capture the framebuffer.
    GetCurrentFrame,
}

impl Request<'_> {
    /// Returns the type tag for this request.
    pub const fn request_type(&self) -> RequestType {
        match self {
            Self::ReadMemory { .. } => RequestType::ReadMemory,
            Self::WriteMemory { .. } => RequestType::WriteMemory,
            Self::PadState(_) => RequestType::PadState,
            Self::TouchState { .. } => RequestType::TouchState,
            Self::MotionState { .. } => RequestType::MotionState,
            Self::CircleState { .. } => RequestType::CircleState,
            Self::SetResolution(_) => RequestType::SetResolution,
            Self::SetProgram(_) => RequestType::SetProgram,
            Self::SetOverrideControls { .. } => RequestType::SetOverrideControls,
            Self::Pause => RequestType::Pause,
            Self::Resume => RequestType::Resume,
            Self::Restart => RequestType::Restart,
            Self::SetSpeedLimit(_) => RequestType::SetSpeedLimit,
            Self::SetBackgroundColor { .. } => RequestType::SetBackgroundColor,
            Self::SetScreenRefreshRate(_) => RequestType::SetScreenRefreshRate,
            Self::AreButtonsPressed(_) => RequestType::AreButtonsPressed,
            Self::SetFrameAdvancing(_) => RequestType::SetFrameAdvancing,
            Self::AdvanceFrame => RequestType::AdvanceFrame,
            Self::GetCurrentFrame => RequestType::GetCurrentFrame,
        }
    }

    /// Encodes the payload (without header).
    pub fn payload(&self) -> Result<Vec<u8>, ProtoError> {
        let mut p = Payload::default();
        match *self {
            Self::ReadMemory { address, size } => {
                p.u32(address).u32(size);
            }
            Self::WriteMemory { address, data } => {
                let size =
                    u32::try_from(data.len()).map_err(|_| ProtoError::PayloadTooLarge(data.len()))?;
                p.u32(address).u32(size).bytes(data);
            }
            Self::PadState(pad) => {
                p.reserved().u32(pad.bits());
            }
            Self::TouchState { x, y, valid } => {
                p.reserved().i16(x).i16(y).bool(valid);
            }
            Self::MotionState {
                x,
                y,
                z,
                roll,
                pitch,
                yaw,
            } => {
                p.reserved()
                    .i16(x)
                    .i16(y)
                    .i16(z)
                    .i16(roll)
                    .i16(pitch)
                    .i16(yaw);
            }
            Self::CircleState { x, y } => {
                p.reserved().i16(x).i16(y);
            }
            Self::SetResolution(v) | Self::SetSpeedLimit(v) => {
                p.reserved().u16(v);
            }
            Self::SetProgram(path) => {
                p.reserved().bytes(path.as_bytes());
            }
            Self::SetOverrideControls {
                pad,
                touch,
                motion,
                circle,
            } => {
                p.reserved().bool(pad).bool(touch).bool(motion).bool(circle);
            }
            Self::SetBackgroundColor { r, g, b } => {
                p.reserved().f32(r).f32(g).f32(b);
            }
            Self::SetScreenRefreshRate(rate) => {
                p.reserved().f32(rate);
            }
            Self::AreButtonsPressed(buttons) => {
                p.reserved().u32(buttons.bits());
            }
            Self::SetFrameAdvancing(enabled) => {
                p.reserved().bool(enabled);
            }
            Self::Pause
            | Self::Resume
            | Self::Restart
            | Self::AdvanceFrame
            | Self::GetCurrentFrame => {
                p.reserved();
            }
        }
        Ok(p.0)
    }

    /// Encodes the full message: header followed by payload.
    pub fn to_frame(&self) -> Result<Vec<u8>, ProtoError> {
        let payload = self.payload()?;
        let header = Header::new(self.request_type(), payload.len())?;
        let mut frame = Vec::with_capacity(HEADER_SIZE + payload.len());
        frame.extend_from_slice(&header.to_bytes());
        frame.extend_from_slice(&payload);
        Ok(frame)
    }
}

/// Little-endian payload builder.
#[derive(Debug, Default)]
struct Payload(Vec<u8>);

impl Payload {
    /// Appends the two zeroed leading fields.
    fn reserved(&mut self) -> &mut Self {
        self.u32(0).u32(0)
    }

    /// Appends a `u32`.
    fn u32(&mut self, v: u32) -> &mut Self {
        self.bytes(&v.to_le_bytes())
    }

    /// Appends a `u16`.
    fn u16(&mut self, v: u16) -> &mut Self {
        self.bytes(&v.to_le_bytes())
    }

    /// Appends an `i16`.
    fn i16(&mut self, v: i16) -> &mut Self {
        self.bytes(&v.to_le_bytes())
    }

    /// Appends an `f32`.
    fn f32(&mut self, v: f32) -> &mut Self {
        self.bytes(&v.to_le_bytes())
    }

    /// Appends a one-byte boolean.
    fn bool(&mut self, v: bool) -> &mut Self {
        self.bytes(&[u8::from(v)])
    }

    /// Appends raw bytes.
    fn bytes(&mut self, v: &[u8]) -> &mut Self {
        self.0.extend_from_slice(v);
        self
    }
}
