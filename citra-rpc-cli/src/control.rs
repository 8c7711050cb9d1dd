//! Input and execution control commands.

use anyhow::{Result, bail};
use citra_rpc::Button;

/// Arguments for `citra-rpc touch`.
#[derive(clap::Args)]
pub struct TouchArgs {
    /// X coordinate.
    #[arg(allow_hyphen_values = true)]
    pub x: i16,

    /// Y coordinate.
    #[arg(allow_hyphen_values = true)]
    pub y: i16,

    /// Mark the touch as not valid (released).
    #[arg(long)]
    pub invalid: bool,
}

/// Arguments for `citra-rpc motion`.
#[derive(clap::Args)]
#[command(allow_negative_numbers = true)]
pub struct MotionArgs {
    /// X axis.
    pub x: i16,
    /// Y axis.
    pub y: i16,
    /// Z axis.
    pub z: i16,
    /// Roll.
    pub roll: i16,
    /// Pitch.
    pub pitch: i16,
    /// Yaw.
    pub yaw: i16,
}

/// Arguments for `citra-rpc override`.
///
/// Inputs not named fall back to the emulator's own devices.
#[derive(clap::Args)]
pub struct OverrideArgs {
    /// Override the pad buttons.
    #[arg(long)]
    pub pad: bool,

    /// Override the touch screen.
    #[arg(long)]
    pub touch: bool,

    /// Override the motion sensors.
    #[arg(long)]
    pub motion: bool,

    /// Override the Circle Pad.
    #[arg(long)]
    pub circle: bool,
}

/// On/off switch.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum Toggle {
    /// Enabled.
    On,
    /// Disabled.
    Off,
}

/// Combines button names into one mask.
pub fn parse_buttons(names: &[String]) -> Result<Button> {
    names
        .iter()
        .map(|n| n.parse::<Button>().map_err(anyhow::Error::from))
        .collect()
}

/// Reports an acknowledged request, or fails if it was not.
pub fn ack(what: &str, acknowledged: bool) -> Result<()> {
    if !acknowledged {
        bail!("{what}: emulator did not acknowledge the request");
    }
    Ok(())
}
