//! CLI for the Citra emulator RPC interface.

#![allow(
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::missing_docs_in_private_items
)]

mod control;
mod memory;

use std::time::Duration;

use anyhow::{Context, Result};
use citra_rpc::{Client, Config};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const ENV_LOG: &str = "CITRA_RPC_LOG";

#[derive(Parser)]
#[command(
    name = "citra-rpc",
    version,
    about = "Remote control for a running Citra emulator"
)]
struct Cli {
    /// Emulator host [env: CITRA_RPC_HOST] [default: 127.0.0.1].
    #[arg(long, global = true)]
    host: Option<String>,

    /// Emulator RPC port [env: CITRA_RPC_PORT] [default: 45987].
    #[arg(long, short = 'p', global = true)]
    port: Option<u16>,

    /// Socket read/write timeout in seconds (default: wait forever).
    #[arg(long, global = true)]
    timeout: Option<f64>,

    /// Print the effective connection settings as JSON and exit.
    #[arg(long)]
    show_config: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    #[command(flatten)]
    Remote(Remote),

    /// Generate shell completion scripts.
    #[command(hide = true)]
    Completion {
        /// Target shell.
        shell: Shell,
    },
}

/// Commands sent to a running emulator.
#[derive(Subcommand)]
enum Remote {
    /// Read guest memory.
    Read(memory::ReadArgs),

    /// Write guest memory.
    Write(memory::WriteArgs),

    /// Set the pad state to the given buttons (none releases all).
    Pad {
        /// Button names (a, b, select, start, dup, circleleft, ...).
        buttons: Vec<String>,
    },

    /// Check whether any of the given buttons are pressed.
    Pressed {
        /// Button names.
        #[arg(required = true)]
        buttons: Vec<String>,
    },

    /// Set the touch screen state.
    Touch(control::TouchArgs),

    /// Set the motion sensor state.
    Motion(control::MotionArgs),

    /// Set the Circle Pad position.
    Circle {
        /// X coordinate.
        #[arg(allow_hyphen_values = true)]
        x: i16,
        /// Y coordinate.
        #[arg(allow_hyphen_values = true)]
        y: i16,
    },

    /// Choose which inputs use the overridden state.
    Override(control::OverrideArgs),

    /// Set the internal resolution factor.
    Resolution {
        /// Resolution factor (non-zero).
        factor: u16,
    },

    /// Load a program by path on the emulator host.
    Program {
        /// Full path to the program.
        path: String,
    },

    /// Pause emulation.
    Pause,

    /// Resume emulation.
    Resume,

    /// Restart the running program.
    Restart,

    /// Set the frame limiter percentage.
    SpeedLimit {
        /// Percentage of full speed.
        percent: u16,
    },

    /// Set the renderer background color.
    Background {
        /// Red (0.0-1.0).
        r: f32,
        /// Green (0.0-1.0).
        g: f32,
        /// Blue (0.0-1.0).
        b: f32,
    },

    /// Set the screen refresh rate.
    RefreshRate {
        /// Rate in Hz (1-1000).
        hz: f32,
    },

    /// Enable or disable frame advancing.
    FrameAdvancing {
        /// Desired state.
        state: control::Toggle,
    },

    /// Advance a single frame.
    AdvanceFrame,

    /// Save the current framebuffer as raw pixels.
    Frame {
        /// Output file.
        out: std::path::PathBuf,
    },
}

fn main() {
    init_tracing();
    if let Err(e) = Cli::parse().dispatch() {
        eprintln!("citra-rpc: {e:#}");
        std::process::exit(1);
    }
}

/// Installs a stderr subscriber filtered by `CITRA_RPC_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

impl Cli {
    /// Environment settings overridden by command-line flags.
    fn config(&self) -> Result<Config> {
        let mut config = Config::from_env()?;
        if let Some(host) = &self.host {
            config = config.host(host.clone());
        }
        if let Some(port) = self.port {
            config = config.port(port);
        }
        if let Some(secs) = self.timeout {
            let timeout = Duration::try_from_secs_f64(secs)
                .with_context(|| format!("invalid timeout: {secs}"))?;
            config = config
                .read_timeout(Some(timeout))
                .write_timeout(Some(timeout));
        }
        Ok(config)
    }

    fn dispatch(self) -> Result<()> {
        let config = self.config()?;
        if self.show_config {
            println!("{}", serde_json::to_string_pretty(&config)?);
            return Ok(());
        }

        let Some(command) = self.command else {
            Self::command().print_help()?;
            return Ok(());
        };
        match command {
            Command::Completion { shell } => {
                clap_complete::generate(
                    shell,
                    &mut Self::command(),
                    "citra-rpc",
                    &mut std::io::stdout(),
                );
                Ok(())
            }
            Command::Remote(remote) => {
                let mut client = Client::with_config(&config)
                    .with_context(|| format!("failed to connect to {}", config.address()))?;
                remote.run(&mut client)
            }
        }
    }
}

impl Remote {
    fn run(self, c: &mut Client) -> Result<()> {
        match self {
            Self::Read(args) => memory::read(c, &args),
            Self::Write(args) => memory::write(c, &args),
            Self::Pad { buttons } => {
                let pad = control::parse_buttons(&buttons)?;
                control::ack("pad", c.set_pad_state(pad)?)
            }
            Self::Pressed { buttons } => {
                let mask = control::parse_buttons(&buttons)?;
                let pressed = c.are_buttons_pressed(mask)?;
                println!("{pressed}");
                Ok(())
            }
            Self::Touch(args) => {
                control::ack("touch", c.set_touch_state(args.x, args.y, !args.invalid)?)
            }
            Self::Motion(args) => control::ack(
                "motion",
                c.set_motion_state(args.x, args.y, args.z, args.roll, args.pitch, args.yaw)?,
            ),
            Self::Circle { x, y } => control::ack("circle", c.set_circle_state(x, y)?),
            Self::Override(args) => control::ack(
                "override",
                c.set_override_controls(args.pad, args.touch, args.motion, args.circle)?,
            ),
            Self::Resolution { factor } => control::ack("resolution", c.set_resolution(factor)?),
            Self::Program { path } => control::ack("program", c.set_program(&path)?),
            Self::Pause => control::ack("pause", c.pause()?),
            Self::Resume => control::ack("resume", c.resume()?),
            Self::Restart => control::ack("restart", c.restart()?),
            Self::SpeedLimit { percent } => {
                control::ack("speed-limit", c.set_speed_limit(percent)?)
            }
            Self::Background { r, g, b } => {
                control::ack("background", c.set_background_color(r, g, b)?)
            }
            Self::RefreshRate { hz } => {
                control::ack("refresh-rate", c.set_screen_refresh_rate(hz)?)
            }
            Self::FrameAdvancing { state } => control::ack(
                "frame-advancing",
                c.set_frame_advancing(matches!(state, control::Toggle::On))?,
            ),
            Self::AdvanceFrame => control::ack("advance-frame", c.advance_frame()?),
            Self::Frame { out } => {
                let frame = c
                    .get_current_frame()?
                    .context("emulator did not return a frame")?;
                std::fs::write(&out, &frame)
                    .with_context(|| format!("failed to write {}", out.display()))?;
                println!("{} bytes -> {}", frame.len(), out.display());
                Ok(())
            }
        }
    }
}
