//! Command-line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use hexapod_core::config::JointName;
use hexapod_core::traits::ServoChannel;

use crate::config::ServerConfig;

/// Hexapod host controller
#[derive(Parser, Debug)]
#[command(
    name = "hexapod-server",
    author,
    version,
    about = "Talk to the hexapod leg controller over its serial link",
    long_about = r#"
Talks to the hexapod leg controller over its framed serial link.

Every command except `ports`, `emulate` and `selftest` opens the serial port,
performs the version handshake and then issues a single request.

QUICK START:
  List ports:    hexapod-server ports
  Check link:    hexapod-server --port /dev/ttyACM0 handshake
  Calibrate:     hexapod-server --config hexapod.toml calibrate
  No hardware:   hexapod-server selftest
"#
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path (default: hexapod.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Serial port, overriding the configuration
    #[arg(short, long, global = true)]
    pub port: Option<String>,

    /// Baud rate, overriding the configuration
    #[arg(short, long, global = true)]
    pub baud: Option<u32>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply(&self, config: &mut ServerConfig) {
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(port) = &self.port {
            config.serial.port = Some(port.clone());
        }
        if let Some(baud) = self.baud {
            config.serial.baud_rate = baud;
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// List serial ports
    Ports,

    /// Handshake with the device and report its identity
    Handshake,

    /// Send the configured calibration table
    Calibrate,

    /// Read back the device's calibration table
    Calibrations,

    /// Move one servo
    Angle {
        /// Channel number (0-17) or joint name such as R31
        #[arg(value_parser = parse_channel)]
        channel: ServoChannel,

        /// Target angle in degrees
        angle: u16,
    },

    /// Switch the servo power relay
    Relay {
        #[arg(value_enum)]
        state: RelayState,
    },

    /// Read the servo rail current
    Current,

    /// Read the servo rail voltage
    Voltage,

    /// Read one analog sensor header
    Sensor {
        /// Sensor channel (0-5)
        channel: u8,
    },

    /// Check that the device is answering
    Heartbeat,

    /// Run a virtual device on the serial port until Ctrl-C
    Emulate,

    /// Run host and virtual device against each other in memory
    Selftest,
}

/// Relay position
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    On,
    Off,
}

impl RelayState {
    pub fn is_on(self) -> bool {
        self == RelayState::On
    }
}

/// Channel by number or by joint name
pub fn parse_channel(value: &str) -> Result<ServoChannel, String> {
    if let Ok(index) = value.parse::<u8>() {
        return ServoChannel::new(index).ok_or_else(|| format!("no servo channel {index}"));
    }
    JointName::parse(value)
        .map(|joint| joint.channel())
        .map_err(|e| format!("\"{value}\" is neither a channel number nor a joint name: {e}"))
}
