//! Configuration management.
//!
//! The configuration file is TOML. Every section is optional and falls back
//! to the defaults below:
//!
//! ```toml
//! title = "Hexapod Config File"
//!
//! MotorCalibrations = [
//!     ["R31", 1031, 2088],
//!     ["L13", 1035, 2027],
//!     # ... one entry per joint
//! ]
//!
//! [serial]
//! port = "/dev/ttyACM0"
//! baud_rate = 115200
//! timeout_ms = 100
//!
//! [handshake]
//! attempts = 3
//! reply_attempts = 10
//!
//! [logging]
//! level = "info"
//!
//! [device]
//! device_id = 1
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use hexapod_core::config::{CalibrationTable, JointName};
use hexapod_core::device::DeviceConfig;
use hexapod_core::host::ControllerConfig;
use hexapod_protocol::{PulseCalibration, NUM_SERVOS};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ServerError};

/// Required value of the optional top-level `title` key
pub const CONFIG_TITLE: &str = "Hexapod Config File";

/// File loaded from the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "hexapod.toml";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// File marker; checked when present
    pub title: Option<String>,

    /// Per-joint `[name, min_pulse, max_pulse]` entries
    #[serde(rename = "MotorCalibrations")]
    pub motor_calibrations: Vec<(String, u16, u16)>,

    /// Serial line settings
    pub serial: SerialConfig,

    /// Handshake and reply retry budget
    pub handshake: ControllerConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Emulated device identity
    pub device: EmulatorConfig,
}

impl ServerConfig {
    /// Load configuration from file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ServerError::Config(format!("Failed to read config: {e}")))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ServerError::Config(format!("Failed to parse config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Load `path`, else [`DEFAULT_CONFIG_FILE`] if it exists, else defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default = Self::default_path();
                if default.exists() {
                    Self::load(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn default_path() -> PathBuf {
        PathBuf::from(DEFAULT_CONFIG_FILE)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title {
            if title != CONFIG_TITLE {
                return Err(ServerError::Config(format!(
                    "title must be \"{CONFIG_TITLE}\", found \"{title}\""
                )));
            }
        }

        if self.serial.baud_rate == 0 {
            return Err(ServerError::Config("baud_rate must be non-zero".into()));
        }

        if self.serial.timeout_ms == 0 {
            return Err(ServerError::Config("timeout_ms must be non-zero".into()));
        }

        if self.handshake.attempts == 0 {
            return Err(ServerError::Config(
                "handshake attempts must be at least 1".into(),
            ));
        }

        self.calibration_table()?;
        Ok(())
    }

    /// Calibration table in channel order
    ///
    /// An empty `MotorCalibrations` list means the factory table. Otherwise
    /// every joint must appear exactly once.
    pub fn calibration_table(&self) -> Result<CalibrationTable> {
        let mut table = CalibrationTable::factory();
        if self.motor_calibrations.is_empty() {
            return Ok(table);
        }

        if self.motor_calibrations.len() != NUM_SERVOS {
            return Err(ServerError::Calibration(format!(
                "expected {NUM_SERVOS} MotorCalibrations entries, found {}",
                self.motor_calibrations.len()
            )));
        }

        let mut seen = [false; NUM_SERVOS];
        for (name, min_pulse, max_pulse) in &self.motor_calibrations {
            let joint = JointName::parse(name)
                .map_err(|e| ServerError::Calibration(format!("\"{name}\": {e}")))?;
            let channel = joint.channel();
            if seen[channel.index()] {
                return Err(ServerError::Calibration(format!(
                    "{joint} is listed more than once"
                )));
            }
            seen[channel.index()] = true;
            table[channel] = PulseCalibration {
                min_pulse: *min_pulse,
                max_pulse: *max_pulse,
            };
        }

        Ok(table)
    }
}

/// Serial line settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Device path; discovered when unset
    pub port: Option<String>,

    pub baud_rate: u32,

    /// Per-byte read timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: default_baud_rate(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl SerialConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_baud_rate() -> u32 {
    115_200
}

fn default_timeout_ms() -> u64 {
    100
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Identity and timing of the emulated device.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmulatorConfig {
    /// Reported in the handshake ACK
    pub device_id: u8,

    /// How long each dispatcher poll waits for a request, in milliseconds
    pub poll_timeout_ms: u64,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            device_id: DeviceConfig::default().device_id,
            poll_timeout_ms: 20,
        }
    }
}

impl EmulatorConfig {
    pub fn device_config(&self) -> DeviceConfig {
        DeviceConfig {
            device_id: self.device_id,
            poll_timeout: Duration::from_millis(self.poll_timeout_ms),
            ..DeviceConfig::default()
        }
    }
}

/// Initialize logging based on configuration.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .try_init()
        .map_err(|e| ServerError::Config(format!("Failed to init logging: {e}")))?;

    Ok(())
}
