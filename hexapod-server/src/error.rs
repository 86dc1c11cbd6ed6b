//! Error types for the host server.

use std::fmt;
use std::io;

use hexapod_core::host::ControllerError;
use thiserror::Error;

/// Result type alias for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;

/// Main error type for the host server.
#[derive(Error, Debug)]
pub enum ServerError {
    // Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid calibration: {0}")]
    Calibration(String),

    // Link errors
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("no serial port found")]
    NoPort,

    #[error("handshake failed: {0}")]
    HandshakeFailed(String),

    #[error("device error: {0}")]
    Device(String),

    #[error("emulated device stopped: {0}")]
    Emulator(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl<E: fmt::Debug> From<ControllerError<E>> for ServerError {
    fn from(error: ControllerError<E>) -> Self {
        let message = error.to_string();
        match error {
            ControllerError::HandshakeFailed { .. } => ServerError::HandshakeFailed(message),
            _ => ServerError::Device(message),
        }
    }
}
