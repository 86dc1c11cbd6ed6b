//! Host controller errors

use core::fmt;

use hexapod_protocol::{FrameError, HandshakeOutcome};

use crate::link::LinkError;

/// Errors returned by [`Controller`](super::Controller) operations
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControllerError<E> {
    /// Every handshake attempt failed; `last` is the final attempt's outcome
    HandshakeFailed { attempts: u32, last: HandshakeOutcome },
    /// A request was issued before a successful handshake
    NotConnected,
    /// No matching reply within the reply budget
    NoReply { command: u8 },
    /// Device answered NACK
    Nack { command: u8, error_code: u8 },
    /// Device acknowledged with a non-OK status
    Status { command: u8, status: u8 },
    /// Reply was too short or acknowledged a different command
    Malformed { command: u8 },
    /// Request could not be framed
    Frame(FrameError),
    /// Transport failure
    Io(E),
}

impl<E> From<FrameError> for ControllerError<E> {
    fn from(error: FrameError) -> Self {
        ControllerError::Frame(error)
    }
}

impl<E> From<LinkError<E>> for ControllerError<E> {
    fn from(error: LinkError<E>) -> Self {
        match error {
            LinkError::Frame(error) => ControllerError::Frame(error),
            LinkError::Io(error) => ControllerError::Io(error),
        }
    }
}

impl<E: fmt::Debug> fmt::Display for ControllerError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerError::HandshakeFailed { attempts, last } => {
                write!(f, "handshake failed after {attempts} attempt(s): {last:?}")
            }
            ControllerError::NotConnected => f.write_str("no handshake with the device yet"),
            ControllerError::NoReply { command } => {
                write!(f, "no reply to command {command:#04x}")
            }
            ControllerError::Nack {
                command,
                error_code,
            } => write!(f, "command {command:#04x} refused with error {error_code:#04x}"),
            ControllerError::Status { command, status } => {
                write!(f, "command {command:#04x} acknowledged with status {status:#04x}")
            }
            ControllerError::Malformed { command } => {
                write!(f, "malformed reply to command {command:#04x}")
            }
            ControllerError::Frame(error) => write!(f, "framing error: {error:?}"),
            ControllerError::Io(error) => write!(f, "transport error: {error:?}"),
        }
    }
}
