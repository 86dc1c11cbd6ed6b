//! Handshake messages and reply classification
//!
//! The host opens a session with `HELLO [version, capabilities]`. The device
//! answers `ACK [version, status, device_id]` when the version matches and
//! `NACK [error]` otherwise.

use crate::commands::{ACK, ERR_TIMEOUT, ERR_VERSION_MISMATCH, HELLO, NACK, STATUS_OK};
use crate::frame::{FrameError, Packet};

/// Handshake request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Hello {
    pub version: u8,
    /// Requested optional behaviour; meaning is device-defined
    pub capabilities: u8,
}

impl Hello {
    pub fn to_packet(&self, seq: u16) -> Result<Packet, FrameError> {
        Packet::new(seq, HELLO, &[self.version, self.capabilities])
    }

    /// Parse the HELLO payload; `None` if either byte is missing
    pub fn from_payload(payload: &[u8]) -> Option<Self> {
        match payload {
            [version, capabilities, ..] => Some(Self {
                version: *version,
                capabilities: *capabilities,
            }),
            _ => None,
        }
    }
}

/// Body of a successful handshake ACK
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HelloAck {
    pub version: u8,
    pub status: u8,
    pub device_id: u8,
}

impl HelloAck {
    pub fn to_packet(&self, seq: u16) -> Result<Packet, FrameError> {
        Packet::new(seq, ACK, &[self.version, self.status, self.device_id])
    }

    /// Parse the ACK payload; `None` if shorter than three bytes
    pub fn from_payload(payload: &[u8]) -> Option<Self> {
        match payload {
            [version, status, device_id, ..] => Some(Self {
                version: *version,
                status: *status,
                device_id: *device_id,
            }),
            _ => None,
        }
    }
}

/// Device reply to a HELLO
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandshakeReply {
    Ack(HelloAck),
    Nack { error_code: u8 },
}

impl HandshakeReply {
    pub fn to_packet(&self, seq: u16) -> Result<Packet, FrameError> {
        match self {
            HandshakeReply::Ack(ack) => ack.to_packet(seq),
            HandshakeReply::Nack { error_code } => Packet::new(seq, NACK, &[*error_code]),
        }
    }

    pub fn is_ack(&self) -> bool {
        matches!(self, HandshakeReply::Ack(_))
    }
}

/// Device-side decision for a received HELLO payload
///
/// A payload missing either byte is answered with `NACK [TIMEOUT]`, the
/// same code the device reports when it could not read the handshake.
pub fn respond(payload: &[u8], device_version: u8, device_id: u8) -> HandshakeReply {
    match Hello::from_payload(payload) {
        Some(hello) if hello.version == device_version => HandshakeReply::Ack(HelloAck {
            version: device_version,
            status: STATUS_OK,
            device_id,
        }),
        Some(_) => HandshakeReply::Nack {
            error_code: ERR_VERSION_MISMATCH,
        },
        None => HandshakeReply::Nack {
            error_code: ERR_TIMEOUT,
        },
    }
}

/// Why the host rejected a handshake reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RejectReason {
    /// Device answered NACK with this error code
    Nack(u8),
    /// NACK without an error code
    MalformedNack,
    /// ACK shorter than three bytes
    MalformedAck,
    /// ACK carried a different protocol version
    VersionMismatch { expected: u8, actual: u8 },
    /// ACK carried a non-OK status (e.g. busy)
    Status(u8),
    /// Reply was neither ACK nor NACK
    UnexpectedCommand(u8),
}

/// Result of one HELLO exchange as seen by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandshakeOutcome {
    Accepted(HelloAck),
    Rejected(RejectReason),
    TimedOut,
}

impl HandshakeOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, HandshakeOutcome::Accepted(_))
    }
}

/// Classify the reply (if any) to a HELLO sent with `expected_version`
pub fn classify(reply: Option<&Packet>, expected_version: u8) -> HandshakeOutcome {
    let Some(packet) = reply else {
        return HandshakeOutcome::TimedOut;
    };

    match packet.cmd {
        NACK => match packet.payload.first() {
            Some(code) => HandshakeOutcome::Rejected(RejectReason::Nack(*code)),
            None => HandshakeOutcome::Rejected(RejectReason::MalformedNack),
        },
        ACK => match HelloAck::from_payload(&packet.payload) {
            None => HandshakeOutcome::Rejected(RejectReason::MalformedAck),
            Some(ack) if ack.version != expected_version => {
                HandshakeOutcome::Rejected(RejectReason::VersionMismatch {
                    expected: expected_version,
                    actual: ack.version,
                })
            }
            Some(ack) if ack.status != STATUS_OK => {
                HandshakeOutcome::Rejected(RejectReason::Status(ack.status))
            }
            Some(ack) => HandshakeOutcome::Accepted(ack),
        },
        other => HandshakeOutcome::Rejected(RejectReason::UnexpectedCommand(other)),
    }
}
