//! Command catalog and request/response payloads
//!
//! Command codes are divided into two groups:
//! - Handshake: HELLO, ACK, NACK
//! - Leg control: calibration, target angle, power relay, sensor reads
//!
//! Requests carry their arguments in the packet payload. GET replies reuse
//! the request's command code and sequence number; SET and HEARTBEAT
//! requests are answered with `ACK [command, status]`.

use crate::frame::{FrameError, Packet};
use crate::scalar::{PayloadReader, PayloadWriter};

// Handshake
pub const HELLO: u8 = 0x10;
pub const ACK: u8 = 0x11;
pub const NACK: u8 = 0x12;

// Leg control
pub const SET_ANGLE_CALIBRATIONS: u8 = 0x01;
pub const SET_TARGET_ANGLE: u8 = 0x02;
pub const SET_POWER_RELAY: u8 = 0x03;
pub const GET_ANGLE_CALIBRATIONS: u8 = 0x04;
pub const GET_CURRENT: u8 = 0x05;
pub const GET_VOLTAGE: u8 = 0x06;
pub const GET_SENSOR: u8 = 0x07;
pub const HEARTBEAT: u8 = 0x08;

// Status codes
pub const STATUS_OK: u8 = 0x00;
pub const STATUS_BUSY: u8 = 0x01;

// Error codes
pub const ERR_TIMEOUT: u8 = 0xA1;
pub const ERR_VERSION_MISMATCH: u8 = 0xA2;

/// Protocol version; host and device must match exactly
pub const PROTOCOL_VERSION: u8 = 0x01;

/// Number of servo channels on the controller
pub const NUM_SERVOS: usize = 18;

/// Known command codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    Hello,
    Ack,
    Nack,
    SetAngleCalibrations,
    SetTargetAngle,
    SetPowerRelay,
    GetAngleCalibrations,
    GetCurrent,
    GetVoltage,
    GetSensor,
    Heartbeat,
}

impl Command {
    /// Parse a command from its wire code
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            HELLO => Some(Command::Hello),
            ACK => Some(Command::Ack),
            NACK => Some(Command::Nack),
            SET_ANGLE_CALIBRATIONS => Some(Command::SetAngleCalibrations),
            SET_TARGET_ANGLE => Some(Command::SetTargetAngle),
            SET_POWER_RELAY => Some(Command::SetPowerRelay),
            GET_ANGLE_CALIBRATIONS => Some(Command::GetAngleCalibrations),
            GET_CURRENT => Some(Command::GetCurrent),
            GET_VOLTAGE => Some(Command::GetVoltage),
            GET_SENSOR => Some(Command::GetSensor),
            HEARTBEAT => Some(Command::Heartbeat),
            _ => None,
        }
    }

    /// Convert to wire code
    pub fn to_byte(self) -> u8 {
        match self {
            Command::Hello => HELLO,
            Command::Ack => ACK,
            Command::Nack => NACK,
            Command::SetAngleCalibrations => SET_ANGLE_CALIBRATIONS,
            Command::SetTargetAngle => SET_TARGET_ANGLE,
            Command::SetPowerRelay => SET_POWER_RELAY,
            Command::GetAngleCalibrations => GET_ANGLE_CALIBRATIONS,
            Command::GetCurrent => GET_CURRENT,
            Command::GetVoltage => GET_VOLTAGE,
            Command::GetSensor => GET_SENSOR,
            Command::Heartbeat => HEARTBEAT,
        }
    }

    /// Returns true for the handshake messages (HELLO/ACK/NACK)
    pub fn is_handshake(&self) -> bool {
        matches!(self, Command::Hello | Command::Ack | Command::Nack)
    }

    /// Returns true if the device answers with a data reply rather than an ACK
    pub fn has_data_reply(&self) -> bool {
        matches!(
            self,
            Command::GetAngleCalibrations
                | Command::GetCurrent
                | Command::GetVoltage
                | Command::GetSensor
        )
    }
}

/// Calibration pair as sent by the host (pulse widths in microseconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PulseCalibration {
    pub min_pulse: u16,
    pub max_pulse: u16,
}

/// Calibration pair as reported by the device
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PulseRange {
    pub min_pulse: f32,
    pub max_pulse: f32,
}

/// Payload parsing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MessageError {
    /// Command code not in the catalog
    UnknownCommand(u8),
    /// Payload shorter than the command's fixed arguments
    Truncated,
}

/// Requests sent from the host to the device
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Request {
    /// Start (or restart) the session
    Hello { version: u8, capabilities: u8 },
    /// Replace all servo calibrations
    SetAngleCalibrations([PulseCalibration; NUM_SERVOS]),
    /// Move one servo
    SetTargetAngle { channel: u8, angle: u16 },
    /// Switch the servo power relay; only 0 and 1 are meaningful
    SetPowerRelay(u8),
    /// Read back all servo calibrations
    GetAngleCalibrations,
    /// Read servo rail current
    GetCurrent,
    /// Read servo rail voltage
    GetVoltage,
    /// Read one analog sensor
    GetSensor { channel: u8 },
    /// Liveness check
    Heartbeat,
}

impl Request {
    /// Command code for this request
    pub fn command(&self) -> Command {
        match self {
            Request::Hello { .. } => Command::Hello,
            Request::SetAngleCalibrations(_) => Command::SetAngleCalibrations,
            Request::SetTargetAngle { .. } => Command::SetTargetAngle,
            Request::SetPowerRelay(_) => Command::SetPowerRelay,
            Request::GetAngleCalibrations => Command::GetAngleCalibrations,
            Request::GetCurrent => Command::GetCurrent,
            Request::GetVoltage => Command::GetVoltage,
            Request::GetSensor { .. } => Command::GetSensor,
            Request::Heartbeat => Command::Heartbeat,
        }
    }

    /// Parse a request from a received packet
    pub fn from_packet(packet: &Packet) -> Result<Self, MessageError> {
        let command =
            Command::from_byte(packet.cmd).ok_or(MessageError::UnknownCommand(packet.cmd))?;
        let mut reader = PayloadReader::new(&packet.payload);

        let request = match command {
            Command::Hello => Request::Hello {
                version: reader.read_u8().ok_or(MessageError::Truncated)?,
                capabilities: reader.read_u8().ok_or(MessageError::Truncated)?,
            },
            Command::SetAngleCalibrations => {
                let mut calibrations = [PulseCalibration::default(); NUM_SERVOS];
                for calibration in calibrations.iter_mut() {
                    calibration.min_pulse = reader.read_u16().ok_or(MessageError::Truncated)?;
                    calibration.max_pulse = reader.read_u16().ok_or(MessageError::Truncated)?;
                }
                Request::SetAngleCalibrations(calibrations)
            }
            Command::SetTargetAngle => Request::SetTargetAngle {
                channel: reader.read_u8().ok_or(MessageError::Truncated)?,
                angle: reader.read_u16().ok_or(MessageError::Truncated)?,
            },
            Command::SetPowerRelay => {
                Request::SetPowerRelay(reader.read_u8().ok_or(MessageError::Truncated)?)
            }
            Command::GetAngleCalibrations => Request::GetAngleCalibrations,
            Command::GetCurrent => Request::GetCurrent,
            Command::GetVoltage => Request::GetVoltage,
            Command::GetSensor => Request::GetSensor {
                channel: reader.read_u8().ok_or(MessageError::Truncated)?,
            },
            Command::Heartbeat => Request::Heartbeat,
            // Device-to-host messages are never requests
            Command::Ack | Command::Nack => return Err(MessageError::UnknownCommand(packet.cmd)),
        };

        Ok(request)
    }

    /// Encode this request into a packet
    pub fn to_packet(&self, seq: u16) -> Result<Packet, FrameError> {
        let mut writer = PayloadWriter::new();
        match self {
            Request::Hello {
                version,
                capabilities,
            } => {
                writer.put_u8(*version)?.put_u8(*capabilities)?;
            }
            Request::SetAngleCalibrations(calibrations) => {
                for calibration in calibrations {
                    writer
                        .put_u16(calibration.min_pulse)?
                        .put_u16(calibration.max_pulse)?;
                }
            }
            Request::SetTargetAngle { channel, angle } => {
                writer.put_u8(*channel)?.put_u16(*angle)?;
            }
            Request::SetPowerRelay(value) => {
                writer.put_u8(*value)?;
            }
            Request::GetSensor { channel } => {
                writer.put_u8(*channel)?;
            }
            Request::GetAngleCalibrations
            | Request::GetCurrent
            | Request::GetVoltage
            | Request::Heartbeat => {}
        }
        Packet::new(seq, self.command().to_byte(), writer.as_slice())
    }
}

/// Build an `ACK [command, status]` reply for a SET/HEARTBEAT request
pub fn command_ack(seq: u16, command: Command, status: u8) -> Result<Packet, FrameError> {
    Packet::new(seq, ACK, &[command.to_byte(), status])
}

/// Build a `NACK [error]` reply
pub fn nack(seq: u16, error_code: u8) -> Result<Packet, FrameError> {
    Packet::new(seq, NACK, &[error_code])
}

/// Build a single-float data reply (current, voltage, sensor)
pub fn float_reply(seq: u16, command: Command, value: f32) -> Result<Packet, FrameError> {
    Packet::new(seq, command.to_byte(), &value.to_le_bytes())
}

/// Build the GET_ANGLE_CALIBRATIONS reply
pub fn calibrations_reply(
    seq: u16,
    calibrations: &[PulseRange; NUM_SERVOS],
) -> Result<Packet, FrameError> {
    let mut writer = PayloadWriter::new();
    for range in calibrations {
        writer.put_f32(range.min_pulse)?.put_f32(range.max_pulse)?;
    }
    Packet::new(seq, GET_ANGLE_CALIBRATIONS, writer.as_slice())
}

/// Parse a single-float data reply
pub fn parse_float_reply(packet: &Packet) -> Option<f32> {
    PayloadReader::new(&packet.payload).read_f32()
}

/// Parse the GET_ANGLE_CALIBRATIONS reply
pub fn parse_calibrations_reply(packet: &Packet) -> Option<[PulseRange; NUM_SERVOS]> {
    let mut reader = PayloadReader::new(&packet.payload);
    let mut ranges = [PulseRange::default(); NUM_SERVOS];
    for range in ranges.iter_mut() {
        range.min_pulse = reader.read_f32()?;
        range.max_pulse = reader.read_f32()?;
    }
    Some(ranges)
}

/// Parse an `ACK [command, status]` reply into `(command code, status)`
pub fn parse_command_ack(packet: &Packet) -> Option<(u8, u8)> {
    let mut reader = PayloadReader::new(&packet.payload);
    Some((reader.read_u8()?, reader.read_u8()?))
}
