//! Host controller and handshake retry policy

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use hexapod_protocol::commands::{
    parse_calibrations_reply, parse_command_ack, parse_float_reply, Request, ACK, NACK,
    PROTOCOL_VERSION, STATUS_OK,
};
use hexapod_protocol::handshake::{classify, Hello};
use hexapod_protocol::{HandshakeOutcome, HelloAck, Packet, PulseRange, NUM_SERVOS};

use super::error::ControllerError;
use crate::config::CalibrationTable;
use crate::link::Link;
use crate::state::{HandshakeEvent, HandshakeState};
use crate::traits::{ServoChannel, Transport, TransportError};

/// Retry budget and handshake parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ControllerConfig {
    /// Handshake attempts before giving up (at least one is always made)
    pub attempts: u32,
    /// Receive timeouts to sit through while waiting for one reply
    pub reply_attempts: u32,
    /// Capabilities byte sent in HELLO
    pub capabilities: u8,
    /// Version sent in HELLO and required in the ACK
    pub protocol_version: u8,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            reply_attempts: 10,
            capabilities: 0,
            protocol_version: PROTOCOL_VERSION,
        }
    }
}

/// Host side of one link session
pub struct Controller<T: Transport> {
    link: Link<T>,
    config: ControllerConfig,
    state: HandshakeState,
}

impl<T: Transport> Controller<T> {
    pub fn new(transport: T, config: ControllerConfig) -> Self {
        Self {
            link: Link::new(transport),
            config,
            state: HandshakeState::Idle,
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// State of the most recent handshake attempt
    pub fn state(&self) -> HandshakeState {
        self.state
    }

    /// Identity reported by the device, once connected
    pub fn device(&self) -> Option<HelloAck> {
        match self.state {
            HandshakeState::Accepted(ack) => Some(ack),
            _ => None,
        }
    }

    pub fn link_mut(&mut self) -> &mut Link<T> {
        &mut self.link
    }

    pub fn into_inner(self) -> T {
        self.link.into_inner()
    }

    /// Open the transport; the session starts unconnected
    pub fn open(&mut self) -> Result<(), ControllerError<T::Error>> {
        self.state = HandshakeState::Idle;
        self.link.open().map_err(ControllerError::Io)
    }

    pub fn close(&mut self) -> Result<(), ControllerError<T::Error>> {
        self.state = HandshakeState::Idle;
        self.link.close().map_err(ControllerError::Io)
    }

    /// Handshake with up to `attempts` fresh HELLO exchanges
    ///
    /// Timeouts and rejections are both retried. The first accepted reply
    /// wins.
    pub fn handshake(&mut self) -> Result<HelloAck, ControllerError<T::Error>> {
        let attempts = self.config.attempts.max(1);
        let mut last = HandshakeOutcome::TimedOut;

        for _ in 0..attempts {
            last = self.handshake_once()?;
            if let HandshakeOutcome::Accepted(ack) = last {
                return Ok(ack);
            }
        }

        Err(ControllerError::HandshakeFailed { attempts, last })
    }

    /// One HELLO exchange
    pub fn handshake_once(&mut self) -> Result<HandshakeOutcome, ControllerError<T::Error>> {
        if self.state.is_terminal() {
            self.state = self.state.transition(HandshakeEvent::Retry);
        }
        self.link.discard_input();

        let seq = self.link.next_seq();
        let hello = Hello {
            version: self.config.protocol_version,
            capabilities: self.config.capabilities,
        };
        self.link.send_packet(&hello.to_packet(seq)?)?;
        self.state = self.state.transition(HandshakeEvent::HelloSent);

        let reply = self.await_reply(seq, |_| true)?;
        let outcome = classify(reply.as_ref(), self.config.protocol_version);
        self.state = self.state.transition(outcome.into());
        Ok(outcome)
    }

    /// Replace all servo calibrations
    pub fn set_angle_calibrations(
        &mut self,
        table: &CalibrationTable,
    ) -> Result<(), ControllerError<T::Error>> {
        self.request_ack(Request::SetAngleCalibrations(*table.entries()))
    }

    /// Move one servo to `angle` degrees
    pub fn set_target_angle(
        &mut self,
        channel: ServoChannel,
        angle: u16,
    ) -> Result<(), ControllerError<T::Error>> {
        self.request_ack(Request::SetTargetAngle {
            channel: channel.raw(),
            angle,
        })
    }

    /// Switch the servo power relay
    pub fn set_power_relay(&mut self, on: bool) -> Result<(), ControllerError<T::Error>> {
        self.request_ack(Request::SetPowerRelay(u8::from(on)))
    }

    /// Read back every channel's calibration
    pub fn get_angle_calibrations(
        &mut self,
    ) -> Result<[PulseRange; NUM_SERVOS], ControllerError<T::Error>> {
        let reply = self.request_data(Request::GetAngleCalibrations)?;
        parse_calibrations_reply(&reply).ok_or(ControllerError::Malformed {
            command: reply.cmd,
        })
    }

    /// Servo rail current in amps
    pub fn get_current(&mut self) -> Result<f32, ControllerError<T::Error>> {
        self.request_float(Request::GetCurrent)
    }

    /// Servo rail voltage in volts
    pub fn get_voltage(&mut self) -> Result<f32, ControllerError<T::Error>> {
        self.request_float(Request::GetVoltage)
    }

    /// Voltage at one sensor input
    pub fn get_sensor(&mut self, channel: u8) -> Result<f32, ControllerError<T::Error>> {
        self.request_float(Request::GetSensor { channel })
    }

    /// Check that the device is still answering
    pub fn heartbeat(&mut self) -> Result<(), ControllerError<T::Error>> {
        self.request_ack(Request::Heartbeat)
    }

    fn send_request(&mut self, request: &Request) -> Result<u16, ControllerError<T::Error>> {
        if !self.state.is_accepted() {
            return Err(ControllerError::NotConnected);
        }
        let seq = self.link.next_seq();
        self.link.send_packet(&request.to_packet(seq)?)?;
        Ok(seq)
    }

    fn request_ack(&mut self, request: Request) -> Result<(), ControllerError<T::Error>> {
        let command = request.command().to_byte();
        let seq = self.send_request(&request)?;
        let reply = self
            .await_reply(seq, |p| p.cmd == ACK || p.cmd == NACK)?
            .ok_or(ControllerError::NoReply { command })?;

        if reply.cmd == NACK {
            let error_code = reply
                .payload
                .first()
                .copied()
                .ok_or(ControllerError::Malformed { command })?;
            return Err(ControllerError::Nack {
                command,
                error_code,
            });
        }

        match parse_command_ack(&reply) {
            Some((acked, STATUS_OK)) if acked == command => Ok(()),
            Some((acked, status)) if acked == command => {
                Err(ControllerError::Status { command, status })
            }
            _ => Err(ControllerError::Malformed { command }),
        }
    }

    fn request_data(&mut self, request: Request) -> Result<Packet, ControllerError<T::Error>> {
        let command = request.command().to_byte();
        let seq = self.send_request(&request)?;
        let reply = self
            .await_reply(seq, |p| p.cmd == command || p.cmd == NACK)?
            .ok_or(ControllerError::NoReply { command })?;

        if reply.cmd == NACK {
            let error_code = reply.payload.first().copied().unwrap_or_default();
            return Err(ControllerError::Nack {
                command,
                error_code,
            });
        }
        Ok(reply)
    }

    fn request_float(&mut self, request: Request) -> Result<f32, ControllerError<T::Error>> {
        let command = request.command().to_byte();
        let reply = self.request_data(request)?;
        parse_float_reply(&reply).ok_or(ControllerError::Malformed { command })
    }

    /// Wait for the packet carrying `seq` that `accept` recognises
    ///
    /// Unrelated packets are dropped. Gives up after `reply_attempts`
    /// receive timeouts.
    fn await_reply(
        &mut self,
        seq: u16,
        accept: impl Fn(&Packet) -> bool,
    ) -> Result<Option<Packet>, ControllerError<T::Error>> {
        let mut timeouts = 0;
        loop {
            match self.link.recv_packet() {
                Ok(packet) if packet.seq == seq && accept(&packet) => return Ok(Some(packet)),
                Ok(_) => {}
                Err(TransportError::Timeout) => {
                    timeouts += 1;
                    if timeouts >= self.config.reply_attempts.max(1) {
                        return Ok(None);
                    }
                }
                Err(TransportError::Io(error)) => return Err(ControllerError::Io(error)),
            }
        }
    }
}
