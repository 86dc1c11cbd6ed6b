//! Request dispatch
//!
//! Reply policy:
//! - HELLO is answered with ACK or NACK whether or not the gate is open
//! - GET requests are answered with a packet carrying the same command code
//!   and sequence number
//! - SET and HEARTBEAT requests are answered with `ACK [command, status]`
//! - Unknown codes, truncated requests and anything arriving before the
//!   handshake produce no reply at all

use core::time::Duration;

use hexapod_protocol::commands::{
    self, Command, MessageError, Request, HELLO, PROTOCOL_VERSION, STATUS_OK,
};
use hexapod_protocol::handshake;
use hexapod_protocol::Packet;

use super::gate::HandshakeGate;
use crate::link::{Link, LinkError};
use crate::traits::{AnalogSensors, PowerRelay, ServoBank, ServoChannel, Transport, TransportError};

/// Device identity and loop timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Only HELLOs carrying exactly this version are accepted
    pub protocol_version: u8,
    /// Reported in the handshake ACK
    pub device_id: u8,
    /// How long one `poll` waits for the first byte of a request
    pub poll_timeout: Duration,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION,
            device_id: 0x01,
            poll_timeout: Duration::from_micros(100),
        }
    }
}

/// Why a received packet produced no reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IgnoreReason {
    /// Request arrived before a successful handshake
    Gated,
    /// Command code not in the catalog, or not a host request
    UnknownCommand(u8),
    /// Payload shorter than the request's arguments
    Truncated,
    /// Sensor read failed, so there is nothing to report
    SensorFault,
}

/// Result of one `poll`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Dispatch {
    /// No request arrived
    Idle,
    /// A request was executed and answered
    Handled(Command),
    /// A packet arrived but was dropped
    Ignored(IgnoreReason),
}

/// Counters kept across the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceStats {
    pub handled: u32,
    pub ignored: u32,
    pub handshakes: u32,
}

/// Device-side dispatcher
pub struct Device<T: Transport, S, A, R> {
    link: Link<T>,
    servos: S,
    sensors: A,
    relay: R,
    gate: HandshakeGate,
    config: DeviceConfig,
    stats: DeviceStats,
}

impl<T, S, A, R> Device<T, S, A, R>
where
    T: Transport,
    S: ServoBank,
    A: AnalogSensors,
    R: PowerRelay,
{
    pub fn new(transport: T, servos: S, sensors: A, relay: R, config: DeviceConfig) -> Self {
        Self {
            link: Link::new(transport),
            servos,
            sensors,
            relay,
            gate: HandshakeGate::new(),
            config,
            stats: DeviceStats::default(),
        }
    }

    pub fn gate(&self) -> &HandshakeGate {
        &self.gate
    }

    pub fn stats(&self) -> DeviceStats {
        self.stats
    }

    pub fn servos(&self) -> &S {
        &self.servos
    }

    pub fn sensors(&self) -> &A {
        &self.sensors
    }

    pub fn relay(&self) -> &R {
        &self.relay
    }

    pub fn link_mut(&mut self) -> &mut Link<T> {
        &mut self.link
    }

    /// Wait briefly for one request and handle it
    pub fn poll(&mut self) -> Result<Dispatch, LinkError<T::Error>> {
        match self.link.poll_packet(self.config.poll_timeout) {
            Ok(packet) => self.handle(&packet),
            Err(TransportError::Timeout) => Ok(Dispatch::Idle),
            Err(TransportError::Io(error)) => Err(LinkError::Io(error)),
        }
    }

    /// Poll until `stop` returns true
    pub fn run_until(&mut self, mut stop: impl FnMut() -> bool) -> Result<(), LinkError<T::Error>> {
        while !stop() {
            self.poll()?;
        }
        Ok(())
    }

    /// Execute one received packet and send its reply, if any
    pub fn handle(&mut self, packet: &Packet) -> Result<Dispatch, LinkError<T::Error>> {
        let dispatch = self.dispatch(packet)?;
        match dispatch {
            Dispatch::Handled(_) => self.stats.handled = self.stats.handled.wrapping_add(1),
            Dispatch::Ignored(_) => self.stats.ignored = self.stats.ignored.wrapping_add(1),
            Dispatch::Idle => {}
        }
        Ok(dispatch)
    }

    fn dispatch(&mut self, packet: &Packet) -> Result<Dispatch, LinkError<T::Error>> {
        if packet.cmd == HELLO {
            return self.handle_hello(packet);
        }
        if !self.gate.is_open() {
            return Ok(Dispatch::Ignored(IgnoreReason::Gated));
        }

        let request = match Request::from_packet(packet) {
            Ok(request) => request,
            Err(MessageError::UnknownCommand(code)) => {
                return Ok(Dispatch::Ignored(IgnoreReason::UnknownCommand(code)))
            }
            Err(MessageError::Truncated) => return Ok(Dispatch::Ignored(IgnoreReason::Truncated)),
        };
        let seq = packet.seq;
        let command = request.command();

        let reply = match request {
            // Routed to handle_hello above
            Request::Hello { .. } => return self.handle_hello(packet),
            Request::SetAngleCalibrations(calibrations) => {
                for channel in ServoChannel::all() {
                    self.servos
                        .set_calibration(channel, calibrations[channel.index()]);
                }
                commands::command_ack(seq, command, STATUS_OK)?
            }
            Request::SetTargetAngle { channel, angle } => {
                if let Some(channel) = ServoChannel::new(channel) {
                    self.servos.set_angle(channel, angle as f32);
                }
                commands::command_ack(seq, command, STATUS_OK)?
            }
            Request::SetPowerRelay(value) => {
                match value {
                    1 => self.relay.set_power(true),
                    0 => self.relay.set_power(false),
                    _ => {}
                }
                commands::command_ack(seq, command, STATUS_OK)?
            }
            Request::GetAngleCalibrations => {
                commands::calibrations_reply(seq, &self.servos.calibrations())?
            }
            Request::GetCurrent => match self.sensors.read_current() {
                Ok(amps) => commands::float_reply(seq, command, amps)?,
                Err(_) => return Ok(Dispatch::Ignored(IgnoreReason::SensorFault)),
            },
            Request::GetVoltage => match self.sensors.read_voltage() {
                Ok(volts) => commands::float_reply(seq, command, volts)?,
                Err(_) => return Ok(Dispatch::Ignored(IgnoreReason::SensorFault)),
            },
            Request::GetSensor { channel } => match self.sensors.read_sensor(channel) {
                Ok(volts) => commands::float_reply(seq, command, volts)?,
                Err(_) => return Ok(Dispatch::Ignored(IgnoreReason::SensorFault)),
            },
            Request::Heartbeat => commands::command_ack(seq, command, STATUS_OK)?,
        };

        self.link.send_packet(&reply)?;
        Ok(Dispatch::Handled(command))
    }

    fn handle_hello(&mut self, packet: &Packet) -> Result<Dispatch, LinkError<T::Error>> {
        let reply = handshake::respond(
            &packet.payload,
            self.config.protocol_version,
            self.config.device_id,
        );
        if reply.is_ack() {
            self.gate.open();
            self.stats.handshakes = self.stats.handshakes.wrapping_add(1);
        }
        self.link.send_packet(&reply.to_packet(packet.seq)?)?;
        Ok(Dispatch::Handled(Command::Hello))
    }
}
