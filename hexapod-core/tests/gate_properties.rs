//! Property tests for the device handshake gate and the link decoder

use std::collections::VecDeque;
use std::time::Duration;

use hexapod_core::device::{Device, DeviceConfig, Dispatch, IgnoreReason};
use hexapod_core::traits::{
    AnalogSensors, PowerRelay, SensorError, ServoBank, ServoChannel, Transport, TransportError,
};
use hexapod_core::Link;
use hexapod_protocol::commands::{GET_VOLTAGE, HELLO, PROTOCOL_VERSION};
use hexapod_protocol::frame::encode;
use hexapod_protocol::{PulseCalibration, PulseRange, NUM_SERVOS};
use proptest::prelude::*;

/// Scripted input, recorded output; reads time out once the script is used up
#[derive(Default)]
struct Script {
    input: VecDeque<u8>,
    output: Vec<u8>,
}

impl Script {
    fn with_input(bytes: &[u8]) -> Self {
        Self {
            input: bytes.iter().copied().collect(),
            output: Vec::new(),
        }
    }
}

impl Transport for Script {
    type Error = ();

    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.output.extend_from_slice(data);
        Ok(())
    }

    fn read_byte(&mut self, _timeout: Duration) -> Result<u8, TransportError<Self::Error>> {
        self.input.pop_front().ok_or(TransportError::Timeout)
    }

    fn byte_timeout(&self) -> Duration {
        Duration::from_millis(1)
    }
}

#[derive(Default)]
struct Servos {
    ranges: [PulseRange; NUM_SERVOS],
    moves: u32,
}

impl ServoBank for Servos {
    fn set_calibration(&mut self, channel: ServoChannel, calibration: PulseCalibration) {
        self.ranges[channel.index()] = PulseRange {
            min_pulse: calibration.min_pulse as f32,
            max_pulse: calibration.max_pulse as f32,
        };
    }

    fn calibration(&self, channel: ServoChannel) -> PulseRange {
        self.ranges[channel.index()]
    }

    fn set_angle(&mut self, _channel: ServoChannel, _angle: f32) {
        self.moves += 1;
    }
}

struct Sensors;

impl AnalogSensors for Sensors {
    fn read_current(&mut self) -> Result<f32, SensorError> {
        Ok(1.0)
    }

    fn read_voltage(&mut self) -> Result<f32, SensorError> {
        Ok(7.0)
    }

    fn read_sensor(&mut self, _channel: u8) -> Result<f32, SensorError> {
        Ok(0.0)
    }
}

#[derive(Default)]
struct Relay(bool);

impl PowerRelay for Relay {
    fn set_power(&mut self, on: bool) {
        self.0 = on;
    }

    fn is_powered(&self) -> bool {
        self.0
    }
}

fn device(input: &[u8]) -> Device<Script, Servos, Sensors, Relay> {
    Device::new(
        Script::with_input(input),
        Servos::default(),
        Sensors,
        Relay::default(),
        DeviceConfig::default(),
    )
}

/// Poll until the script runs dry
fn drain(device: &mut Device<Script, Servos, Sensors, Relay>) -> Vec<Dispatch> {
    let mut seen = Vec::new();
    loop {
        match device.poll().unwrap() {
            Dispatch::Idle => return seen,
            dispatch => seen.push(dispatch),
        }
    }
}

proptest! {
    #[test]
    fn nothing_is_answered_before_a_handshake(
        requests in prop::collection::vec(
            (any::<u16>(), any::<u8>().prop_filter("not HELLO", |cmd| *cmd != HELLO),
             prop::collection::vec(any::<u8>(), 0..40)),
            1..8,
        ),
    ) {
        let mut stream = Vec::new();
        for (seq, cmd, payload) in &requests {
            stream.extend_from_slice(&encode(*seq, *cmd, payload).unwrap());
        }

        let mut device = device(&stream);
        let seen = drain(&mut device);

        prop_assert_eq!(seen.len(), requests.len());
        prop_assert!(seen.iter().all(|d| *d == Dispatch::Ignored(IgnoreReason::Gated)));
        prop_assert!(!device.gate().is_open());
        prop_assert!(!device.relay().is_powered());
        prop_assert_eq!(device.servos().moves, 0);
        prop_assert!(device.link_mut().transport().output.is_empty());
    }

    #[test]
    fn link_finds_the_frame_after_garbage(
        garbage in prop::collection::vec(any::<u8>().prop_filter("no STX", |b| *b != 0x7E), 0..300),
        seq in any::<u16>(),
        cmd in any::<u8>(),
        payload in prop::collection::vec(any::<u8>(), 0..64),
    ) {
        let mut stream = garbage;
        stream.extend_from_slice(&encode(seq, cmd, &payload).unwrap());

        let mut link = Link::new(Script::with_input(&stream));
        let packet = link.recv_packet().unwrap();
        prop_assert_eq!(packet.seq, seq);
        prop_assert_eq!(packet.cmd, cmd);
        prop_assert_eq!(&packet.payload[..], &payload[..]);
    }
}

#[test]
fn hello_opens_the_gate_for_later_requests() {
    let mut stream = encode(0, GET_VOLTAGE, &[]).unwrap().to_vec();
    stream.extend_from_slice(&encode(1, HELLO, &[PROTOCOL_VERSION, 0]).unwrap());
    stream.extend_from_slice(&encode(2, GET_VOLTAGE, &[]).unwrap());

    let mut device = device(&stream);
    let seen = drain(&mut device);

    assert_eq!(seen[0], Dispatch::Ignored(IgnoreReason::Gated));
    assert!(matches!(seen[1], Dispatch::Handled(_)));
    assert!(matches!(seen[2], Dispatch::Handled(_)));
    assert!(device.gate().is_open());
}
