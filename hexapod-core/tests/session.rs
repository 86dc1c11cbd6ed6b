//! Host controller against a device dispatcher over an in-memory pipe

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use hexapod_core::config::CalibrationTable;
use hexapod_core::device::{Device, DeviceConfig};
use hexapod_core::host::{Controller, ControllerConfig, ControllerError};
use hexapod_core::traits::{
    AnalogSensors, PowerRelay, SensorError, ServoBank, ServoChannel, Transport, TransportError,
};
use hexapod_protocol::commands::PROTOCOL_VERSION;
use hexapod_protocol::{HandshakeOutcome, PulseCalibration, PulseRange, RejectReason, NUM_SERVOS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Disconnected;

/// One end of a byte pipe
struct PipeEnd {
    tx: Sender<u8>,
    rx: Receiver<u8>,
    timeout: Duration,
}

fn pipe() -> (PipeEnd, PipeEnd) {
    let (a_tx, b_rx) = channel();
    let (b_tx, a_rx) = channel();
    let timeout = Duration::from_millis(50);
    (
        PipeEnd {
            tx: a_tx,
            rx: a_rx,
            timeout,
        },
        PipeEnd {
            tx: b_tx,
            rx: b_rx,
            timeout,
        },
    )
}

impl Transport for PipeEnd {
    type Error = Disconnected;

    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        for &byte in data {
            self.tx.send(byte).map_err(|_| Disconnected)?;
        }
        Ok(())
    }

    fn read_byte(&mut self, timeout: Duration) -> Result<u8, TransportError<Self::Error>> {
        match self.rx.recv_timeout(timeout) {
            Ok(byte) => Ok(byte),
            Err(RecvTimeoutError::Timeout) => Err(TransportError::Timeout),
            Err(RecvTimeoutError::Disconnected) => Err(TransportError::Io(Disconnected)),
        }
    }

    fn byte_timeout(&self) -> Duration {
        self.timeout
    }
}

#[derive(Default)]
struct Servos {
    ranges: [PulseRange; NUM_SERVOS],
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

    fn set_angle(&mut self, _channel: ServoChannel, _angle: f32) {}
}

struct Sensors;

impl AnalogSensors for Sensors {
    fn read_current(&mut self) -> Result<f32, SensorError> {
        Ok(0.75)
    }

    fn read_voltage(&mut self) -> Result<f32, SensorError> {
        Ok(7.4)
    }

    fn read_sensor(&mut self, channel: u8) -> Result<f32, SensorError> {
        Ok(channel as f32 / 10.0)
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

/// Run a device on its own thread until the returned flag is set
fn spawn_device(
    transport: PipeEnd,
    config: DeviceConfig,
) -> (Arc<AtomicBool>, thread::JoinHandle<()>) {
    let stop = Arc::new(AtomicBool::new(false));
    let flag = stop.clone();
    let handle = thread::spawn(move || {
        let mut device = Device::new(
            transport,
            Servos::default(),
            Sensors,
            Relay::default(),
            config,
        );
        let _ = device.run_until(|| flag.load(Ordering::Relaxed));
    });
    (stop, handle)
}

#[test]
fn full_session() {
    let (host, device) = pipe();
    let (stop, handle) = spawn_device(device, DeviceConfig::default());

    let mut controller = Controller::new(host, ControllerConfig::default());
    let ack = controller.handshake().unwrap();
    assert_eq!(ack.version, PROTOCOL_VERSION);
    assert_eq!(ack.device_id, 0x01);

    controller.heartbeat().unwrap();
    controller.set_power_relay(true).unwrap();
    controller
        .set_angle_calibrations(&CalibrationTable::factory())
        .unwrap();

    let ranges = controller.get_angle_calibrations().unwrap();
    assert_eq!(ranges[0].min_pulse, 1031.0);
    assert_eq!(ranges[17].max_pulse, 2027.0);

    assert_eq!(controller.get_current().unwrap(), 0.75);
    assert_eq!(controller.get_voltage().unwrap(), 7.4);
    assert_eq!(controller.get_sensor(5).unwrap(), 0.5);
    controller
        .set_target_angle(ServoChannel::new(3).unwrap(), 20)
        .unwrap();

    stop.store(true, Ordering::Relaxed);
    handle.join().unwrap();
}

#[test]
fn version_mismatch_is_fatal() {
    let (host, device) = pipe();
    let config = DeviceConfig {
        protocol_version: PROTOCOL_VERSION + 1,
        ..DeviceConfig::default()
    };
    let (stop, handle) = spawn_device(device, config);

    let mut controller = Controller::new(host, ControllerConfig::default());
    match controller.handshake() {
        Err(ControllerError::HandshakeFailed { attempts, last }) => {
            assert_eq!(attempts, 3);
            assert!(matches!(
                last,
                HandshakeOutcome::Rejected(RejectReason::Nack(_))
            ));
        }
        other => panic!("unexpected handshake result: {other:?}"),
    }
    assert_eq!(controller.heartbeat(), Err(ControllerError::NotConnected));

    stop.store(true, Ordering::Relaxed);
    handle.join().unwrap();
}

#[test]
fn silent_device_times_out() {
    let (host, _device) = pipe();
    let config = ControllerConfig {
        attempts: 2,
        reply_attempts: 1,
        ..ControllerConfig::default()
    };

    let mut controller = Controller::new(host, config);
    assert_eq!(
        controller.handshake(),
        Err(ControllerError::HandshakeFailed {
            attempts: 2,
            last: HandshakeOutcome::TimedOut,
        })
    );
}
