//! Host controller against the emulated device over an in-memory line
//!
//! The device end runs the firmware path (UART transport over an
//! `embedded-io` port) on its own thread; the host end drives it through the
//! normal controller API.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use hexapod_core::config::CalibrationTable;
use hexapod_core::device::DeviceStats;
use hexapod_core::host::Controller;
use hexapod_core::traits::ServoChannel;
use hexapod_drivers::{UartTransport, UartTransportConfig};
use hexapod_hal::IoUart;
use hexapod_protocol::HelloAck;
use tracing::{debug, info};

use crate::config::ServerConfig;
use crate::emulator::{self, MonotonicClock};
use crate::error::{Result, ServerError};
use crate::loopback::{self, LoopbackPort};
use crate::session;

/// Sensor headers read during the test
pub const SENSOR_CHANNELS: usize = 6;

/// What the host saw
#[derive(Debug, Clone, PartialEq)]
pub struct SelftestReport {
    pub device: HelloAck,
    /// Calibrations read back equal the ones sent
    pub calibrations_match: bool,
    pub voltage: f32,
    pub current: f32,
    pub sensors: [f32; SENSOR_CHANNELS],
    /// Counters reported by the device when it stopped
    pub device_stats: DeviceStats,
}

/// Run one full session against a fresh emulated device
pub fn run(config: &ServerConfig) -> Result<SelftestReport> {
    let table = config.calibration_table()?;
    let (host_port, device_port) = loopback::pair(config.serial.timeout());

    let running = Arc::new(AtomicBool::new(true));
    let flag = running.clone();
    let device_config = config.device.device_config();
    let device_thread = thread::Builder::new()
        .name("emulated-device".into())
        .spawn(move || {
            let transport = UartTransport::new(
                IoUart::new(device_port),
                MonotonicClock::new(),
                UartTransportConfig::default(),
            );
            let mut device = emulator::build(transport, device_config);
            emulator::run(&mut device, &flag)
        })?;

    // The host end stays open until the device thread has stopped
    let mut controller = Controller::new(host_port, config.handshake);
    let result = exercise(&mut controller, &table);

    running.store(false, Ordering::Relaxed);
    let stopped = device_thread
        .join()
        .map_err(|_| ServerError::Emulator("device thread panicked".into()))?;
    drop(controller);

    let mut report = result?;
    report.device_stats = stopped.map_err(|e| ServerError::Emulator(format!("{e:?}")))?;
    info!(?report, "selftest complete");
    Ok(report)
}

fn exercise(
    controller: &mut Controller<LoopbackPort>,
    table: &CalibrationTable,
) -> Result<SelftestReport> {
    let device = session::connect(controller)?;
    controller.heartbeat()?;

    controller.set_angle_calibrations(table)?;
    let readback = controller.get_angle_calibrations()?;
    let calibrations_match = table.iter().all(|(channel, sent)| {
        let range = readback[channel.index()];
        range.min_pulse == f32::from(sent.min_pulse) && range.max_pulse == f32::from(sent.max_pulse)
    });
    debug!(calibrations_match, "calibrations read back");

    controller.set_power_relay(true)?;
    for channel in ServoChannel::all() {
        controller.set_target_angle(channel, 0)?;
    }
    let voltage = controller.get_voltage()?;
    let current = controller.get_current()?;

    let mut sensors = [0.0; SENSOR_CHANNELS];
    for (channel, value) in (0u8..).zip(sensors.iter_mut()) {
        *value = controller.get_sensor(channel)?;
    }
    controller.set_power_relay(false)?;
    controller.close()?;

    Ok(SelftestReport {
        device,
        calibrations_match,
        voltage,
        current,
        sensors,
        device_stats: DeviceStats::default(),
    })
}
