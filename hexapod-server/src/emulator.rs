//! Virtual leg controller
//!
//! Runs the device dispatcher with the real drivers on top of simulated
//! peripherals. The simulated ADC reading depends on the selected
//! multiplexer address.

use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital;
use hexapod_core::config::CalibrationTable;
use hexapod_core::device::{Device, DeviceConfig, DeviceStats, Dispatch};
use hexapod_core::traits::{PowerRelay, Transport};
use hexapod_core::LinkError;
use hexapod_drivers::{AnalogConfig, CalibratedServos, GpioRelay, MuxedSensors};
use hexapod_hal::{AdcInput, AnalogMux, Clock, HalOutputPin, PulseOutput};
use hexapod_protocol::{Command, NUM_SERVOS};
use tracing::{debug, info, warn};

/// Raw ADC counts per mux address
///
/// Addresses 0..=5 are the sensor headers, 6 reads about 7.4 V on the servo
/// rail and 7 about 0.5 A through the shunt.
pub const DEFAULT_LEVELS: [u16; 8] = [0, 410, 819, 1229, 1638, 2048, 2577, 134];

/// PWM channel that records the last pulse width
#[derive(Debug, Default)]
pub struct SimPulse {
    width: Option<f32>,
}

impl PulseOutput for SimPulse {
    fn set_pulse_width(&mut self, micros: f32) {
        self.width = Some(micros);
    }

    fn disable(&mut self) {
        self.width = None;
    }

    fn pulse_width(&self) -> Option<f32> {
        self.width
    }
}

/// Relay drive pin
#[derive(Debug, Default)]
pub struct SimPin;

impl digital::ErrorType for SimPin {
    type Error = Infallible;
}

impl digital::OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Mux address lines shared with [`SimAdc`]
#[derive(Debug, Clone, Default)]
pub struct SimMux {
    address: Arc<AtomicU8>,
}

impl AnalogMux for SimMux {
    fn select(&mut self, address: u8) {
        self.address.store(address, Ordering::Relaxed);
    }
}

/// ADC behind the mux
#[derive(Debug)]
pub struct SimAdc {
    address: Arc<AtomicU8>,
    levels: [u16; 8],
}

impl SimAdc {
    pub fn new(mux: &SimMux, levels: [u16; 8]) -> Self {
        Self {
            address: mux.address.clone(),
            levels,
        }
    }
}

impl AdcInput for SimAdc {
    type Error = Infallible;

    fn read_raw(&mut self) -> Result<u16, Self::Error> {
        let address = self.address.load(Ordering::Relaxed) as usize;
        Ok(self.levels[address % self.levels.len()])
    }
}

/// Blocking delay on the host thread
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(u64::from(ns)));
    }
}

/// Microseconds since construction
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_micros(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_micros()).unwrap_or(u64::MAX)
    }
}

pub type EmulatedServos = CalibratedServos<SimPulse>;
pub type EmulatedSensors = MuxedSensors<SimAdc, SimMux, StdDelay>;
pub type EmulatedRelay = GpioRelay<HalOutputPin<SimPin>>;
pub type EmulatedDevice<T> = Device<T, EmulatedServos, EmulatedSensors, EmulatedRelay>;

/// Device with factory calibrations, relay off and [`DEFAULT_LEVELS`]
pub fn build<T: Transport>(transport: T, config: DeviceConfig) -> EmulatedDevice<T> {
    let outputs: [SimPulse; NUM_SERVOS] = core::array::from_fn(|_| SimPulse::default());
    let servos = CalibratedServos::new(outputs, &CalibrationTable::factory());

    let mux = SimMux::default();
    let adc = SimAdc::new(&mux, DEFAULT_LEVELS);
    let sensors = MuxedSensors::new(adc, mux, StdDelay, AnalogConfig::default());

    let relay = GpioRelay::new_active_high(HalOutputPin::new(SimPin));

    Device::new(transport, servos, sensors, relay, config)
}

/// Serve requests until `running` is cleared
pub fn run<T: Transport>(
    device: &mut EmulatedDevice<T>,
    running: &AtomicBool,
) -> Result<DeviceStats, LinkError<T::Error>> {
    info!("emulated device ready");
    while running.load(Ordering::Relaxed) {
        match device.poll()? {
            Dispatch::Idle => {}
            Dispatch::Handled(Command::Hello) => {
                info!(
                    accepted = device.gate().is_open(),
                    handshakes = device.stats().handshakes,
                    "hello answered"
                );
            }
            Dispatch::Handled(command) => {
                debug!(?command, powered = device.relay().is_powered(), "handled");
            }
            Dispatch::Ignored(reason) => warn!(?reason, "request ignored"),
        }
    }

    let stats = device.stats();
    info!(
        handled = stats.handled,
        ignored = stats.ignored,
        handshakes = stats.handshakes,
        "emulated device stopped"
    );
    Ok(stats)
}
