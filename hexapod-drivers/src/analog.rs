//! Multiplexed analog sensors
//!
//! The servo controller board has one ADC channel behind a 3-bit analog
//! multiplexer. Addresses 0..=5 are the sensor headers, 6 is the servo rail
//! voltage divider and 7 the output of the current-sense amplifier.
//!
//! Conversions:
//! - voltage = raw × VREF / FULL_SCALE / gain
//! - current = voltage / shunt + offset

use embedded_hal::delay::DelayNs;
use hexapod_core::traits::{AnalogSensors, SensorError};
use hexapod_hal::{AdcInput, AnalogMux};

/// Mux address of the first sensor header
pub const SENSOR_1_ADDR: u8 = 0b000;

/// Mux address of the servo rail voltage divider
pub const VOLTAGE_SENSE_ADDR: u8 = 0b110;

/// Mux address of the current-sense amplifier
pub const CURRENT_SENSE_ADDR: u8 = 0b111;

/// Mux address mask (three address lines)
pub const MUX_ADDR_MASK: u8 = 0b111;

/// Analog front-end parameters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AnalogConfig {
    /// ADC reference voltage
    pub vref: f32,
    /// Divider ratio of the rail voltage input
    pub voltage_gain: f32,
    /// Current-sense amplifier gain
    pub current_gain: f32,
    /// Shunt resistance in ohms
    pub shunt_resistor: f32,
    /// Offset added to the computed current in amps
    pub current_offset: f32,
    /// Wait after switching the mux before converting
    pub settle_us: u32,
}

impl Default for AnalogConfig {
    fn default() -> Self {
        Self {
            vref: 3.3,
            voltage_gain: 0.280_586_08,
            current_gain: 69.0,
            shunt_resistor: 0.003,
            current_offset: -0.02,
            settle_us: 5,
        }
    }
}

/// Sensors sampled through the analog multiplexer
pub struct MuxedSensors<A, M, D> {
    adc: A,
    mux: M,
    delay: D,
    config: AnalogConfig,
}

impl<A, M, D> MuxedSensors<A, M, D>
where
    A: AdcInput,
    M: AnalogMux,
    D: DelayNs,
{
    pub fn new(adc: A, mux: M, delay: D, config: AnalogConfig) -> Self {
        Self {
            adc,
            mux,
            delay,
            config,
        }
    }

    pub fn config(&self) -> &AnalogConfig {
        &self.config
    }

    /// Select `address` and return the voltage at the ADC pin
    fn sample(&mut self, address: u8) -> Result<f32, SensorError> {
        self.mux.select(address & MUX_ADDR_MASK);
        if self.config.settle_us > 0 {
            self.delay.delay_us(self.config.settle_us);
        }
        let raw = self
            .adc
            .read_raw()
            .map_err(|_| SensorError::ConversionError)?;
        Ok(raw as f32 * self.config.vref / A::FULL_SCALE as f32)
    }
}

impl<A, M, D> AnalogSensors for MuxedSensors<A, M, D>
where
    A: AdcInput,
    M: AnalogMux,
    D: DelayNs,
{
    fn read_current(&mut self) -> Result<f32, SensorError> {
        let volts = self.sample(CURRENT_SENSE_ADDR)? / self.config.current_gain;
        Ok(volts / self.config.shunt_resistor + self.config.current_offset)
    }

    fn read_voltage(&mut self) -> Result<f32, SensorError> {
        Ok(self.sample(VOLTAGE_SENSE_ADDR)? / self.config.voltage_gain)
    }

    fn read_sensor(&mut self, channel: u8) -> Result<f32, SensorError> {
        self.sample(SENSOR_1_ADDR.wrapping_add(channel))
    }
}
