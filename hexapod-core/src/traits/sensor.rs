//! Analog sensor trait

/// Errors that can occur while sampling an analog input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// ADC conversion failed
    ConversionError,
}

/// Analog inputs of the servo controller board
///
/// Takes `&mut self` because reads switch the multiplexer.
pub trait AnalogSensors {
    /// Servo rail current in amps
    fn read_current(&mut self) -> Result<f32, SensorError>;

    /// Servo rail voltage in volts
    fn read_voltage(&mut self) -> Result<f32, SensorError>;

    /// Voltage at sensor input `channel`
    ///
    /// Any channel id is accepted; boards wrap it onto their inputs.
    fn read_sensor(&mut self, channel: u8) -> Result<f32, SensorError>;
}
