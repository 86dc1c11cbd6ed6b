//! Analog acquisition abstractions
//!
//! The servo controller board routes its analog inputs (sensor headers,
//! rail voltage and rail current sense) through one multiplexer in front of
//! a single ADC channel.

/// Single ADC input
pub trait AdcInput {
    /// Error type for conversions
    type Error;

    /// Full-scale count of a conversion (4096 for a 12-bit ADC)
    const FULL_SCALE: u16 = 4096;

    /// Run one conversion and return the raw count
    fn read_raw(&mut self) -> Result<u16, Self::Error>;
}

/// Analog multiplexer with address lines driven by GPIO
pub trait AnalogMux {
    /// Number of address bits
    const ADDRESS_BITS: u8 = 3;

    /// Route input `address` to the ADC
    ///
    /// Only the low `ADDRESS_BITS` of `address` are meaningful.
    fn select(&mut self, address: u8);
}
