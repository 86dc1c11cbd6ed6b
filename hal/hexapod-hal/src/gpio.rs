//! GPIO pin abstractions
//!
//! Provides the digital output trait used by the power relay driver, plus
//! an adapter for `embedded-hal` output pins.

use embedded_hal::digital::OutputPin as EhOutputPin;

/// Digital output pin
///
/// Implementations should handle the actual hardware register manipulation
/// for the specific chip.
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Set the pin to a specific state
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Check if the pin is currently set high
    fn is_set_high(&self) -> bool;

    /// Check if the pin is currently set low
    fn is_set_low(&self) -> bool {
        !self.is_set_high()
    }
}

/// Wraps an `embedded_hal::digital::OutputPin`
///
/// The driven level is tracked locally because `embedded-hal` output pins
/// are not required to be readable. A failed write leaves the tracked level
/// unchanged.
pub struct HalOutputPin<P> {
    pin: P,
    high: bool,
}

impl<P: EhOutputPin> HalOutputPin<P> {
    /// Wrap a pin, driving it low first
    pub fn new(mut pin: P) -> Self {
        let _ = pin.set_low();
        Self { pin, high: false }
    }

    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: EhOutputPin> OutputPin for HalOutputPin<P> {
    fn set_high(&mut self) {
        if self.pin.set_high().is_ok() {
            self.high = true;
        }
    }

    fn set_low(&mut self) {
        if self.pin.set_low().is_ok() {
            self.high = false;
        }
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;

    struct MockPin {
        high: bool,
        writes: u32,
    }

    impl ErrorType for MockPin {
        type Error = Infallible;
    }

    impl EhOutputPin for MockPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.high = false;
            self.writes += 1;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.high = true;
            self.writes += 1;
            Ok(())
        }
    }

    #[test]
    fn test_starts_low() {
        let pin = HalOutputPin::new(MockPin {
            high: true,
            writes: 0,
        });
        assert!(pin.is_set_low());
        assert!(!pin.release().high);
    }

    #[test]
    fn test_set_state_tracks_level() {
        let mut pin = HalOutputPin::new(MockPin {
            high: false,
            writes: 0,
        });
        pin.set_state(true);
        assert!(pin.is_set_high());
        pin.set_state(false);
        assert!(pin.is_set_low());

        let inner = pin.release();
        assert_eq!(inner.writes, 3);
        assert!(!inner.high);
    }
}
