//! Servo power relay on a GPIO pin
//!
//! The pin can be configured as active-high (default) or active-low.

use hexapod_core::traits::PowerRelay;
use hexapod_hal::OutputPin;

/// Relay driven by one GPIO output
pub struct GpioRelay<P> {
    pin: P,
    /// If true, relay closed = pin LOW
    inverted: bool,
    /// Current logical state (true = servo rail powered)
    on: bool,
}

impl<P: OutputPin> GpioRelay<P> {
    /// Create a relay driver; the relay starts open
    pub fn new(pin: P, inverted: bool) -> Self {
        let mut relay = Self {
            pin,
            inverted,
            on: false,
        };
        relay.set_power(false);
        relay
    }

    pub fn new_active_high(pin: P) -> Self {
        Self::new(pin, false)
    }

    pub fn new_active_low(pin: P) -> Self {
        Self::new(pin, true)
    }

    pub fn pin(&self) -> &P {
        &self.pin
    }
}

impl<P: OutputPin> PowerRelay for GpioRelay<P> {
    fn set_power(&mut self, on: bool) {
        self.on = on;
        self.pin.set_state(on != self.inverted);
    }

    fn is_powered(&self) -> bool {
        self.on
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Mock GPIO pin for testing
    struct MockPin {
        high: bool,
    }

    impl OutputPin for MockPin {
        fn set_high(&mut self) {
            self.high = true;
        }

        fn set_low(&mut self) {
            self.high = false;
        }

        fn is_set_high(&self) -> bool {
            self.high
        }
    }

    #[test]
    fn test_active_high_relay() {
        let mut relay = GpioRelay::new_active_high(MockPin { high: true });
        assert!(!relay.is_powered());
        assert!(relay.pin().is_set_low());

        relay.set_power(true);
        assert!(relay.is_powered());
        assert!(relay.pin().is_set_high());
    }

    #[test]
    fn test_active_low_relay() {
        let mut relay = GpioRelay::new_active_low(MockPin { high: false });
        assert!(!relay.is_powered());
        assert!(relay.pin().is_set_high());

        relay.set_power(true);
        assert!(relay.pin().is_set_low());
    }
}
