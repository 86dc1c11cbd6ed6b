//! Servo pulse outputs
//!
//! Hobby servos read the width of a pulse repeated every 20 ms. A
//! [`PulseOutput`] is one such output; [`DutyCyclePulse`] builds it on top
//! of an `embedded-hal` PWM channel running at the servo frame rate.

use embedded_hal::pwm::SetDutyCycle;

/// Standard servo frame period (50 Hz)
pub const SERVO_PERIOD_US: u32 = 20_000;

/// One servo pulse output
pub trait PulseOutput {
    /// Drive pulses of `micros` width
    fn set_pulse_width(&mut self, micros: f32);

    /// Stop driving pulses (servo goes limp)
    fn disable(&mut self);

    /// Current pulse width, or `None` while disabled
    fn pulse_width(&self) -> Option<f32>;
}

/// Pulse output over a PWM channel whose period is `period_us`
pub struct DutyCyclePulse<P> {
    channel: P,
    period_us: u32,
    width: Option<f32>,
}

impl<P: SetDutyCycle> DutyCyclePulse<P> {
    /// Wrap a channel already configured for `period_us`
    pub fn new(channel: P, period_us: u32) -> Self {
        Self {
            channel,
            period_us,
            width: None,
        }
    }

    /// Wrap a channel configured for the standard 50 Hz servo frame
    pub fn servo(channel: P) -> Self {
        Self::new(channel, SERVO_PERIOD_US)
    }

    /// Duty count for a pulse width, clamped to the period
    fn duty_for(&self, micros: f32) -> u16 {
        let max = self.channel.max_duty_cycle() as f32;
        let fraction = (micros / self.period_us as f32).clamp(0.0, 1.0);
        (fraction * max + 0.5) as u16
    }

    pub fn release(self) -> P {
        self.channel
    }
}

impl<P: SetDutyCycle> PulseOutput for DutyCyclePulse<P> {
    fn set_pulse_width(&mut self, micros: f32) {
        let duty = self.duty_for(micros);
        if self.channel.set_duty_cycle(duty).is_ok() {
            self.width = Some(micros);
        }
    }

    fn disable(&mut self) {
        if self.channel.set_duty_cycle_fully_off().is_ok() {
            self.width = None;
        }
    }

    fn pulse_width(&self) -> Option<f32> {
        self.width
    }
}
