//! Calibrated servo bank
//!
//! Each channel holds a `(min_pulse, max_pulse)` pair that is mapped
//! linearly onto -45°..+45°. Angles outside that range are clamped to the
//! calibrated end stops.

use hexapod_core::config::CalibrationTable;
use hexapod_core::traits::actuator::{MAX_ANGLE, MIN_ANGLE};
use hexapod_core::traits::{ServoBank, ServoChannel};
use hexapod_hal::PulseOutput;
use hexapod_protocol::{PulseCalibration, PulseRange, NUM_SERVOS};

/// Eighteen pulse outputs with per-channel calibration
pub struct CalibratedServos<P> {
    outputs: [P; NUM_SERVOS],
    ranges: [PulseRange; NUM_SERVOS],
}

impl<P: PulseOutput> CalibratedServos<P> {
    /// Create a bank using `table`; outputs stay disabled until moved
    pub fn new(outputs: [P; NUM_SERVOS], table: &CalibrationTable) -> Self {
        let mut servos = Self {
            outputs,
            ranges: [PulseRange::default(); NUM_SERVOS],
        };
        servos.apply_table(table);
        servos
    }

    /// Pulse width for `angle` on a channel with range `range`
    pub fn pulse_for(range: PulseRange, angle: f32) -> f32 {
        let angle = angle.clamp(MIN_ANGLE, MAX_ANGLE);
        let fraction = (angle - MIN_ANGLE) / (MAX_ANGLE - MIN_ANGLE);
        range.min_pulse + fraction * (range.max_pulse - range.min_pulse)
    }

    pub fn output(&self, channel: ServoChannel) -> &P {
        &self.outputs[channel.index()]
    }

    /// Stop pulses on every channel
    pub fn disable_all(&mut self) {
        for output in self.outputs.iter_mut() {
            output.disable();
        }
    }
}

impl<P: PulseOutput> ServoBank for CalibratedServos<P> {
    fn set_calibration(&mut self, channel: ServoChannel, calibration: PulseCalibration) {
        self.ranges[channel.index()] = PulseRange {
            min_pulse: calibration.min_pulse as f32,
            max_pulse: calibration.max_pulse as f32,
        };
    }

    fn calibration(&self, channel: ServoChannel) -> PulseRange {
        self.ranges[channel.index()]
    }

    fn set_angle(&mut self, channel: ServoChannel, angle: f32) {
        let pulse = Self::pulse_for(self.ranges[channel.index()], angle);
        self.outputs[channel.index()].set_pulse_width(pulse);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MockOutput {
        width: Option<f32>,
    }

    impl PulseOutput for MockOutput {
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

    fn bank() -> CalibratedServos<MockOutput> {
        CalibratedServos::new(Default::default(), &CalibrationTable::factory())
    }

    fn channel(index: u8) -> ServoChannel {
        ServoChannel::new(index).unwrap()
    }

    #[test]
    fn test_factory_calibration_applied() {
        let servos = bank();
        assert_eq!(
            servos.calibration(channel(0)),
            PulseRange {
                min_pulse: 1031.0,
                max_pulse: 2088.0
            }
        );
        assert!(servos.output(channel(0)).pulse_width().is_none());
    }

    #[test]
    fn test_angle_mapping() {
        let mut servos = bank();
        servos.set_calibration(
            channel(2),
            PulseCalibration {
                min_pulse: 1000,
                max_pulse: 2000,
            },
        );

        servos.set_angle(channel(2), -45.0);
        assert_eq!(servos.output(channel(2)).pulse_width(), Some(1000.0));
        servos.set_angle(channel(2), 0.0);
        assert_eq!(servos.output(channel(2)).pulse_width(), Some(1500.0));
        servos.set_angle(channel(2), 45.0);
        assert_eq!(servos.output(channel(2)).pulse_width(), Some(2000.0));
    }

    #[test]
    fn test_angle_clamped() {
        let mut servos = bank();
        servos.set_angle(channel(0), 300.0);
        assert_eq!(servos.output(channel(0)).pulse_width(), Some(2088.0));
        servos.set_angle(channel(0), -90.0);
        assert_eq!(servos.output(channel(0)).pulse_width(), Some(1031.0));
    }

    #[test]
    fn test_calibrations_readback() {
        let mut servos = bank();
        let mut table = CalibrationTable::factory();
        table[channel(17)] = PulseCalibration {
            min_pulse: 900,
            max_pulse: 2100,
        };
        servos.apply_table(&table);

        let ranges = servos.calibrations();
        assert_eq!(ranges[17].min_pulse, 900.0);
        assert_eq!(ranges[16].max_pulse, 1978.0);
    }

    #[test]
    fn test_disable_all() {
        let mut servos = bank();
        servos.set_angle(channel(1), 0.0);
        servos.disable_all();
        assert!(servos.output(channel(1)).pulse_width().is_none());
    }
}
