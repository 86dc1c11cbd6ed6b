//! Servo bank trait

use hexapod_protocol::{PulseCalibration, PulseRange, NUM_SERVOS};

use crate::config::CalibrationTable;

/// Lowest commandable joint angle (degrees)
pub const MIN_ANGLE: f32 = -45.0;

/// Highest commandable joint angle (degrees)
pub const MAX_ANGLE: f32 = 45.0;

/// Index of one servo output, always below [`NUM_SERVOS`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ServoChannel(u8);

impl ServoChannel {
    /// `None` if `index` is not a valid channel
    pub const fn new(index: u8) -> Option<Self> {
        if (index as usize) < NUM_SERVOS {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Channel `index` modulo [`NUM_SERVOS`]
    pub const fn wrapping(index: u8) -> Self {
        Self(index % NUM_SERVOS as u8)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn raw(self) -> u8 {
        self.0
    }

    /// All channels in ascending order
    pub fn all() -> impl Iterator<Item = ServoChannel> {
        (0..NUM_SERVOS as u8).map(ServoChannel)
    }
}

/// Calibrated servo outputs
///
/// Each channel maps its calibration pair linearly onto
/// [`MIN_ANGLE`]..=[`MAX_ANGLE`].
pub trait ServoBank {
    /// Replace one channel's calibration
    fn set_calibration(&mut self, channel: ServoChannel, calibration: PulseCalibration);

    /// Current calibration of one channel
    fn calibration(&self, channel: ServoChannel) -> PulseRange;

    /// Move one channel to `angle` degrees
    fn set_angle(&mut self, channel: ServoChannel, angle: f32);

    /// Replace every channel's calibration
    fn apply_table(&mut self, table: &CalibrationTable) {
        for channel in ServoChannel::all() {
            self.set_calibration(channel, table[channel]);
        }
    }

    /// Calibrations of all channels in channel order
    fn calibrations(&self) -> [PulseRange; NUM_SERVOS] {
        let mut ranges = [PulseRange::default(); NUM_SERVOS];
        for channel in ServoChannel::all() {
            ranges[channel.index()] = self.calibration(channel);
        }
        ranges
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_bounds() {
        assert_eq!(ServoChannel::new(0).map(ServoChannel::index), Some(0));
        assert_eq!(ServoChannel::new(17).map(ServoChannel::index), Some(17));
        assert_eq!(ServoChannel::new(18), None);
        assert_eq!(ServoChannel::new(u8::MAX), None);
    }

    #[test]
    fn test_all_channels() {
        assert_eq!(ServoChannel::all().count(), NUM_SERVOS);
        assert_eq!(ServoChannel::all().last().map(ServoChannel::raw), Some(17));
    }
}
