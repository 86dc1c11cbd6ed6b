//! Servo calibration table
//!
//! One `(min_pulse, max_pulse)` pair per servo channel, in microseconds.
//! The pair is mapped onto -45°..+45° by the servo bank.

use core::ops::{Index, IndexMut};

use hexapod_protocol::{PulseCalibration, NUM_SERVOS};

use crate::traits::ServoChannel;

const fn cal(min_pulse: u16, max_pulse: u16) -> PulseCalibration {
    PulseCalibration {
        min_pulse,
        max_pulse,
    }
}

/// Factory calibration measured on the reference robot, in channel order
pub const FACTORY_CALIBRATIONS: [PulseCalibration; NUM_SERVOS] = [
    cal(1031, 2088), // R31
    cal(1003, 2016), // R32
    cal(958, 1990),  // R33
    cal(941, 2022),  // L31
    cal(986, 2039),  // L32
    cal(958, 1988),  // L33
    cal(1007, 2048), // R21
    cal(976, 2019),  // R22
    cal(1057, 2090), // R23
    cal(993, 2015),  // L21
    cal(1011, 2013), // L22
    cal(956, 2000),  // L23
    cal(1040, 2055), // R11
    cal(983, 2057),  // R12
    cal(959, 1995),  // R13
    cal(1031, 1998), // L11
    cal(951, 1978),  // L12
    cal(1035, 2027), // L13
];

/// Calibration for every servo channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationTable {
    entries: [PulseCalibration; NUM_SERVOS],
}

impl Default for CalibrationTable {
    fn default() -> Self {
        Self::factory()
    }
}

impl CalibrationTable {
    /// Table holding [`FACTORY_CALIBRATIONS`]
    pub const fn factory() -> Self {
        Self {
            entries: FACTORY_CALIBRATIONS,
        }
    }

    pub const fn from_entries(entries: [PulseCalibration; NUM_SERVOS]) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[PulseCalibration; NUM_SERVOS] {
        &self.entries
    }

    /// Iterate `(channel, calibration)` pairs in channel order
    pub fn iter(&self) -> impl Iterator<Item = (ServoChannel, PulseCalibration)> + '_ {
        ServoChannel::all().map(move |channel| (channel, self.entries[channel.index()]))
    }
}

impl Index<ServoChannel> for CalibrationTable {
    type Output = PulseCalibration;

    fn index(&self, channel: ServoChannel) -> &Self::Output {
        &self.entries[channel.index()]
    }
}

impl IndexMut<ServoChannel> for CalibrationTable {
    fn index_mut(&mut self, channel: ServoChannel) -> &mut Self::Output {
        &mut self.entries[channel.index()]
    }
}
