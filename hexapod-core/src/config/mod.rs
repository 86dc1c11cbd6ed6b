//! Configuration types
//!
//! Servo calibration table and the joint naming scheme that maps leg
//! positions onto servo channels.

pub mod calibration;
pub mod joint;

pub use calibration::{CalibrationTable, FACTORY_CALIBRATIONS};
pub use joint::{JointName, JointNameError, Side};
