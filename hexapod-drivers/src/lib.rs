//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the collaborator traits
//! defined in hexapod-core, built on the hexapod-hal traits:
//!
//! - Calibrated servo bank (pulse mapping over -45°..+45°)
//! - Servo power relay on a GPIO pin
//! - Multiplexed analog sensors (sensor headers, rail voltage, rail current)
//! - UART byte transport with bounded busy-wait reads

#![no_std]
#![deny(unsafe_code)]

pub mod analog;
pub mod relay;
pub mod servo;
pub mod uart;

pub use analog::{AnalogConfig, MuxedSensors};
pub use relay::GpioRelay;
pub use servo::CalibratedServos;
pub use uart::{UartTransport, UartTransportConfig};
