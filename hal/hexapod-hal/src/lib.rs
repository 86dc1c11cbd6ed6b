//! Hexapod Hardware Abstraction Layer
//!
//! This crate defines the hardware traits the leg controller needs from a
//! board: byte-level UART I/O, a monotonic clock, GPIO outputs, a
//! multiplexed ADC and servo pulse outputs. Board crates implement them
//! directly, or wrap existing `embedded-io` / `embedded-hal` drivers with
//! the adapters provided here.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  hexapod-drivers (servos, relay, ADC)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  hexapod-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  embedded-io  │       │ embedded-hal  │
//! │    serial     │       │  GPIO / PWM   │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::UartTx`], [`uart::UartRx`] - Serial communication
//! - [`clock::Clock`] - Monotonic microsecond time
//! - [`gpio::OutputPin`] - Digital output
//! - [`adc::AdcInput`], [`adc::AnalogMux`] - Analog acquisition
//! - [`pwm::PulseOutput`] - Servo pulse generation

#![no_std]
#![deny(unsafe_code)]

pub mod adc;
pub mod clock;
pub mod gpio;
pub mod pwm;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use adc::{AdcInput, AnalogMux};
pub use clock::Clock;
pub use gpio::{HalOutputPin, OutputPin};
pub use pwm::{DutyCyclePulse, PulseOutput};
pub use uart::{IoUart, UartRx, UartTx};
