//! Board-agnostic logic for the hexapod serial link
//!
//! This crate contains everything above the wire format that does not
//! depend on a particular board or operating system:
//!
//! - Transport contract and collaborator traits (servos, sensors, relay)
//! - `Link` session owning the receive buffer and sequence counter
//! - Handshake state machine
//! - Servo calibration table
//! - Device-side handshake gate and command dispatcher
//! - Host-side controller with handshake retry policy

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod device;
pub mod host;
pub mod link;
pub mod state;
pub mod traits;

#[cfg(test)]
pub(crate) mod mock;

pub use link::{Link, LinkError};
pub use traits::{Transport, TransportError};
