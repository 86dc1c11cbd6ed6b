//! Host side of the link
//!
//! The controller opens a session with a bounded number of handshake
//! attempts, then issues requests one at a time and waits for the reply
//! carrying the same sequence number.

pub mod controller;
pub mod error;

pub use controller::{Controller, ControllerConfig};
pub use error::ControllerError;
