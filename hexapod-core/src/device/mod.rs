//! Device side of the link
//!
//! The device polls its link for requests, refuses everything except HELLO
//! until a handshake has succeeded, and then dispatches each request to the
//! servo, sensor and relay collaborators.

pub mod dispatcher;
pub mod gate;

pub use dispatcher::{Device, DeviceConfig, DeviceStats, Dispatch, IgnoreReason};
pub use gate::HandshakeGate;
