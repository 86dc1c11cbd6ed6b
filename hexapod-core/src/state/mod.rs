//! Handshake state machine
//!
//! Tracks one host-side HELLO exchange. The machine is explicit, finite and
//! deterministic; retries are fresh cycles through `Idle`.

pub mod events;
pub mod machine;

pub use events::HandshakeEvent;
pub use machine::HandshakeState;
