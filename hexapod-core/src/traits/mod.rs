//! Hardware and transport abstraction traits
//!
//! These traits define the interface between the link/dispatch logic
//! and the collaborators that move bytes, servos and relays.

pub mod actuator;
pub mod relay;
pub mod sensor;
pub mod transport;

pub use actuator::{ServoBank, ServoChannel};
pub use relay::PowerRelay;
pub use sensor::{AnalogSensors, SensorError};
pub use transport::{Transport, TransportError};
