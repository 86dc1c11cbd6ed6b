//! Servo power relay trait

/// On/off switch for the servo power rail
pub trait PowerRelay {
    /// Close (`true`) or open (`false`) the relay
    fn set_power(&mut self, on: bool);

    /// Whether the relay is currently closed
    fn is_powered(&self) -> bool;
}
