//! One-shot handshake latch

/// Closed until the first accepted HELLO, then open for the rest of the
/// session. A later HELLO with the wrong version does not close it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HandshakeGate {
    open: bool,
}

impl HandshakeGate {
    pub const fn new() -> Self {
        Self { open: false }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Latch the gate open
    pub fn open(&mut self) {
        self.open = true;
    }
}
