//! Events that drive the handshake state machine

use hexapod_protocol::{HandshakeOutcome, HelloAck, RejectReason};

/// Events that can trigger handshake transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandshakeEvent {
    /// HELLO written to the link
    HelloSent,
    /// Device accepted the handshake
    AckReceived(HelloAck),
    /// Device refused, or replied with something unusable
    Rejected(RejectReason),
    /// No reply within the receive timeout
    ReplyTimeout,
    /// Start a fresh attempt
    Retry,
}

impl From<HandshakeOutcome> for HandshakeEvent {
    fn from(outcome: HandshakeOutcome) -> Self {
        match outcome {
            HandshakeOutcome::Accepted(ack) => HandshakeEvent::AckReceived(ack),
            HandshakeOutcome::Rejected(reason) => HandshakeEvent::Rejected(reason),
            HandshakeOutcome::TimedOut => HandshakeEvent::ReplyTimeout,
        }
    }
}
