//! Handshake state definition

use hexapod_protocol::{HelloAck, RejectReason};

use super::events::HandshakeEvent;

/// Host-side handshake states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandshakeState {
    /// Nothing sent yet
    #[default]
    Idle,
    /// HELLO sent, waiting for ACK/NACK
    AwaitingResponse,
    /// Device acknowledged with a matching version and OK status
    Accepted(HelloAck),
    /// Device refused or the reply was unusable
    Rejected(RejectReason),
    /// No reply arrived
    TimedOut,
}

impl HandshakeState {
    /// Check if the exchange has finished (successfully or not)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            HandshakeState::Accepted(_) | HandshakeState::Rejected(_) | HandshakeState::TimedOut
        )
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, HandshakeState::Accepted(_))
    }

    /// Process an event and return the next state
    pub fn transition(self, event: HandshakeEvent) -> Self {
        use HandshakeEvent::*;
        use HandshakeState::*;

        match (self, event) {
            (Idle, HelloSent) => AwaitingResponse,

            (AwaitingResponse, AckReceived(ack)) => Accepted(ack),
            (AwaitingResponse, HandshakeEvent::Rejected(reason)) => HandshakeState::Rejected(reason),
            (AwaitingResponse, ReplyTimeout) => TimedOut,

            (Accepted(_), Retry) | (HandshakeState::Rejected(_), Retry) | (TimedOut, Retry) => Idle,

            // Default: stay in current state
            _ => self,
        }
    }
}
