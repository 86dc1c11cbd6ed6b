//! Opening a controller session
//!
//! Same retry policy as [`Controller::handshake`], with every attempt
//! logged.

use std::fmt::Debug;

use hexapod_core::host::{Controller, ControllerError};
use hexapod_core::traits::Transport;
use hexapod_protocol::{HandshakeOutcome, HelloAck};
use tracing::{debug, info, warn};

use crate::error::Result;

/// Open the transport and handshake with the device
pub fn connect<T>(controller: &mut Controller<T>) -> Result<HelloAck>
where
    T: Transport,
    T::Error: Debug,
{
    controller.open()?;
    handshake(controller)
}

/// Up to `attempts` HELLO exchanges; the first accepted reply wins
pub fn handshake<T>(controller: &mut Controller<T>) -> Result<HelloAck>
where
    T: Transport,
    T::Error: Debug,
{
    let attempts = controller.config().attempts.max(1);
    let mut last = HandshakeOutcome::TimedOut;

    for attempt in 1..=attempts {
        debug!(attempt, "sending HELLO");
        last = controller.handshake_once()?;
        match last {
            HandshakeOutcome::Accepted(ack) => {
                info!(
                    attempt,
                    version = ack.version,
                    device_id = ack.device_id,
                    "handshake accepted"
                );
                return Ok(ack);
            }
            HandshakeOutcome::Rejected(reason) => warn!(attempt, ?reason, "handshake rejected"),
            HandshakeOutcome::TimedOut => warn!(attempt, "no reply to HELLO"),
        }
    }

    Err(ControllerError::<T::Error>::HandshakeFailed { attempts, last }.into())
}
