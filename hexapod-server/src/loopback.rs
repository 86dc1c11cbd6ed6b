//! In-memory serial line
//!
//! A pair of connected ports. Each end is both a link transport (for the
//! host controller) and an `embedded-io` serial device (so the device side
//! can run on the same UART transport as the firmware).

use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::Duration;

use embedded_io::{ErrorKind, ErrorType, Read, ReadReady, Write};
use hexapod_core::traits::{Transport, TransportError};
use thiserror::Error;

/// The other end of the line was dropped
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("loopback peer closed")]
pub struct PeerClosed;

impl embedded_io::Error for PeerClosed {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// One end of an in-memory serial line
pub struct LoopbackPort {
    tx: Sender<u8>,
    rx: Receiver<u8>,
    /// Byte taken off the channel by `read_ready`
    pending: Option<u8>,
    byte_timeout: Duration,
}

/// Two connected ports with the given per-byte timeout
pub fn pair(byte_timeout: Duration) -> (LoopbackPort, LoopbackPort) {
    let (a_tx, b_rx) = channel();
    let (b_tx, a_rx) = channel();
    (
        LoopbackPort::new(a_tx, a_rx, byte_timeout),
        LoopbackPort::new(b_tx, b_rx, byte_timeout),
    )
}

impl LoopbackPort {
    fn new(tx: Sender<u8>, rx: Receiver<u8>, byte_timeout: Duration) -> Self {
        Self {
            tx,
            rx,
            pending: None,
            byte_timeout,
        }
    }

    fn send(&mut self, data: &[u8]) -> Result<(), PeerClosed> {
        for &byte in data {
            self.tx.send(byte).map_err(|_| PeerClosed)?;
        }
        Ok(())
    }
}

impl Transport for LoopbackPort {
    type Error = PeerClosed;

    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.send(data)
    }

    fn read_byte(&mut self, timeout: Duration) -> Result<u8, TransportError<Self::Error>> {
        if let Some(byte) = self.pending.take() {
            return Ok(byte);
        }
        match self.rx.recv_timeout(timeout) {
            Ok(byte) => Ok(byte),
            Err(RecvTimeoutError::Timeout) => Err(TransportError::Timeout),
            Err(RecvTimeoutError::Disconnected) => Err(TransportError::Io(PeerClosed)),
        }
    }

    fn byte_timeout(&self) -> Duration {
        self.byte_timeout
    }
}

impl ErrorType for LoopbackPort {
    type Error = PeerClosed;
}

impl Read for LoopbackPort {
    /// Blocks for the first byte, then takes whatever else is queued
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() {
            return Ok(0);
        }
        buf[0] = match self.pending.take() {
            Some(byte) => byte,
            None => self.rx.recv().map_err(|_| PeerClosed)?,
        };

        let mut len = 1;
        while len < buf.len() {
            match self.rx.try_recv() {
                Ok(byte) => {
                    buf[len] = byte;
                    len += 1;
                }
                Err(_) => break,
            }
        }
        Ok(len)
    }
}

impl ReadReady for LoopbackPort {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        if self.pending.is_some() {
            return Ok(true);
        }
        match self.rx.try_recv() {
            Ok(byte) => {
                self.pending = Some(byte);
                Ok(true)
            }
            Err(TryRecvError::Empty) => Ok(false),
            Err(TryRecvError::Disconnected) => Err(PeerClosed),
        }
    }
}

impl Write for LoopbackPort {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.send(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_millis(20);

    #[test]
    fn test_bytes_cross_the_line() {
        let (mut a, mut b) = pair(TIMEOUT);
        Transport::write(&mut a, &[1, 2, 3]).unwrap();

        assert_eq!(b.read_byte(TIMEOUT), Ok(1));
        let mut buf = [0u8; 8];
        assert_eq!(Read::read(&mut b, &mut buf), Ok(2));
        assert_eq!(&buf[..2], &[2, 3]);
    }

    #[test]
    fn test_read_ready_keeps_the_byte() {
        let (mut a, mut b) = pair(TIMEOUT);
        assert_eq!(b.read_ready(), Ok(false));

        Transport::write(&mut a, &[0x7E]).unwrap();
        assert_eq!(b.read_ready(), Ok(true));
        assert_eq!(b.read_ready(), Ok(true));
        assert_eq!(b.read_byte(TIMEOUT), Ok(0x7E));
        assert_eq!(b.read_byte(TIMEOUT), Err(TransportError::Timeout));
    }

    #[test]
    fn test_dropped_peer() {
        let (mut a, b) = pair(TIMEOUT);
        drop(b);
        assert_eq!(Transport::write(&mut a, &[0]), Err(PeerClosed));
        assert_eq!(a.read_byte(TIMEOUT), Err(TransportError::Io(PeerClosed)));
        assert_eq!(a.read_ready(), Err(PeerClosed));
    }
}
