//! Packet session over a byte transport
//!
//! A [`Link`] is the single owner of one transport, its receive buffer and
//! the outgoing sequence counter. Bytes are pulled from the transport one
//! at a time and appended to the buffer; the frame decoder is the only
//! thing that removes them.

use core::time::Duration;

use hexapod_protocol::frame::{try_decode, RxBuffer};
use hexapod_protocol::{FrameError, Packet};

use crate::traits::{Transport, TransportError};

/// Errors from sending a packet or servicing a link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError<E> {
    /// Packet could not be framed
    Frame(FrameError),
    /// Transport write failed
    Io(E),
}

impl<E> From<FrameError> for LinkError<E> {
    fn from(error: FrameError) -> Self {
        LinkError::Frame(error)
    }
}

/// One logical session on one physical link
pub struct Link<T: Transport> {
    transport: T,
    rx: RxBuffer,
    next_seq: u16,
}

impl<T: Transport> Link<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            rx: RxBuffer::new(),
            next_seq: 0,
        }
    }

    /// Open the transport and drop anything left over from a previous session
    pub fn open(&mut self) -> Result<(), T::Error> {
        self.rx.clear();
        self.transport.open()
    }

    pub fn close(&mut self) -> Result<(), T::Error> {
        self.transport.close()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Bytes received but not yet decoded
    pub fn buffered(&self) -> usize {
        self.rx.len()
    }

    /// Forget any partially received data
    pub fn discard_input(&mut self) {
        self.rx.clear();
    }

    /// Take the next outgoing sequence number (wraps at `u16::MAX`)
    pub fn next_seq(&mut self) -> u16 {
        let seq = self.next_seq;
        self.next_seq = seq.wrapping_add(1);
        seq
    }

    /// Frame and write a packet
    pub fn send_packet(&mut self, packet: &Packet) -> Result<(), LinkError<T::Error>> {
        let frame = packet.encode_to_vec()?;
        self.transport.write(&frame).map_err(LinkError::Io)
    }

    /// Frame and write `(seq, cmd, payload)`
    pub fn send(&mut self, seq: u16, cmd: u8, payload: &[u8]) -> Result<(), LinkError<T::Error>> {
        self.send_packet(&Packet::new(seq, cmd, payload)?)
    }

    /// Receive the next packet, bounding each byte by the standard timeout
    ///
    /// `Err(Timeout)` means no complete packet arrived; bytes received so far
    /// stay buffered for the next call.
    pub fn recv_packet(&mut self) -> Result<Packet, TransportError<T::Error>> {
        let timeout = self.transport.byte_timeout();
        loop {
            if let Some(packet) = try_decode(&mut self.rx) {
                return Ok(packet);
            }
            let byte = self.transport.read_byte(timeout)?;
            self.push(byte);
        }
    }

    /// Like [`recv_packet`](Self::recv_packet), but waits at most
    /// `poll_timeout` for the first byte
    ///
    /// Used by the device loop so that an idle line costs one short wait.
    pub fn poll_packet(&mut self, poll_timeout: Duration) -> Result<Packet, TransportError<T::Error>> {
        if let Some(packet) = try_decode(&mut self.rx) {
            return Ok(packet);
        }
        let byte = self.transport.read_byte(poll_timeout)?;
        self.push(byte);
        self.recv_packet()
    }

    fn push(&mut self, byte: u8) {
        // The decoder leaves fewer than RX_BUFFER_SIZE bytes whenever it
        // returns None, so this only fails if that invariant is broken.
        if self.rx.push(byte).is_err() {
            self.rx.clear();
            let _ = self.rx.push(byte);
        }
    }
}
