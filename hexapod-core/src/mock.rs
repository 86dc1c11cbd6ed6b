//! In-memory transport for unit tests

use core::time::Duration;

use heapless::{Deque, Vec};
use hexapod_protocol::frame::{encode, try_decode, RxBuffer};
use hexapod_protocol::Packet;

use crate::traits::{Transport, TransportError};

const CAPACITY: usize = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

/// Reads come from bytes queued with `feed`; an empty queue times out
/// immediately. Writes are recorded.
pub struct MockTransport {
    rx: Deque<u8, CAPACITY>,
    tx: Vec<u8, CAPACITY>,
    pub timeouts: usize,
    pub last_timeout: Option<Duration>,
    pub open: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            rx: Deque::new(),
            tx: Vec::new(),
            timeouts: 0,
            last_timeout: None,
            open: false,
        }
    }

    pub fn feed(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.rx.push_back(byte).unwrap();
        }
    }

    pub fn feed_packet(&mut self, seq: u16, cmd: u8, payload: &[u8]) {
        self.feed(&encode(seq, cmd, payload).unwrap());
    }

    pub fn written(&self) -> &Vec<u8, CAPACITY> {
        &self.tx
    }

    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    /// Decode and clear everything written so far
    pub fn take_packets(&mut self) -> Vec<Packet, 16> {
        let mut buffer = RxBuffer::new();
        let mut packets = Vec::new();
        for &byte in self.tx.iter() {
            buffer.push(byte).unwrap();
            while let Some(packet) = try_decode(&mut buffer) {
                packets.push(packet).unwrap();
            }
        }
        self.tx.clear();
        packets
    }
}

impl Transport for MockTransport {
    type Error = MockError;

    fn open(&mut self) -> Result<(), Self::Error> {
        self.open = true;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        self.open = false;
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.tx.extend_from_slice(data).map_err(|_| MockError)
    }

    fn read_byte(&mut self, timeout: Duration) -> Result<u8, TransportError<Self::Error>> {
        self.last_timeout = Some(timeout);
        match self.rx.pop_front() {
            Some(byte) => Ok(byte),
            None => {
                self.timeouts += 1;
                Err(TransportError::Timeout)
            }
        }
    }

    fn byte_timeout(&self) -> Duration {
        Duration::from_millis(100)
    }
}
