//! Frame encoding and decoding for the hexapod serial link.
//!
//! Frame format:
//! - STX (1 byte): 0x7E start marker
//! - LEN (1 byte): number of bytes in SEQ + CMD + PAYLOAD (3..=255)
//! - SEQ (2 bytes): sequence number, little-endian
//! - CMD (1 byte): command code
//! - PAYLOAD (0-252 bytes): command-specific data
//! - CRC (2 bytes): CRC-16/CCITT-FALSE over LEN..PAYLOAD, little-endian
//! - ETX (1 byte): 0x7F end marker
//!
//! Frame boundaries come from LEN, never from scanning for markers, so the
//! payload may contain 0x7E/0x7F freely. The markers only matter when the
//! decoder is resynchronizing after garbage or a corrupted frame.

use heapless::Vec;

/// Frame start marker
pub const STX: u8 = 0x7E;

/// Frame end marker
pub const ETX: u8 = 0x7F;

/// Bytes counted by LEN in addition to the payload (SEQ_LO, SEQ_HI, CMD)
pub const HEADER_SIZE: usize = 3;

/// Bytes not counted by LEN (STX, LEN, CRC_LO, CRC_HI, ETX)
pub const FRAME_OVERHEAD: usize = 5;

/// Maximum payload size in bytes (LEN is a single byte)
pub const MAX_PAYLOAD_SIZE: usize = u8::MAX as usize - HEADER_SIZE;

/// Smallest complete frame (empty payload)
pub const MIN_FRAME_SIZE: usize = HEADER_SIZE + FRAME_OVERHEAD;

/// Largest complete frame
pub const MAX_FRAME_SIZE: usize = MAX_PAYLOAD_SIZE + HEADER_SIZE + FRAME_OVERHEAD;

/// Capacity of a session receive buffer.
///
/// A buffer holding `MAX_FRAME_SIZE` bytes always either yields a packet or
/// discards a byte in [`try_decode`], so appending after a `None` never
/// overflows.
pub const RX_BUFFER_SIZE: usize = MAX_FRAME_SIZE;

/// Rolling receive buffer consumed by [`try_decode`]
pub type RxBuffer = Vec<u8, RX_BUFFER_SIZE>;

/// Packet payload storage
pub type Payload = Vec<u8, MAX_PAYLOAD_SIZE>;

/// Errors that can occur while building or encoding a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload exceeds [`MAX_PAYLOAD_SIZE`]
    PayloadTooLarge,
    /// Output buffer too small for the encoded frame
    BufferTooSmall,
}

/// CRC-16/CCITT-FALSE (poly 0x1021, init 0xFFFF, no reflection, no final XOR)
pub fn crc16_ccitt(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ 0x1021
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// A decoded or constructed packet
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Packet {
    /// Sequence number (opaque correlation value)
    pub seq: u16,
    /// Command code
    pub cmd: u8,
    /// Payload data
    pub payload: Payload,
}

impl Packet {
    /// Create a new packet with the given payload
    pub fn new(seq: u16, cmd: u8, payload: &[u8]) -> Result<Self, FrameError> {
        let payload = Vec::from_slice(payload).map_err(|_| FrameError::PayloadTooLarge)?;
        Ok(Self { seq, cmd, payload })
    }

    /// Create a packet with no payload
    pub fn empty(seq: u16, cmd: u8) -> Self {
        Self {
            seq,
            cmd,
            payload: Vec::new(),
        }
    }

    /// Size of this packet once framed
    pub fn frame_len(&self) -> usize {
        self.payload.len() + HEADER_SIZE + FRAME_OVERHEAD
    }

    /// Encode this packet into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let frame_len = self.frame_len();
        if buffer.len() < frame_len {
            return Err(FrameError::BufferTooSmall);
        }

        let len = (HEADER_SIZE + self.payload.len()) as u8;
        let [seq_lo, seq_hi] = self.seq.to_le_bytes();
        let payload_end = 5 + self.payload.len();

        buffer[0] = STX;
        buffer[1] = len;
        buffer[2] = seq_lo;
        buffer[3] = seq_hi;
        buffer[4] = self.cmd;
        buffer[5..payload_end].copy_from_slice(&self.payload);

        let crc = crc16_ccitt(&buffer[1..payload_end]);
        buffer[payload_end..payload_end + 2].copy_from_slice(&crc.to_le_bytes());
        buffer[payload_end + 2] = ETX;

        Ok(frame_len)
    }

    /// Encode this packet into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = self.encode(&mut buffer)?;
        Vec::from_slice(&buffer[..len]).map_err(|_| FrameError::BufferTooSmall)
    }
}

/// Build the wire frame for `(seq, cmd, payload)`
pub fn encode(seq: u16, cmd: u8, payload: &[u8]) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
    Packet::new(seq, cmd, payload)?.encode_to_vec()
}

/// Extract at most one packet from the front of `buffer`.
///
/// Leading bytes that cannot start a valid frame are discarded one at a time.
/// Returns `None` when more bytes are needed; in that case nothing that could
/// still belong to a frame has been consumed. On success exactly the frame's
/// bytes are removed from the buffer.
pub fn try_decode(buffer: &mut RxBuffer) -> Option<Packet> {
    while !buffer.is_empty() {
        // Re-sync to STX
        if buffer[0] != STX {
            discard_front(buffer, 1);
            continue;
        }

        if buffer.len() < MIN_FRAME_SIZE {
            return None;
        }

        let len = buffer[1] as usize;
        if len < HEADER_SIZE {
            // Can never become valid
            discard_front(buffer, 1);
            continue;
        }

        let frame_size = len + FRAME_OVERHEAD;
        if buffer.len() < frame_size {
            return None;
        }

        if buffer[frame_size - 1] != ETX {
            discard_front(buffer, 1);
            continue;
        }

        let rx_crc = u16::from_le_bytes([buffer[frame_size - 3], buffer[frame_size - 2]]);
        if rx_crc != crc16_ccitt(&buffer[1..len + 2]) {
            discard_front(buffer, 1);
            continue;
        }

        let seq = u16::from_le_bytes([buffer[2], buffer[3]]);
        let cmd = buffer[4];
        // len <= 255 so the payload always fits
        let payload = Vec::from_slice(&buffer[5..len + 2]).unwrap_or_default();

        discard_front(buffer, frame_size);
        return Some(Packet { seq, cmd, payload });
    }

    None
}

/// Remove `count` bytes from the front of the buffer
fn discard_front(buffer: &mut RxBuffer, count: usize) {
    let remaining = buffer.len() - count;
    buffer.copy_within(count.., 0);
    buffer.truncate(remaining);
}
