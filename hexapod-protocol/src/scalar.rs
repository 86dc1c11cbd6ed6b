//! Little-endian scalar packing for packet payloads
//!
//! Every multi-byte value on the wire is little-endian. Floats are IEEE-754
//! single precision, sent as the little-endian bytes of their bit pattern.

use crate::frame::{FrameError, Payload};

/// Sequential reader over a received payload
#[derive(Debug, Clone)]
pub struct PayloadReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> PayloadReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes not yet consumed
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?;
        self.pos += N;
        bytes.try_into().ok()
    }

    pub fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[b]| b)
    }

    pub fn read_u16(&mut self) -> Option<u16> {
        self.take().map(u16::from_le_bytes)
    }

    pub fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    pub fn read_i16(&mut self) -> Option<i16> {
        self.take().map(i16::from_le_bytes)
    }

    pub fn read_i32(&mut self) -> Option<i32> {
        self.take().map(i32::from_le_bytes)
    }

    pub fn read_f32(&mut self) -> Option<f32> {
        self.take().map(f32::from_le_bytes)
    }
}

/// Builder for an outgoing payload
#[derive(Debug, Clone, Default)]
pub struct PayloadWriter {
    payload: Payload,
}

impl PayloadWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn put(&mut self, bytes: &[u8]) -> Result<&mut Self, FrameError> {
        self.payload
            .extend_from_slice(bytes)
            .map_err(|_| FrameError::PayloadTooLarge)?;
        Ok(self)
    }

    pub fn put_u8(&mut self, value: u8) -> Result<&mut Self, FrameError> {
        self.put(&[value])
    }

    pub fn put_u16(&mut self, value: u16) -> Result<&mut Self, FrameError> {
        self.put(&value.to_le_bytes())
    }

    pub fn put_u32(&mut self, value: u32) -> Result<&mut Self, FrameError> {
        self.put(&value.to_le_bytes())
    }

    pub fn put_i16(&mut self, value: i16) -> Result<&mut Self, FrameError> {
        self.put(&value.to_le_bytes())
    }

    pub fn put_i32(&mut self, value: i32) -> Result<&mut Self, FrameError> {
        self.put(&value.to_le_bytes())
    }

    pub fn put_f32(&mut self, value: f32) -> Result<&mut Self, FrameError> {
        self.put(&value.to_le_bytes())
    }

    /// Bytes written so far
    pub fn as_slice(&self) -> &[u8] {
        &self.payload
    }

    pub fn finish(self) -> Payload {
        self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::MAX_PAYLOAD_SIZE;

    #[test]
    fn test_little_endian_layout() {
        let mut writer = PayloadWriter::new();
        writer.put_u16(0x0201).unwrap().put_u32(0x0605_0403).unwrap();
        assert_eq!(writer.as_slice(), &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_f32_wire_bytes() {
        // 1.5f32 == 0x3FC00000
        let mut writer = PayloadWriter::new();
        writer.put_f32(1.5).unwrap();
        assert_eq!(writer.as_slice(), &[0x00, 0x00, 0xC0, 0x3F]);

        let mut reader = PayloadReader::new(&[0x00, 0x00, 0xC0, 0x3F]);
        assert_eq!(reader.read_f32(), Some(1.5));
    }

    #[test]
    fn test_signed_values() {
        let mut writer = PayloadWriter::new();
        writer.put_i16(-2).unwrap().put_i32(-70_000).unwrap();

        let mut reader = PayloadReader::new(writer.as_slice());
        assert_eq!(reader.read_i16(), Some(-2));
        assert_eq!(reader.read_i32(), Some(-70_000));
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_reader_short_input() {
        let mut reader = PayloadReader::new(&[0x01]);
        assert_eq!(reader.read_u16(), None);
        // Failed read does not consume
        assert_eq!(reader.read_u8(), Some(0x01));
        assert_eq!(reader.read_u8(), None);
    }

    #[test]
    fn test_writer_overflow() {
        let mut writer = PayloadWriter::new();
        for _ in 0..MAX_PAYLOAD_SIZE {
            writer.put_u8(0).unwrap();
        }
        assert_eq!(writer.put_u8(0).err(), Some(FrameError::PayloadTooLarge));
    }
}
