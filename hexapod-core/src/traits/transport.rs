//! Byte transport contract
//!
//! A transport moves raw bytes over one physical link. Reads are bounded by
//! a per-byte timeout, which is the only cancellation mechanism in the
//! system. Multi-byte scalars are little-endian on the wire.

use core::time::Duration;

/// Errors from transport reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError<E> {
    /// No byte arrived within the timeout
    Timeout,
    /// The underlying device failed
    Io(E),
}

impl<E> From<E> for TransportError<E> {
    fn from(error: E) -> Self {
        TransportError::Io(error)
    }
}

/// One logical byte link (serial port, UART, in-memory pipe)
///
/// Implementors provide `write`, `read_byte` and `byte_timeout`; the scalar
/// helpers are built on top of them.
pub trait Transport {
    /// Error type of the underlying device
    type Error;

    /// Prepare the link for use
    fn open(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Release the link
    fn close(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Write all of `data`
    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Read one byte, waiting at most `timeout`
    fn read_byte(&mut self, timeout: Duration) -> Result<u8, TransportError<Self::Error>>;

    /// Standard per-byte timeout for this link
    fn byte_timeout(&self) -> Duration;

    fn send_u8(&mut self, value: u8) -> Result<(), Self::Error> {
        self.write(&[value])
    }

    fn send_u16(&mut self, value: u16) -> Result<(), Self::Error> {
        self.write(&value.to_le_bytes())
    }

    fn send_u32(&mut self, value: u32) -> Result<(), Self::Error> {
        self.write(&value.to_le_bytes())
    }

    fn send_i16(&mut self, value: i16) -> Result<(), Self::Error> {
        self.write(&value.to_le_bytes())
    }

    fn send_i32(&mut self, value: i32) -> Result<(), Self::Error> {
        self.write(&value.to_le_bytes())
    }

    fn send_f32(&mut self, value: f32) -> Result<(), Self::Error> {
        self.write(&value.to_le_bytes())
    }

    fn recv_u8(&mut self) -> Result<u8, TransportError<Self::Error>> {
        let timeout = self.byte_timeout();
        self.read_byte(timeout)
    }

    fn recv_u16(&mut self) -> Result<u16, TransportError<Self::Error>> {
        recv_array(self).map(u16::from_le_bytes)
    }

    fn recv_u32(&mut self) -> Result<u32, TransportError<Self::Error>> {
        recv_array(self).map(u32::from_le_bytes)
    }

    fn recv_i16(&mut self) -> Result<i16, TransportError<Self::Error>> {
        recv_array(self).map(i16::from_le_bytes)
    }

    fn recv_i32(&mut self) -> Result<i32, TransportError<Self::Error>> {
        recv_array(self).map(i32::from_le_bytes)
    }

    fn recv_f32(&mut self) -> Result<f32, TransportError<Self::Error>> {
        recv_array(self).map(f32::from_le_bytes)
    }
}

/// Read `N` bytes, each bounded by the standard timeout
fn recv_array<T: Transport + ?Sized, const N: usize>(
    transport: &mut T,
) -> Result<[u8; N], TransportError<T::Error>> {
    let timeout = transport.byte_timeout();
    let mut bytes = [0u8; N];
    for byte in bytes.iter_mut() {
        *byte = transport.read_byte(timeout)?;
    }
    Ok(bytes)
}

impl<T: Transport + ?Sized> Transport for &mut T {
    type Error = T::Error;

    fn open(&mut self) -> Result<(), Self::Error> {
        (**self).open()
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        (**self).close()
    }

    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        (**self).write(data)
    }

    fn read_byte(&mut self, timeout: Duration) -> Result<u8, TransportError<Self::Error>> {
        (**self).read_byte(timeout)
    }

    fn byte_timeout(&self) -> Duration {
        (**self).byte_timeout()
    }
}
