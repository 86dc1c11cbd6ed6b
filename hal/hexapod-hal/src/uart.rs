//! UART serial communication abstractions
//!
//! The link layer reads the wire one byte at a time and decides itself how
//! long to wait, so the receive side is a non-blocking byte poll rather than
//! a buffered read.

use embedded_io::{Read, ReadReady, Write};

/// UART transmitter
pub trait UartTx {
    /// Error type for transmit operations
    type Error;

    /// Write data to the UART
    ///
    /// Blocks until all data has been written or an error occurs.
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// UART receiver
pub trait UartRx {
    /// Error type for receive operations
    type Error;

    /// Take one byte from the receive FIFO if one is waiting
    ///
    /// Never blocks. `Ok(None)` means the FIFO is empty.
    fn try_read_byte(&mut self) -> Result<Option<u8>, Self::Error>;
}

/// Combined UART interface
///
/// For UARTs that provide both TX and RX on a single peripheral.
pub trait Uart: UartTx + UartRx {}

// Blanket implementation
impl<T: UartTx + UartRx> Uart for T {}

/// Adapter from an `embedded-io` serial driver
///
/// Works with any HAL serial type implementing the blocking
/// `embedded_io::{Read, ReadReady, Write}` traits.
pub struct IoUart<U> {
    inner: U,
}

impl<U> IoUart<U> {
    pub fn new(inner: U) -> Self {
        Self { inner }
    }

    /// Give back the wrapped driver
    pub fn release(self) -> U {
        self.inner
    }
}

impl<U: Write> UartTx for IoUart<U> {
    type Error = U::Error;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.inner.write_all(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.inner.flush()
    }
}

impl<U: Read + ReadReady> UartRx for IoUart<U> {
    type Error = U::Error;

    fn try_read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        if !self.inner.read_ready()? {
            return Ok(None);
        }
        let mut byte = [0u8; 1];
        match self.inner.read(&mut byte)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_io::ErrorType;

    /// Fixed-size serial mock: `rx` is what the peer sent, `tx` what we wrote
    struct MockSerial {
        rx: [u8; 8],
        rx_len: usize,
        rx_pos: usize,
        tx: [u8; 8],
        tx_len: usize,
    }

    impl MockSerial {
        fn with_rx(data: &[u8]) -> Self {
            let mut rx = [0u8; 8];
            rx[..data.len()].copy_from_slice(data);
            Self {
                rx,
                rx_len: data.len(),
                rx_pos: 0,
                tx: [0u8; 8],
                tx_len: 0,
            }
        }
    }

    impl ErrorType for MockSerial {
        type Error = Infallible;
    }

    impl Read for MockSerial {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            let n = buf.len().min(self.rx_len - self.rx_pos);
            buf[..n].copy_from_slice(&self.rx[self.rx_pos..self.rx_pos + n]);
            self.rx_pos += n;
            Ok(n)
        }
    }

    impl ReadReady for MockSerial {
        fn read_ready(&mut self) -> Result<bool, Self::Error> {
            Ok(self.rx_pos < self.rx_len)
        }
    }

    impl Write for MockSerial {
        fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
            let n = buf.len().min(self.tx.len() - self.tx_len);
            self.tx[self.tx_len..self.tx_len + n].copy_from_slice(&buf[..n]);
            self.tx_len += n;
            Ok(n)
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    #[test]
    fn test_try_read_byte_drains_fifo() {
        let mut uart = IoUart::new(MockSerial::with_rx(&[0x7E, 0x03]));
        assert_eq!(uart.try_read_byte(), Ok(Some(0x7E)));
        assert_eq!(uart.try_read_byte(), Ok(Some(0x03)));
        assert_eq!(uart.try_read_byte(), Ok(None));
    }

    #[test]
    fn test_write_blocking() {
        let mut uart = IoUart::new(MockSerial::with_rx(&[]));
        uart.write_blocking(&[1, 2, 3]).unwrap();
        uart.flush().unwrap();

        let serial = uart.release();
        assert_eq!(&serial.tx[..serial.tx_len], &[1, 2, 3]);
    }
}
