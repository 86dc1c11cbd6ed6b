//! UART byte transport
//!
//! Implements the link transport over a hexapod-hal UART and clock. Reads
//! busy-wait on the receive FIFO until a byte arrives or the timeout runs
//! out. Every wait is capped at `max_wait`, so a caller passing a very long
//! timeout cannot stall the control loop indefinitely.

use core::time::Duration;

use hexapod_core::traits::{Transport, TransportError};
use hexapod_hal::{Clock, UartRx, UartTx};

/// UART transport timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UartTransportConfig {
    /// Standard per-byte timeout
    pub byte_timeout: Duration,
    /// Longest any single read may wait
    pub max_wait: Duration,
}

impl Default for UartTransportConfig {
    fn default() -> Self {
        Self {
            byte_timeout: Duration::from_millis(10),
            max_wait: Duration::from_millis(100),
        }
    }
}

/// Link transport over a UART
pub struct UartTransport<U, C> {
    uart: U,
    clock: C,
    config: UartTransportConfig,
}

impl<U, C> UartTransport<U, C>
where
    U: UartTx + UartRx<Error = <U as UartTx>::Error>,
    C: Clock,
{
    pub fn new(uart: U, clock: C, config: UartTransportConfig) -> Self {
        Self {
            uart,
            clock,
            config,
        }
    }

    pub fn release(self) -> (U, C) {
        (self.uart, self.clock)
    }

    fn wait_micros(&self, timeout: Duration) -> u64 {
        let wait = timeout.min(self.config.max_wait);
        u64::try_from(wait.as_micros()).unwrap_or(u64::MAX)
    }
}

impl<U, C> Transport for UartTransport<U, C>
where
    U: UartTx + UartRx<Error = <U as UartTx>::Error>,
    C: Clock,
{
    type Error = <U as UartTx>::Error;

    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.uart.write_blocking(data)?;
        self.uart.flush()
    }

    fn read_byte(&mut self, timeout: Duration) -> Result<u8, TransportError<Self::Error>> {
        let limit = self.wait_micros(timeout);
        let start = self.clock.now_micros();
        loop {
            if let Some(byte) = self.uart.try_read_byte().map_err(TransportError::Io)? {
                return Ok(byte);
            }
            if self.clock.elapsed_micros(start) >= limit {
                return Err(TransportError::Timeout);
            }
            core::hint::spin_loop();
        }
    }

    fn byte_timeout(&self) -> Duration {
        self.config.byte_timeout
    }
}
