//! OS serial port transport
//!
//! Wraps a `serialport` handle in the link's byte transport. The OS read
//! timeout is adjusted lazily so repeated reads with the same timeout cost
//! no extra system calls.

use std::io::{self, Read, Write};
use std::time::Duration;

use hexapod_core::traits::{Transport, TransportError};
use serialport::{ClearBuffer, SerialPort, SerialPortInfo, SerialPortType};
use tracing::{debug, info};

use crate::config::SerialConfig;
use crate::error::{Result, ServerError};

/// Link transport over an OS serial port
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
    byte_timeout: Duration,
    read_timeout: Duration,
}

impl SerialTransport {
    /// Open `path` at the configured baud rate (8N1, no flow control)
    pub fn open(path: &str, config: &SerialConfig) -> Result<Self> {
        let timeout = config.timeout();
        let port = serialport::new(path, config.baud_rate)
            .timeout(timeout)
            .open()?;
        info!(port = path, baud_rate = config.baud_rate, "serial port open");
        Ok(Self::from_port(port, timeout))
    }

    /// Use an already opened port; `timeout` must be the port's current timeout
    pub fn from_port(port: Box<dyn SerialPort>, timeout: Duration) -> Self {
        Self {
            port,
            byte_timeout: timeout,
            read_timeout: timeout,
        }
    }

    pub fn name(&self) -> Option<String> {
        self.port.name()
    }
}

impl Transport for SerialTransport {
    type Error = io::Error;

    fn open(&mut self) -> io::Result<()> {
        self.port.clear(ClearBuffer::Input)?;
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        debug!(port = ?self.port.name(), "closing serial port");
        self.port.flush()
    }

    fn write(&mut self, data: &[u8]) -> io::Result<()> {
        self.port.write_all(data)?;
        self.port.flush()
    }

    fn read_byte(
        &mut self,
        timeout: Duration,
    ) -> std::result::Result<u8, TransportError<io::Error>> {
        if timeout != self.read_timeout {
            self.port
                .set_timeout(timeout)
                .map_err(|e| TransportError::Io(e.into()))?;
            self.read_timeout = timeout;
        }

        let mut byte = [0u8; 1];
        match self.port.read(&mut byte) {
            Ok(0) => Err(TransportError::Timeout),
            Ok(_) => Ok(byte[0]),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Err(TransportError::Timeout),
            Err(e) => Err(TransportError::Io(e)),
        }
    }

    fn byte_timeout(&self) -> Duration {
        self.byte_timeout
    }
}

/// Serial ports known to the OS
pub fn list_ports() -> Result<Vec<SerialPortInfo>> {
    let mut ports = serialport::available_ports()?;
    ports.sort_by(|a, b| a.port_name.cmp(&b.port_name));
    Ok(ports)
}

/// One-line description of a port for listings
pub fn describe(info: &SerialPortInfo) -> String {
    match &info.port_type {
        SerialPortType::UsbPort(usb) => format!(
            "{} (USB {:04x}:{:04x} {})",
            info.port_name,
            usb.vid,
            usb.pid,
            usb.product.as_deref().unwrap_or("unknown product")
        ),
        SerialPortType::BluetoothPort => format!("{} (Bluetooth)", info.port_name),
        SerialPortType::PciPort => format!("{} (PCI)", info.port_name),
        SerialPortType::Unknown => info.port_name.clone(),
    }
}

/// Port to open: the requested one, else the last USB port the OS lists
///
/// A requested path is used as is. Pseudo terminals and similar devices are
/// not always enumerated.
pub fn find_port(requested: Option<&str>) -> Result<String> {
    if let Some(port) = requested {
        return Ok(port.to_string());
    }

    let ports = list_ports()?;
    ports
        .iter()
        .rev()
        .find(|p| matches!(p.port_type, SerialPortType::UsbPort(_)))
        .map(|p| p.port_name.clone())
        .ok_or(ServerError::NoPort)
}
