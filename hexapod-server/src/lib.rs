//! Host side of the hexapod serial link
//!
//! - [`serial`] - OS serial port transport and port discovery
//! - [`config`] - TOML configuration and logging setup
//! - [`session`] - Logged handshake on top of the core controller
//! - [`emulator`] - Virtual leg controller built from the real drivers
//! - [`loopback`] - In-memory serial line
//! - [`selftest`] - Host against the virtual device, no hardware needed

pub mod cli;
pub mod config;
pub mod emulator;
pub mod error;
pub mod loopback;
pub mod selftest;
pub mod serial;
pub mod session;

pub use config::ServerConfig;
pub use error::{Result, ServerError};
