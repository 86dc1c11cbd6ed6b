//! Hexapod serial link protocol
//!
//! This crate defines the framed protocol between the host controller
//! (Raspberry Pi) and the Servo 2040 leg controller. It is designed to
//! survive a noisy serial line: every frame is length-delimited and
//! CRC-checked, and the decoder resynchronizes after garbage or corruption.
//!
//! # Protocol Overview
//!
//! ```text
//! ┌─────┬─────┬─────────┬─────┬─────────────┬─────────┬─────┐
//! │ STX │ LEN │ SEQ     │ CMD │ PAYLOAD     │ CRC16   │ ETX │
//! │ 7E  │ 1B  │ 2B (LE) │ 1B  │ 0–252B      │ 2B (LE) │ 7F  │
//! └─────┴─────┴─────────┴─────┴─────────────┴─────────┴─────┘
//! ```
//!
//! A session starts with a HELLO/ACK handshake; the device ignores leg
//! control commands until one has succeeded.

#![no_std]
#![deny(unsafe_code)]

pub mod commands;
pub mod frame;
pub mod handshake;
pub mod scalar;

pub use commands::{Command, MessageError, PulseCalibration, PulseRange, Request, NUM_SERVOS};
pub use frame::{
    crc16_ccitt, encode, try_decode, FrameError, Packet, RxBuffer, ETX, MAX_FRAME_SIZE,
    MAX_PAYLOAD_SIZE, STX,
};
pub use handshake::{HandshakeOutcome, HandshakeReply, Hello, HelloAck, RejectReason};
pub use scalar::{PayloadReader, PayloadWriter};
