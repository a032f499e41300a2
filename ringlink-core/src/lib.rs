//! Interrupt-safe byte-stream buffering for serial drivers
//!
//! This crate contains everything between a byte-at-a-time serial
//! peripheral and application code:
//!
//! - [`fifo`] - Fixed-capacity circular byte buffer over caller storage
//! - [`channel`] - Receive/transmit stream channel fed by interrupt handlers
//! - [`config`] - Link configuration and validation
//!
//! The hardware itself is reached only through the
//! [`SerialPort`](ringlink_hal::SerialPort) trait.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod channel;
pub mod config;
pub mod fifo;

pub use channel::{InterruptShared, MaskGuard, StreamChannel, NO_DATA_PLACEHOLDER};
pub use config::{ConfigError, LinkConfig};
pub use fifo::Fifo;
pub use ringlink_hal::{
    Baudrate, ConfigurablePort, DataBits, Notification, Parity, SerialPort, StopBits, UartConfig,
};
