//! Ringlink Hardware Abstraction Layer
//!
//! This crate defines the hardware collaborator surface that the
//! interrupt-fed stream channel in `ringlink-core` drives. Chip-specific
//! crates implement it on top of their serial peripheral.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (ringlink-firmware, etc.)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  ringlink-core (FIFO + stream channel)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  ringlink-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ ringlink-hal- │
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::SerialPort`] - Data register and interrupt source toggles
//! - [`uart::ConfigurablePort`] - Runtime line settings

#![no_std]
#![deny(unsafe_code)]

pub mod uart;

// Re-export key traits at crate root for convenience
pub use uart::{
    Baudrate, ConfigurablePort, DataBits, InvalidBaudrate, Notification, Parity, SerialPort,
    StopBits, UartConfig,
};
