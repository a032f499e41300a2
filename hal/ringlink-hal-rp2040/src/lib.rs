//! RP2040 backend for ringlink
//!
//! Implements the `ringlink-hal` serial traits directly on the PL011
//! registers so that a `ringlink_core::StreamChannel` can be driven from
//! the UART interrupt handler.

#![no_std]

pub mod uart;

pub use uart::{Rp2040Serial, SetupError, UartId};
