//! The console's serial link
//!
//! One static stream channel on UART0, shared between the executor and
//! the `UART0_IRQ` handler.

use embassy_rp::interrupt;
use ringlink_core::{Fifo, InterruptShared, StreamChannel};
use ringlink_hal_rp2040::{Rp2040Serial, UartId};

include!(concat!(env!("OUT_DIR"), "/link_config.rs"));

pub type Link = StreamChannel<Rp2040Serial, [u8; RX_BUFFER_SIZE], [u8; TX_BUFFER_SIZE]>;

// SAFETY: only core 0 runs, and the executor is its single foreground
// context. UART0_IRQ is the only handler that touches LINK, and it calls
// nothing but the handler entry points.
pub static LINK: InterruptShared<Link> = unsafe {
    InterruptShared::new(StreamChannel::new(
        Rp2040Serial::new(UartId::Uart0),
        Fifo::from_array([0; RX_BUFFER_SIZE]),
        Fifo::from_array([0; TX_BUFFER_SIZE]),
    ))
};

#[interrupt]
fn UART0_IRQ() {
    let (rx, tx) = LINK.port().pending();
    if rx {
        LINK.on_rx_complete();
    }
    if tx {
        LINK.on_tx_ready();
    }
}
