//! Ringlink - interrupt-driven UART echo console
//!
//! Brings UART0 up on GPIO0 (TX) and GPIO1 (RX), hands the peripheral to
//! a ringlink stream channel and serves a line echo console on it.
//! Line settings and FIFO sizes come from `link.toml`.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::interrupt::{self, InterruptExt};
use embassy_rp::uart::{Config as EmbassyUartConfig, Uart};
use {defmt_rtt as _, panic_probe as _};

use crate::link::{Link, LINK, LINK_CONFIG};

mod link;
mod tasks;

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Ringlink firmware starting...");

    let p = embassy_rp::init(Default::default());

    // Pin muxing and clocking; the channel drives the registers afterwards
    let mut uart_config = EmbassyUartConfig::default();
    uart_config.baudrate = LINK_CONFIG.uart.baudrate.as_u32();
    let _uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);

    let link: &'static Link = &LINK;
    link.port().enter_byte_mode();
    if let Err(e) = link.configure(&LINK_CONFIG.uart) {
        panic!("UART setup failed: {}", e);
    }
    link.start();

    interrupt::UART0_IRQ.unpend();
    // SAFETY: UART0_IRQ only calls the channel's handler entry points
    unsafe { interrupt::UART0_IRQ.enable() };

    info!(
        "{} at {} baud, rx {} bytes, tx {} bytes",
        link.port().id(),
        LINK_CONFIG.uart.baudrate.as_u32(),
        LINK_CONFIG.rx_buffer_size,
        LINK_CONFIG.tx_buffer_size
    );

    spawner.spawn(unwrap!(tasks::monitor_task(link)));

    // Keeps `_uart` alive for the lifetime of the firmware
    tasks::run_console(link).await
}
