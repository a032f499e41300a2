//! Periodic FIFO occupancy report

use defmt::*;
use embassy_time::{Duration, Ticker};

use crate::link::{Link, RX_BUFFER_SIZE, TX_BUFFER_SIZE};

/// Report interval in milliseconds
pub const MONITOR_INTERVAL_MS: u64 = 5_000;

#[embassy_executor::task]
pub async fn monitor_task(link: &'static Link) {
    info!("Monitor task started");

    let mut ticker = Ticker::every(Duration::from_millis(MONITOR_INTERVAL_MS));
    loop {
        ticker.next().await;

        let rx = link.rx_len();
        let tx = link.tx_len();
        if rx == RX_BUFFER_SIZE {
            warn!("Receive FIFO full, incoming bytes are being dropped");
        }
        debug!("FIFO occupancy: rx {}/{} tx {}/{}", rx, RX_BUFFER_SIZE, tx, TX_BUFFER_SIZE);
    }
}
