//! Line echo console
//!
//! Collects bytes until CR or LF and answers `> <line>\r\n`.

use defmt::*;
use heapless::Vec;

use crate::link::Link;

/// Longest line the console will echo
pub const LINE_CAPACITY: usize = 80;

const BANNER: &str = "ringlink echo console\r\n";

/// Serve the console forever
pub async fn run_console(link: &'static Link) -> ! {
    let mut line: Vec<u8, LINE_CAPACITY> = Vec::new();

    link.put_bytes_async(BANNER.as_bytes()).await;
    info!("Console ready");

    loop {
        let byte = link.get_byte_async().await;
        match byte {
            b'\r' | b'\n' => {
                if line.is_empty() {
                    continue;
                }
                debug!("Echo {=[u8]:a}", line.as_slice());
                link.put_bytes_async(b"> ").await;
                link.put_bytes_async(&line).await;
                link.put_bytes_async(b"\r\n").await;
                line.clear();
            }
            _ => {
                if line.push(byte).is_err() {
                    warn!("Line longer than {} bytes, discarding", LINE_CAPACITY);
                    line.clear();
                    link.clear_rx();
                    link.put_bytes_async(b"! line too long\r\n").await;
                }
            }
        }
    }
}
