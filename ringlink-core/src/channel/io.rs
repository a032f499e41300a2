//! `embedded-io` and `core::fmt` adapters for [`StreamChannel`]

use core::convert::Infallible;
use core::fmt;
use core::hint::spin_loop;

use ringlink_hal::SerialPort;

use super::StreamChannel;
use crate::fifo::Storage;

impl<P, RS, TS> embedded_io::ErrorType for StreamChannel<P, RS, TS> {
    type Error = Infallible;
}

impl<P, RS, TS> embedded_io::Read for StreamChannel<P, RS, TS>
where
    P: SerialPort,
    RS: Storage,
    TS: Storage,
{
    /// Busy-waits for the first byte, then takes whatever else is queued
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() {
            return Ok(0);
        }
        while self.is_rx_empty() {
            spin_loop();
        }
        Ok(self.drain_into(buf))
    }
}

impl<P, RS, TS> embedded_io::ReadReady for StreamChannel<P, RS, TS>
where
    P: SerialPort,
    RS: Storage,
    TS: Storage,
{
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.is_rx_empty())
    }
}

impl<P, RS, TS> embedded_io::Write for StreamChannel<P, RS, TS>
where
    P: SerialPort,
    RS: Storage,
    TS: Storage,
{
    /// Busy-waits for room, then queues as much as fits
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() {
            return Ok(0);
        }
        while self.is_tx_full() {
            spin_loop();
        }
        let rest = self.enqueue(buf);
        Ok(buf.len() - rest.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        StreamChannel::flush(self);
        Ok(())
    }
}

impl<P, RS, TS> embedded_io::WriteReady for StreamChannel<P, RS, TS>
where
    P: SerialPort,
    RS: Storage,
    TS: Storage,
{
    fn write_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.is_tx_full())
    }
}

impl<P, RS, TS> embedded_io_async::Read for StreamChannel<P, RS, TS>
where
    P: SerialPort,
    RS: Storage,
    TS: Storage,
{
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let Some((first, rest)) = buf.split_first_mut() else {
            return Ok(0);
        };
        *first = self.get_byte_async().await;
        Ok(1 + self.drain_into(rest))
    }
}

impl<P, RS, TS> embedded_io_async::Write for StreamChannel<P, RS, TS>
where
    P: SerialPort,
    RS: Storage,
    TS: Storage,
{
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() {
            return Ok(0);
        }
        self.tx_space().await;
        let rest = self.enqueue(buf);
        Ok(buf.len() - rest.len())
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        self.flush_async().await;
        Ok(())
    }
}

impl<P, RS, TS> fmt::Write for StreamChannel<P, RS, TS>
where
    P: SerialPort,
    RS: Storage,
    TS: Storage,
{
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.put_str(s);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::mock::{channel, drain_tx, receive};
    use core::fmt::Write as _;
    use embassy_futures::block_on;

    #[test]
    fn test_blocking_write_reports_partial() {
        let mut channel = channel::<4, 3>();

        let written = embedded_io::Write::write(&mut channel, b"abcdef").unwrap();

        assert_eq!(written, 3);
        assert!(!embedded_io::WriteReady::write_ready(&mut channel).unwrap());
        assert_eq!(drain_tx(&channel), b"abc");
        assert!(embedded_io::WriteReady::write_ready(&mut channel).unwrap());
    }

    #[test]
    fn test_blocking_read_takes_available() {
        let mut channel = channel::<8, 4>();
        assert!(!embedded_io::ReadReady::read_ready(&mut channel).unwrap());

        for &byte in b"data" {
            receive(&channel, byte);
        }
        assert!(embedded_io::ReadReady::read_ready(&mut channel).unwrap());

        let mut buf = [0u8; 3];
        let n = embedded_io::Read::read(&mut channel, &mut buf).unwrap();
        assert_eq!(&buf[..n], b"dat");

        let n = embedded_io::Read::read(&mut channel, &mut buf).unwrap();
        assert_eq!(&buf[..n], b"a");
    }

    #[test]
    fn test_blocking_flush_after_drain() {
        let mut channel = channel::<4, 4>();
        embedded_io::Write::write_all(&mut channel, b"go").unwrap();
        drain_tx(&channel);

        embedded_io::Write::flush(&mut channel).unwrap();
        assert!(channel.is_tx_empty());
    }

    #[test]
    fn test_async_read_and_write() {
        let mut channel = channel::<8, 8>();
        receive(&channel, b'o');
        receive(&channel, b'k');

        let mut buf = [0u8; 8];
        let n = block_on(embedded_io_async::Read::read(&mut channel, &mut buf)).unwrap();
        assert_eq!(&buf[..n], b"ok");

        let n = block_on(embedded_io_async::Write::write(&mut channel, b"ack")).unwrap();
        assert_eq!(n, 3);
        assert_eq!(drain_tx(&channel), b"ack");
    }

    #[test]
    fn test_formatted_output() {
        let mut channel = channel::<4, 32>();

        write!(channel, "t={} ok={}", 42, true).unwrap();

        assert_eq!(drain_tx(&channel), b"t=42 ok=true");
    }
}
