//! Interrupt-fed serial stream channel
//!
//! A [`StreamChannel`] buffers both directions of a byte-at-a-time serial
//! port in two independent [`Fifo`]s:
//!
//! ```text
//!              on_rx_complete()                 get_byte() / read_into()
//!  data reg  ──────────────────▶  rx FIFO  ──────────────────────────────▶  app
//!
//!              on_tx_ready()                    put_byte() / put_bytes()
//!  data reg  ◀──────────────────  tx FIFO  ◀──────────────────────────────  app
//! ```
//!
//! # Concurrency
//!
//! Each FIFO is shared by exactly two contexts: the foreground and the
//! handler of one interrupt source. Handlers run to completion, so they
//! never observe the foreground mid-update as long as the foreground masks
//! the competing source while it mutates the FIFO. Every foreground
//! mutation therefore happens inside a [`MaskGuard`]. The two directions
//! are independent critical sections: reading never masks transmission
//! and vice versa.
//!
//! Handler entry points ([`on_rx_complete`](StreamChannel::on_rx_complete),
//! [`on_tx_ready`](StreamChannel::on_tx_ready)) never block. The bulk
//! transmit and [`flush`](StreamChannel::flush) operations busy-wait for
//! the hardware and must only be used from the foreground; when an async
//! executor is available use the `_async` variants instead.
//!
//! To share a channel with real interrupt handlers, place it in a `static`
//! through [`InterruptShared`].

#![allow(unsafe_code)]

mod cell;
mod guard;
mod io;

#[cfg(test)]
pub(crate) mod mock;

pub use cell::InterruptShared;
pub use guard::MaskGuard;

use core::future::poll_fn;
use core::hint::spin_loop;
use core::sync::atomic::{compiler_fence, Ordering};
use core::task::Poll;

use embassy_sync::waitqueue::AtomicWaker;
use heapless::Vec;
use ringlink_hal::{ConfigurablePort, Notification, SerialPort, UartConfig};

use crate::fifo::{Fifo, Occupancy, Storage};
use cell::HandlerCell;

/// Written by [`StreamChannel::read_into`] when nothing was received
pub const NO_DATA_PLACEHOLDER: &[u8] = b"-empty-";

/// Sample a FIFO from the foreground without masking
///
/// The fences force a fresh sample on every call, so a spin loop
/// observes updates made by the handler.
fn observe<S>(fifo: &HandlerCell<Fifo<S>>) -> Occupancy {
    compiler_fence(Ordering::SeqCst);
    // SAFETY: the cell outlives the call, and a handler that preempts the
    // sample runs to completion before the foreground resumes
    let occupancy = unsafe { Fifo::occupancy(fifo.as_ptr()) };
    compiler_fence(Ordering::SeqCst);
    occupancy
}

/// Buffered, interrupt-driven serial stream
///
/// `RS` and `TS` are the receive and transmit FIFO storage types.
pub struct StreamChannel<P, RS, TS = RS> {
    port: P,
    rx: HandlerCell<Fifo<RS>>,
    tx: HandlerCell<Fifo<TS>>,
    /// Woken when a byte has been received
    rx_waker: AtomicWaker,
    /// Woken when the transmitter has taken a byte
    tx_waker: AtomicWaker,
}

impl<P, RS, TS> StreamChannel<P, RS, TS> {
    /// Assemble a channel from a port and two FIFOs
    ///
    /// Nothing is touched on the hardware until [`start`](Self::start).
    pub const fn new(port: P, rx: Fifo<RS>, tx: Fifo<TS>) -> Self {
        Self {
            port,
            rx: HandlerCell::new(rx),
            tx: HandlerCell::new(tx),
            rx_waker: AtomicWaker::new(),
            tx_waker: AtomicWaker::new(),
        }
    }

    /// The underlying serial port
    pub fn port(&self) -> &P {
        &self.port
    }
}

impl<P, RS, TS> StreamChannel<P, RS, TS>
where
    P: SerialPort,
    RS: Storage,
    TS: Storage,
{
    /// Initialize the channel
    ///
    /// Empties both FIFOs, enables the receive interrupt and leaves the
    /// transmit interrupt disabled until there is something to send.
    pub fn start(&self) {
        self.port.disable(Notification::TxReady);
        let _rx = MaskGuard::new(&self.port, Notification::RxComplete);

        // SAFETY: both interrupt sources are masked
        unsafe {
            self.rx.with_mut(Fifo::clear);
            self.tx.with_mut(Fifo::clear);
        }
    }

    /// Receive-complete handler body
    ///
    /// Moves the received byte into the receive FIFO. The byte is dropped
    /// if the FIFO is full. Call only from the receive interrupt handler.
    pub fn on_rx_complete(&self) {
        let byte = self.port.read_data();

        // SAFETY: handler context; the foreground masks RxComplete around
        // every receive FIFO mutation
        unsafe { self.rx.with_mut(|fifo| fifo.push(byte)) };

        self.rx_waker.wake();
    }

    /// Transmit-ready handler body
    ///
    /// Moves one byte from the transmit FIFO to the data register and
    /// disables itself once the FIFO has drained. Call only from the
    /// transmit interrupt handler.
    pub fn on_tx_ready(&self) {
        // SAFETY: handler context; the foreground masks TxReady around
        // every transmit FIFO mutation
        let (next, drained) = unsafe { self.tx.with_mut(|fifo| (fifo.pop(), fifo.is_empty())) };

        if let Some(byte) = next {
            self.port.write_data(byte);
        }
        if drained {
            self.port.disable(Notification::TxReady);
        }

        self.tx_waker.wake();
    }

    /// Queue a single byte for transmission
    ///
    /// The byte is dropped if the transmit FIFO is full.
    pub fn put_byte(&self, byte: u8) {
        let _mask = MaskGuard::new(&self.port, Notification::TxReady);

        // SAFETY: TxReady is masked
        unsafe { self.tx.with_mut(|fifo| fifo.push(byte)) };
    }

    /// Queue bytes for transmission, waiting for room as needed
    ///
    /// Busy-waits whenever the transmit FIFO is full, so this can take as
    /// long as the hardware needs to send everything but the last FIFO's
    /// worth. Never call it from an interrupt handler.
    pub fn put_bytes(&self, bytes: &[u8]) {
        let mut rest = bytes;
        while !rest.is_empty() {
            while self.is_tx_full() {
                spin_loop();
            }
            rest = self.enqueue(rest);
        }
    }

    /// Queue a string for transmission, waiting for room as needed
    ///
    /// No terminator is sent. See [`put_bytes`](Self::put_bytes).
    pub fn put_str(&self, s: &str) {
        self.put_bytes(s.as_bytes());
    }

    /// Take the oldest received byte, or `0` if there is none
    ///
    /// A received zero byte looks the same as an empty buffer; use
    /// [`try_get_byte`](Self::try_get_byte) when that matters.
    pub fn get_byte(&self) -> u8 {
        self.try_get_byte().unwrap_or(0)
    }

    /// Take the oldest received byte
    pub fn try_get_byte(&self) -> Option<u8> {
        let _mask = MaskGuard::new(&self.port, Notification::RxComplete);

        // SAFETY: RxComplete is masked
        unsafe { self.rx.with_mut(Fifo::pop) }
    }

    /// Copy received bytes into `dest` as a NUL-terminated string
    ///
    /// At most `dest.len() - 1` bytes are taken; the last slot is kept for
    /// the terminator. Whatever does not fit stays queued, which shows up
    /// as [`is_rx_empty`](Self::is_rx_empty) returning `false`.
    ///
    /// If nothing has been received, [`NO_DATA_PLACEHOLDER`] (truncated to
    /// fit) is written instead. A received zero byte cannot be told apart
    /// from the terminator.
    ///
    /// Returns the number of bytes taken from the receive FIFO. An empty
    /// `dest` is left untouched.
    pub fn read_into(&self, dest: &mut [u8]) -> usize {
        let Some(limit) = dest.len().checked_sub(1) else {
            return 0;
        };

        let mut count = 0;
        while count < limit {
            match self.try_get_byte() {
                Some(byte) => {
                    dest[count] = byte;
                    count += 1;
                }
                None => break,
            }
        }

        let end = if count == 0 {
            let len = NO_DATA_PLACEHOLDER.len().min(limit);
            dest[..len].copy_from_slice(&NO_DATA_PLACEHOLDER[..len]);
            len
        } else {
            count
        };
        dest[end] = 0;

        count
    }

    /// Take up to `N` received bytes
    pub fn read_available<const N: usize>(&self) -> Vec<u8, N> {
        let mut out = Vec::new();
        while !out.is_full() {
            match self.try_get_byte() {
                Some(byte) => {
                    // Cannot fail, `out` has room
                    let _ = out.push(byte);
                }
                None => break,
            }
        }
        out
    }

    /// Discard everything in the receive FIFO
    pub fn clear_rx(&self) {
        let _mask = MaskGuard::new(&self.port, Notification::RxComplete);

        // SAFETY: RxComplete is masked
        unsafe { self.rx.with_mut(Fifo::clear) };
    }

    /// Busy-wait until the transmit FIFO has drained
    ///
    /// The last byte may still be shifting out of the hardware when this
    /// returns.
    pub fn flush(&self) {
        while !self.is_tx_empty() {
            spin_loop();
        }
    }

    /// Check if no received bytes are waiting
    pub fn is_rx_empty(&self) -> bool {
        observe(&self.rx).is_empty
    }

    /// Check if all queued bytes have been handed to the hardware
    pub fn is_tx_empty(&self) -> bool {
        observe(&self.tx).is_empty
    }

    /// Check if the transmit FIFO cannot take another byte
    pub fn is_tx_full(&self) -> bool {
        observe(&self.tx).is_full
    }

    /// Number of received bytes waiting
    pub fn rx_len(&self) -> usize {
        observe(&self.rx).len
    }

    /// Number of bytes waiting to be transmitted
    pub fn tx_len(&self) -> usize {
        observe(&self.tx).len
    }

    /// Queue bytes for transmission, yielding while the FIFO is full
    ///
    /// Waits until the transmit FIFO has room, then queues as much as
    /// fits. Only one task may wait on the transmit side at a time.
    pub async fn put_bytes_async(&self, bytes: &[u8]) {
        let mut rest = bytes;
        while !rest.is_empty() {
            self.tx_space().await;
            rest = self.enqueue(rest);
        }
    }

    /// Wait until the transmit FIFO has drained
    pub async fn flush_async(&self) {
        poll_fn(|cx| {
            self.tx_waker.register(cx.waker());
            if self.is_tx_empty() {
                Poll::Ready(())
            } else {
                Poll::Pending
            }
        })
        .await
    }

    /// Wait for the next received byte
    pub async fn get_byte_async(&self) -> u8 {
        poll_fn(|cx| {
            self.rx_waker.register(cx.waker());
            match self.try_get_byte() {
                Some(byte) => Poll::Ready(byte),
                None => Poll::Pending,
            }
        })
        .await
    }

    /// Wait until the transmit FIFO can take at least one byte
    async fn tx_space(&self) {
        poll_fn(|cx| {
            self.tx_waker.register(cx.waker());
            if self.is_tx_full() {
                Poll::Pending
            } else {
                Poll::Ready(())
            }
        })
        .await
    }

    /// Queue as much of `bytes` as fits in one masked window
    ///
    /// Returns the part that did not fit.
    fn enqueue<'b>(&self, bytes: &'b [u8]) -> &'b [u8] {
        let _mask = MaskGuard::new(&self.port, Notification::TxReady);

        // SAFETY: TxReady is masked
        let queued = unsafe {
            self.tx.with_mut(|fifo| {
                bytes
                    .iter()
                    .take_while(|&&byte| fifo.try_push(byte).is_ok())
                    .count()
            })
        };

        &bytes[queued..]
    }

    /// Move queued received bytes into `buf` until either runs out
    fn drain_into(&self, buf: &mut [u8]) -> usize {
        let mut count = 0;
        for slot in buf.iter_mut() {
            match self.try_get_byte() {
                Some(byte) => {
                    *slot = byte;
                    count += 1;
                }
                None => break,
            }
        }
        count
    }
}

impl<P, RS, TS> StreamChannel<P, RS, TS>
where
    P: ConfigurablePort,
    RS: Storage,
    TS: Storage,
{
    /// Change the line settings
    ///
    /// Takes effect immediately; [`flush`](Self::flush) first to avoid
    /// corrupting bytes still being sent.
    pub fn configure(&self, config: &UartConfig) -> Result<(), P::Error> {
        self.port.configure(config)
    }
}
