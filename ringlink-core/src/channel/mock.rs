//! Test double for [`SerialPort`] and a tiny interrupt controller model

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use ringlink_hal::{ConfigurablePort, DataBits, Notification, SerialPort, UartConfig};

use super::StreamChannel;
use crate::fifo::Fifo;

/// Everything the channel did to the port, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PortEvent {
    Enable(Notification),
    Disable(Notification),
    Read(u8),
    Write(u8),
}

/// Serial port that records its use
///
/// `rx_register` plays the receive data register and `rx_pending` its
/// interrupt flag: a byte that arrives while the receive source is masked
/// stays latched until the handler reads it. Bytes queued with
/// [`arrive_while_masked`](Self::arrive_while_masked) land in the register
/// the next time the receive source is masked. Transmitted bytes are
/// collected in `wire`.
pub(crate) struct MockPort {
    rx_register: Cell<u8>,
    rx_pending: Cell<bool>,
    rx_scheduled: RefCell<VecDeque<u8>>,
    rx_enabled: Cell<bool>,
    tx_enabled: Cell<bool>,
    wire: RefCell<Vec<u8>>,
    events: RefCell<Vec<PortEvent>>,
    config: Cell<Option<UartConfig>>,
}

impl MockPort {
    pub(crate) fn new() -> Self {
        Self {
            rx_register: Cell::new(0),
            rx_pending: Cell::new(false),
            rx_scheduled: RefCell::new(VecDeque::new()),
            rx_enabled: Cell::new(false),
            tx_enabled: Cell::new(false),
            wire: RefCell::new(Vec::new()),
            events: RefCell::new(Vec::new()),
            config: Cell::new(None),
        }
    }

    /// Drain the event log
    pub(crate) fn take_events(&self) -> Vec<PortEvent> {
        self.events.take()
    }

    /// Drain the bytes written to the transmit register
    pub(crate) fn take_wire(&self) -> Vec<u8> {
        self.wire.take()
    }

    pub(crate) fn last_config(&self) -> Option<UartConfig> {
        self.config.get()
    }

    /// Deliver `byte` from inside the next receive masking window
    pub(crate) fn arrive_while_masked(&self, byte: u8) {
        self.rx_scheduled.borrow_mut().push_back(byte);
    }

    /// Whether a received byte is waiting for the handler
    pub(crate) fn rx_pending(&self) -> bool {
        self.rx_pending.get()
    }

    /// Put a byte in the data register and raise the receive flag
    ///
    /// An unread byte is overwritten, as on a single-byte register.
    fn latch(&self, byte: u8) {
        self.rx_register.set(byte);
        self.rx_pending.set(true);
    }

    fn log(&self, event: PortEvent) {
        self.events.borrow_mut().push(event);
    }

    fn flag(&self, source: Notification) -> &Cell<bool> {
        match source {
            Notification::RxComplete => &self.rx_enabled,
            Notification::TxReady => &self.tx_enabled,
        }
    }
}

impl SerialPort for MockPort {
    fn read_data(&self) -> u8 {
        let byte = self.rx_register.get();
        self.rx_pending.set(false);
        self.log(PortEvent::Read(byte));
        byte
    }

    fn write_data(&self, byte: u8) {
        self.log(PortEvent::Write(byte));
        self.wire.borrow_mut().push(byte);
    }

    fn enable(&self, source: Notification) {
        self.log(PortEvent::Enable(source));
        self.flag(source).set(true);
    }

    fn disable(&self, source: Notification) {
        self.log(PortEvent::Disable(source));
        self.flag(source).set(false);

        if source == Notification::RxComplete {
            if let Some(byte) = self.rx_scheduled.borrow_mut().pop_front() {
                self.latch(byte);
            }
        }
    }

    fn is_enabled(&self, source: Notification) -> bool {
        self.flag(source).get()
    }
}

/// The mock line only supports eight data bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Unsupported;

impl ConfigurablePort for MockPort {
    type Error = Unsupported;

    fn configure(&self, config: &UartConfig) -> Result<(), Self::Error> {
        if config.data_bits != DataBits::Eight {
            return Err(Unsupported);
        }
        self.config.set(Some(*config));
        Ok(())
    }
}

pub(crate) type TestChannel<const RX: usize, const TX: usize> =
    StreamChannel<MockPort, [u8; RX], [u8; TX]>;

pub(crate) fn channel<const RX: usize, const TX: usize>() -> TestChannel<RX, TX> {
    let channel = StreamChannel::new(
        MockPort::new(),
        Fifo::from_array([0; RX]),
        Fifo::from_array([0; TX]),
    );
    channel.start();
    channel.port().take_events();
    channel
}

/// A byte arrives on the line
///
/// The receive handler runs right away if its source is enabled, as it
/// would on hardware. Otherwise the byte stays latched until
/// [`service_rx`] runs after the source is unmasked. Returns whether the
/// handler ran.
pub(crate) fn receive<const RX: usize, const TX: usize>(
    channel: &TestChannel<RX, TX>,
    byte: u8,
) -> bool {
    channel.port().latch(byte);
    service_rx(channel)
}

/// Run the receive handler if a byte is latched and the source is enabled
pub(crate) fn service_rx<const RX: usize, const TX: usize>(channel: &TestChannel<RX, TX>) -> bool {
    let port = channel.port();
    if port.rx_pending() && port.is_enabled(Notification::RxComplete) {
        channel.on_rx_complete();
        true
    } else {
        false
    }
}

/// Fire the transmit handler once if it is enabled
pub(crate) fn transmit_one<const RX: usize, const TX: usize>(
    channel: &TestChannel<RX, TX>,
) -> bool {
    if channel.port().is_enabled(Notification::TxReady) {
        channel.on_tx_ready();
        true
    } else {
        false
    }
}

/// Let the transmit handler run until it disables itself
pub(crate) fn drain_tx<const RX: usize, const TX: usize>(channel: &TestChannel<RX, TX>) -> Vec<u8> {
    while transmit_one(channel) {}
    channel.port().take_wire()
}
