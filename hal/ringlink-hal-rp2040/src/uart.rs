//! PL011 UART driven one byte at a time
//!
//! The RP2040 has two UART peripherals (UART0 and UART1). Pin setup and
//! clocking are left to `embassy_rp::uart::Uart::new_blocking`; this
//! module then takes over the data register and the interrupt mask.
//!
//! With the hardware FIFOs disabled the receive interrupt fires for every
//! byte and the transmit interrupt asserts whenever the holding register
//! is empty, which is the contract `ringlink_hal::SerialPort` expects.

use embassy_rp::clocks::clk_peri_freq;
use embassy_rp::pac;
use ringlink_hal::{
    ConfigurablePort, DataBits, Notification, Parity, SerialPort, StopBits, UartConfig,
};

/// UART peripheral identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartId {
    Uart0,
    Uart1,
}

impl UartId {
    const fn regs(self) -> pac::uart::Uart {
        match self {
            Self::Uart0 => pac::UART0,
            Self::Uart1 => pac::UART1,
        }
    }
}

/// Line settings the PL011 cannot apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SetupError {
    /// Only 5 to 8 data bits are supported
    UnsupportedDataBits,
    /// Peripheral clock is not running
    NoClock,
}

/// Register-level handle to one UART
///
/// Holds no state of its own, so it is `Copy` and may be built in a
/// `const` context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rp2040Serial {
    id: UartId,
}

impl Rp2040Serial {
    pub const fn new(id: UartId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> UartId {
        self.id
    }

    /// Disable the 32-entry hardware FIFOs
    ///
    /// Call once after the peripheral is brought up and before enabling
    /// its interrupt.
    pub fn enter_byte_mode(&self) {
        self.id.regs().uartlcr_h().modify(|w| w.set_fen(false));
    }

    /// Masked interrupt status as `(rx, tx)`
    pub fn pending(&self) -> (bool, bool) {
        let mis = self.id.regs().uartmis().read();
        (mis.rxmis(), mis.txmis())
    }
}

/// Baud rate divisor as `(integer, fraction)` in 1/64 steps
fn divisors(clock: u32, baudrate: u32) -> (u32, u32) {
    let div = (8 * clock / baudrate) + 1;
    match (div >> 7, (div & 0x7f) >> 1) {
        (0, _) => (1, 0),
        (ibrd, _) if ibrd >= 65535 => (65535, 0),
        pair => pair,
    }
}

impl SerialPort for Rp2040Serial {
    fn read_data(&self) -> u8 {
        self.id.regs().uartdr().read().data()
    }

    fn write_data(&self, byte: u8) {
        self.id.regs().uartdr().write(|w| w.set_data(byte));
    }

    fn enable(&self, source: Notification) {
        self.set_enabled(source, true);
    }

    fn disable(&self, source: Notification) {
        self.set_enabled(source, false);
    }

    fn is_enabled(&self, source: Notification) -> bool {
        let imsc = self.id.regs().uartimsc().read();
        match source {
            Notification::RxComplete => imsc.rxim(),
            Notification::TxReady => imsc.txim(),
        }
    }

    fn set_enabled(&self, source: Notification, enabled: bool) {
        self.id.regs().uartimsc().modify(|w| match source {
            Notification::RxComplete => w.set_rxim(enabled),
            Notification::TxReady => w.set_txim(enabled),
        });
    }
}

impl ConfigurablePort for Rp2040Serial {
    type Error = SetupError;

    fn configure(&self, config: &UartConfig) -> Result<(), Self::Error> {
        let wlen = match config.data_bits {
            DataBits::Seven => 0b10,
            DataBits::Eight => 0b11,
            DataBits::Nine => return Err(SetupError::UnsupportedDataBits),
        };
        let clock = clk_peri_freq();
        if clock == 0 {
            return Err(SetupError::NoClock);
        }
        let (ibrd, fbrd) = divisors(clock, config.baudrate.as_u32());

        let r = self.id.regs();
        while r.uartfr().read().busy() {}
        r.uartcr().modify(|w| w.set_uarten(false));

        r.uartibrd().write(|w| w.set_baud_divint(ibrd as u16));
        r.uartfbrd().write(|w| w.set_baud_divfrac(fbrd as u8));
        // The divisor latches on the line control write
        r.uartlcr_h().modify(|w| {
            w.set_wlen(wlen);
            w.set_pen(config.parity != Parity::None);
            w.set_eps(config.parity == Parity::Even);
            w.set_stp2(config.stop_bits == StopBits::Two);
        });

        r.uartcr().modify(|w| w.set_uarten(true));
        Ok(())
    }
}
