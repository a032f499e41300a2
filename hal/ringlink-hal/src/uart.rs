//! UART serial communication abstractions
//!
//! The stream channel in `ringlink-core` moves one byte at a time between a
//! data register and a pair of ring buffers. All it needs from the hardware
//! is captured by [`SerialPort`]: a single-byte read, a single-byte write,
//! and an enable toggle for each of the two interrupt sources.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Interrupt sources of a serial port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Notification {
    /// A byte has been received into the data register
    RxComplete,
    /// The transmit data register can accept another byte
    TxReady,
}

/// Byte-oriented serial peripheral
///
/// Every method takes `&self`: the peripheral is shared between foreground
/// code and its interrupt handlers in the same way memory-mapped registers
/// are. Implementations must not block.
pub trait SerialPort {
    /// Read the byte currently held in the receive data register
    fn read_data(&self) -> u8;

    /// Write a byte into the transmit data register
    fn write_data(&self, byte: u8);

    /// Allow the given interrupt source to fire
    fn enable(&self, source: Notification);

    /// Mask the given interrupt source
    fn disable(&self, source: Notification);

    /// Check whether the given interrupt source is currently enabled
    fn is_enabled(&self, source: Notification) -> bool;

    /// Enable or disable an interrupt source
    fn set_enabled(&self, source: Notification, enabled: bool) {
        if enabled {
            self.enable(source);
        } else {
            self.disable(source);
        }
    }
}

/// Serial port whose line settings can be changed after start-up
pub trait ConfigurablePort: SerialPort {
    /// Error type for unsupported settings
    type Error;

    /// Apply new line settings
    ///
    /// The change takes effect immediately; bytes in flight may be
    /// corrupted, so callers should flush first.
    fn configure(&self, config: &UartConfig) -> Result<(), Self::Error>;
}

/// UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct UartConfig {
    /// Baud rate
    pub baudrate: Baudrate,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            baudrate: Baudrate::default(),
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

/// Supported baud rates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "u32", into = "u32")
)]
pub enum Baudrate {
    Baud2400,
    Baud4800,
    #[default]
    Baud9600,
    Baud19200,
    Baud38400,
    Baud57600,
    Baud115200,
    Baud230400,
    Baud250000,
}

impl Baudrate {
    /// All supported rates, slowest first
    pub const ALL: [Baudrate; 9] = [
        Baudrate::Baud2400,
        Baudrate::Baud4800,
        Baudrate::Baud9600,
        Baudrate::Baud19200,
        Baudrate::Baud38400,
        Baudrate::Baud57600,
        Baudrate::Baud115200,
        Baudrate::Baud230400,
        Baudrate::Baud250000,
    ];

    /// Bits per second
    pub const fn as_u32(self) -> u32 {
        match self {
            Baudrate::Baud2400 => 2_400,
            Baudrate::Baud4800 => 4_800,
            Baudrate::Baud9600 => 9_600,
            Baudrate::Baud19200 => 19_200,
            Baudrate::Baud38400 => 38_400,
            Baudrate::Baud57600 => 57_600,
            Baudrate::Baud115200 => 115_200,
            Baudrate::Baud230400 => 230_400,
            Baudrate::Baud250000 => 250_000,
        }
    }
}

impl From<Baudrate> for u32 {
    fn from(rate: Baudrate) -> Self {
        rate.as_u32()
    }
}

impl TryFrom<u32> for Baudrate {
    type Error = InvalidBaudrate;

    fn try_from(bps: u32) -> Result<Self, Self::Error> {
        Baudrate::ALL
            .iter()
            .copied()
            .find(|rate| rate.as_u32() == bps)
            .ok_or(InvalidBaudrate(bps))
    }
}

/// A bits-per-second value that is not one of the [`Baudrate`] variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidBaudrate(pub u32);

impl fmt::Display for InvalidBaudrate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported baud rate {}", self.0)
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DataBits {
    Seven,
    Eight,
    Nine,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StopBits {
    One,
    Two,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_9600_8n1() {
        let config = UartConfig::default();
        assert_eq!(config.baudrate, Baudrate::Baud9600);
        assert_eq!(config.baudrate.as_u32(), 9600);
        assert_eq!(config.data_bits, DataBits::Eight);
        assert_eq!(config.parity, Parity::None);
        assert_eq!(config.stop_bits, StopBits::One);
    }

    #[test]
    fn test_baudrate_from_bps() {
        for rate in Baudrate::ALL {
            assert_eq!(Baudrate::try_from(rate.as_u32()), Ok(rate));
        }
        assert_eq!(Baudrate::try_from(115_200), Ok(Baudrate::Baud115200));
    }

    #[test]
    fn test_unsupported_baudrate() {
        assert_eq!(Baudrate::try_from(12_345), Err(InvalidBaudrate(12_345)));
        assert_eq!(Baudrate::try_from(0), Err(InvalidBaudrate(0)));
    }

    #[test]
    fn test_rates_are_ascending() {
        let rates = Baudrate::ALL.map(Baudrate::as_u32);
        assert!(rates.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
