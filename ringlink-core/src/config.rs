//! Link configuration
//!
//! Line settings plus the size of each direction's FIFO. The firmware
//! loads this from `link.toml` at build time and sizes its static
//! buffers from it.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use ringlink_hal::UartConfig;

/// Receive FIFO size used when none is configured
pub const DEFAULT_RX_BUFFER_SIZE: u16 = 64;

/// Transmit FIFO size used when none is configured
pub const DEFAULT_TX_BUFFER_SIZE: u16 = 64;

/// Largest FIFO a link may ask for
pub const MAX_BUFFER_SIZE: u16 = 4096;

/// Everything needed to bring up one stream channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LinkConfig {
    /// Line settings
    pub uart: UartConfig,
    /// Receive FIFO capacity in bytes
    pub rx_buffer_size: u16,
    /// Transmit FIFO capacity in bytes
    pub tx_buffer_size: u16,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            uart: UartConfig::default(),
            rx_buffer_size: DEFAULT_RX_BUFFER_SIZE,
            tx_buffer_size: DEFAULT_TX_BUFFER_SIZE,
        }
    }
}

impl LinkConfig {
    /// Check both buffer sizes
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_BUFFER_SIZE).contains(&self.rx_buffer_size) {
            return Err(ConfigError::RxBufferSize(self.rx_buffer_size));
        }
        if !(1..=MAX_BUFFER_SIZE).contains(&self.tx_buffer_size) {
            return Err(ConfigError::TxBufferSize(self.tx_buffer_size));
        }
        Ok(())
    }
}

/// Rejected link configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Receive buffer size outside `1..=MAX_BUFFER_SIZE`
    RxBufferSize(u16),
    /// Transmit buffer size outside `1..=MAX_BUFFER_SIZE`
    TxBufferSize(u16),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RxBufferSize(size) => write!(
                f,
                "rx_buffer_size {} must be between 1 and {}",
                size, MAX_BUFFER_SIZE
            ),
            Self::TxBufferSize(size) => write!(
                f,
                "tx_buffer_size {} must be between 1 and {}",
                size, MAX_BUFFER_SIZE
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ringlink_hal::Baudrate;

    #[test]
    fn test_default_link() {
        let config = LinkConfig::default();
        assert_eq!(config.uart.baudrate, Baudrate::Baud9600);
        assert_eq!(config.rx_buffer_size, 64);
        assert_eq!(config.tx_buffer_size, 64);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_zero_sized_buffer_rejected() {
        let config = LinkConfig {
            tx_buffer_size: 0,
            ..LinkConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::TxBufferSize(0)));
    }

    #[test]
    fn test_buffer_size_bounds() {
        let mut config = LinkConfig {
            rx_buffer_size: MAX_BUFFER_SIZE,
            tx_buffer_size: 1,
            ..LinkConfig::default()
        };
        assert!(config.validate().is_ok());

        config.rx_buffer_size = MAX_BUFFER_SIZE + 1;
        assert_eq!(
            config.validate(),
            Err(ConfigError::RxBufferSize(MAX_BUFFER_SIZE + 1))
        );
    }

    #[test]
    fn test_error_message_names_field() {
        let message = std::format!("{}", ConfigError::RxBufferSize(0));
        assert!(message.starts_with("rx_buffer_size 0"));
    }
}
