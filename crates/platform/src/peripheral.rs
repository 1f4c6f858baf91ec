//! Peripheral bus configuration
//!
//! The tag reader sits on SPI. The pipeline never talks to the bus itself;
//! these types only carry the caller-supplied addressing to whichever driver
//! builds the [`TagScanner`](crate::TagScanner).

use serde::{Deserialize, Serialize};

/// SPI configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpiConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
    /// SPI mode (CPOL, CPHA)
    pub mode: SpiMode,
    /// Bit order
    pub bit_order: BitOrder,
}

impl SpiConfig {
    /// MFRC522 datasheet limit: 10 Mbit/s, mode 0, MSB first.
    pub const MFRC522: Self = Self {
        frequency: 10_000_000,
        mode: SpiMode::Mode0,
        bit_order: BitOrder::MsbFirst,
    };
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self::MFRC522
    }
}

/// SPI modes (CPOL, CPHA)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpiMode {
    /// Mode 0: CPOL=0, CPHA=0
    Mode0,
    /// Mode 1: CPOL=0, CPHA=1
    Mode1,
    /// Mode 2: CPOL=1, CPHA=0
    Mode2,
    /// Mode 3: CPOL=1, CPHA=1
    Mode3,
}

/// Bit order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BitOrder {
    /// Most significant bit first
    MsbFirst,
    /// Least significant bit first
    LsbFirst,
}

/// Kernel-level SPI device address (`/dev/spidev<bus>.<chip_select>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpiAddress {
    /// SPI bus id
    pub bus: u8,
    /// Chip-select line on that bus
    pub chip_select: u8,
}

impl core::fmt::Display for SpiAddress {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "spidev{}.{}", self.bus, self.chip_select)
    }
}
