//! Peripheral abstraction layer
//!
//! The DAC configuration bus is driven by an SPI master that is configured
//! per transfer: every transfer carries its own length, clock divider,
//! chip-select mask and a set of mode flags. Keeping the configuration on the
//! transfer (rather than on the bus) is what allows the two phases of a
//! register read to use different framing on the same chip select.

use core::ops::BitOr;

/// SPI master abstraction.
///
/// Data words are left-aligned: the first bit shifted out is bit 31 of the
/// word passed to [`write`](SpiMaster::write), and the last `length` bits
/// shifted in during an [`SpiFlags::INPUT`] transfer are returned by
/// [`read`](SpiMaster::read) right-aligned.
pub trait SpiMaster {
    /// Error type
    type Error: core::fmt::Debug;

    /// Configure the next transfer(s).
    fn set_config(&mut self, config: SpiConfig) -> Result<(), Self::Error>;

    /// Start a transfer, shifting out the top `length` bits of `data`.
    fn write(&mut self, data: u32) -> Result<(), Self::Error>;

    /// Return the word captured by the last input transfer.
    fn read(&mut self) -> Result<u32, Self::Error>;
}

/// SPI transfer mode flags.
///
/// Bit positions match the SPI2 gateware configuration register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiFlags(u8);

impl SpiFlags {
    /// No flags set
    pub const NONE: Self = Self(0);
    /// Release the bus and float all lines
    pub const OFFLINE: Self = Self(0x01);
    /// Deassert chip select at the end of this transfer
    pub const END: Self = Self(0x02);
    /// Capture MISO (or MOSI in half-duplex) during this transfer
    pub const INPUT: Self = Self(0x04);
    /// Chip-select lines are active high
    pub const CS_POLARITY: Self = Self(0x08);
    /// Clock idles high
    pub const CLK_POLARITY: Self = Self(0x10);
    /// Sample on the trailing clock edge
    pub const CLK_PHASE: Self = Self(0x20);
    /// Shift least significant bit first
    pub const LSB_FIRST: Self = Self(0x40);
    /// Read back on the MOSI line (3-wire mode)
    pub const HALF_DUPLEX: Self = Self(0x80);

    /// Raw register bits.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// `true` if every flag in `other` is also set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Union of two flag sets, usable in `const` context.
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl BitOr for SpiFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// Per-transfer SPI configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiConfig {
    /// Mode flags
    pub flags: SpiFlags,
    /// Transfer length in bits (1–32)
    pub length: u8,
    /// SPI clock divider relative to the RTIO clock
    pub divider: u8,
    /// Chip-select line mask driven while the transfer is active
    pub chip_select: u8,
}
