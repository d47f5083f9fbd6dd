//! Domain newtypes for compile-time safety.
//!
//! - `DacIndex`: validated `0..DAC_COUNT`, so drivers never index the
//!   chip-select table out of range

use crate::config::DAC_COUNT;

// ── Error type ───────────────────────────────────────────────────────────────

/// Error returned when a value is out of the valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutOfRangeError {
    /// The value that was out of range.
    pub value: u32,
    /// The inclusive minimum allowed value.
    pub min: u32,
    /// The inclusive maximum allowed value.
    pub max: u32,
}

// ── DacIndex ─────────────────────────────────────────────────────────────────

/// Logical index of one DAC chip on the shared configuration bus.
///
/// Wraps a `u8` with the invariant `value < DAC_COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct DacIndex(u8);

impl DacIndex {
    /// Create a `DacIndex`, returning an error if `value >= DAC_COUNT`.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError`] if `value >= DAC_COUNT`.
    #[allow(clippy::cast_possible_truncation)] // DAC_COUNT = 8
    pub const fn new(value: u8) -> Result<Self, OutOfRangeError> {
        if (value as usize) < DAC_COUNT {
            Ok(Self(value))
        } else {
            Err(OutOfRangeError {
                value: value as u32,
                min: 0,
                max: (DAC_COUNT - 1) as u32,
            })
        }
    }

    /// Return the inner index.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Index as `usize`, for table lookups.
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// All DAC indices in ascending order.
    #[allow(clippy::cast_possible_truncation)] // DAC_COUNT = 8
    pub fn all() -> impl Iterator<Item = Self> {
        (0..DAC_COUNT as u8).map(Self)
    }
}

impl core::fmt::Display for DacIndex {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "DAC{}", self.0)
    }
}

impl TryFrom<u8> for DacIndex {
    type Error = OutOfRangeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
