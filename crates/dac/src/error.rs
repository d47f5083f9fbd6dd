//! DAC bus errors

use embedded_hal::digital::ErrorKind;
use platform::DacIndex;

/// Error returned by [`DacBank`](crate::DacBank) operations.
///
/// `E` is the SPI master's error type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror_no_std::Error)]
pub enum DacError<E> {
    /// The SPI master rejected a configuration or transfer.
    #[error("SPI bus error: {0:?}")]
    Bus(E),
    /// Driving the reset line or a board enable line failed.
    #[error("control pin error: {0:?}")]
    Pin(ErrorKind),
    /// A chip answered the identity read with the wrong version.
    #[error("{dac}: identity register read {found:#04x}, expected {expected:#04x}")]
    IdentityMismatch {
        /// Chip that failed.
        dac: DacIndex,
        /// Version every chip must report.
        expected: u16,
        /// Version actually read.
        found: u16,
    },
}

impl<E> DacError<E> {
    /// The chip that failed bring-up, if this error names one.
    pub fn faulted_dac(&self) -> Option<DacIndex> {
        match self {
            Self::IdentityMismatch { dac, .. } => Some(*dac),
            Self::Bus(_) | Self::Pin(_) => None,
        }
    }
}
