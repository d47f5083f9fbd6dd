//! Facade errors

use dac::DacError;
use embedded_hal::digital::ErrorKind;
use platform::DacIndex;

/// Error returned by [`Shuttler`](crate::Shuttler) operations.
///
/// `L` is the link's error type, `B` the DAC bus error type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror_no_std::Error)]
pub enum ShuttlerError<L, B> {
    /// The real-time link refused a command word.
    #[error("link error: {0:?}")]
    Link(L),
    /// A DAC bank operation failed.
    #[error("DAC bank: {0}")]
    Dac(DacError<B>),
    /// Driving the AWG reset line failed.
    #[error("AWG reset line error: {0:?}")]
    Pin(ErrorKind),
    /// DAC index outside `0..8`.
    #[error("no DAC with index {0}")]
    InvalidDac(u8),
    /// The bank has not been brought up yet.
    #[error("DAC bank not initialised")]
    NotInitialized,
    /// The last bring-up stopped at a chip that failed its identity check.
    #[error("DAC bank faulted at {dac}")]
    BankFaulted {
        /// Chip that failed.
        dac: DacIndex,
    },
    /// More distinct channels than the facade can track.
    #[error("too many channels, cannot track channel {0}")]
    TooManyChannels(u32),
}

impl<L, B> From<DacError<B>> for ShuttlerError<L, B> {
    fn from(e: DacError<B>) -> Self {
        Self::Dac(e)
    }
}
