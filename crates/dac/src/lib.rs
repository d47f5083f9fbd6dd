//! AD9117 configuration-bus driver for the Shuttler DAC bank
//!
//! Eight AD9117 DACs share one SPI bus behind a chip-select decoder. This
//! crate owns that bus:
//!
//! - [`registers`]: register map and frame layout
//! - [`chip_select`]: the DAC index → chip-select mask table
//! - [`driver::DacBus`]: the [`DacBank`] implementation over a
//!   [`platform::SpiMaster`]
//! - [`mock::SimulatedDacBank`]: an in-process bank of eight register files
//!   for host tests and demos (always available)

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![allow(clippy::doc_markdown)] // register names in doc comments
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod chip_select;
pub mod driver;
pub mod error;
pub mod mock;
pub mod registers;

pub use driver::{BoardEnables, DacBus};
pub use error::DacError;
pub use mock::{BusEvent, SimError, SimulatedDacBank};

use platform::DacIndex;

/// The DAC bank as seen by the control layer.
///
/// Every operation takes `&mut self`: one transaction owns the bus at a
/// time, so the two phases of a read can never interleave with another
/// transfer.
pub trait DacBank {
    /// SPI master error type
    type BusError: core::fmt::Debug;

    /// Pulse the shared DAC reset line.
    fn reset(&mut self) -> Result<(), DacError<Self::BusError>>;

    /// Write 16 bits to `register` of `dac`.
    fn write_register(
        &mut self,
        dac: DacIndex,
        register: u8,
        data: u16,
    ) -> Result<(), DacError<Self::BusError>>;

    /// Read 16 bits from `register` of `dac`.
    fn read_register(&mut self, dac: DacIndex, register: u8)
        -> Result<u16, DacError<Self::BusError>>;

    /// Bring up the whole bank.
    ///
    /// Resets the chips, checks every chip's identity in index order and
    /// enables its common-mode resistors, then drives the board clock
    /// enables. Stops at the first chip that fails its identity check.
    fn initialize(&mut self) -> Result<(), DacError<Self::BusError>>;

    /// Read the clock-mode / timing status register of `dac`.
    fn timing_status(&mut self, dac: DacIndex) -> Result<u16, DacError<Self::BusError>>;
}

impl<T: DacBank + ?Sized> DacBank for &mut T {
    type BusError = T::BusError;

    fn reset(&mut self) -> Result<(), DacError<Self::BusError>> {
        T::reset(self)
    }

    fn write_register(
        &mut self,
        dac: DacIndex,
        register: u8,
        data: u16,
    ) -> Result<(), DacError<Self::BusError>> {
        T::write_register(self, dac, register, data)
    }

    fn read_register(
        &mut self,
        dac: DacIndex,
        register: u8,
    ) -> Result<u16, DacError<Self::BusError>> {
        T::read_register(self, dac, register)
    }

    fn initialize(&mut self) -> Result<(), DacError<Self::BusError>> {
        T::initialize(self)
    }

    fn timing_status(&mut self, dac: DacIndex) -> Result<u16, DacError<Self::BusError>> {
        T::timing_status(self, dac)
    }
}
