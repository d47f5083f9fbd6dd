//! SPI driver for the AD9117 bank
//!
//! Talks to the chips through a [`SpiMaster`] that is reconfigured before
//! every transfer. The reset line and the three board clock enables are
//! plain `embedded_hal` output pins; timing goes through `DelayNs`.
//!
//! # Read framing
//!
//! A register read is two transfers on the same chip select:
//!
//! 1. 8 bits, `END` clear: shift out the read instruction and keep the chip
//!    selected.
//! 2. 24 bits, `INPUT | HALF_DUPLEX | END`: shift the instruction again and
//!    capture the 16 response bits on the shared data line.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{Error as _, OutputPin};
use platform::{DacIndex, SpiConfig, SpiFlags, SpiMaster, TimingConfig};

use crate::chip_select::chip_select;
use crate::error::DacError;
use crate::registers::{
    instruction_frame, read_instruction, write_frame, EXPECTED_VERSION, RCML_ENABLE,
    READ_COMMAND_BITS, READ_DATA_MASK, READ_FRAME_BITS, REG_CLKMODE, REG_IRCML, REG_QRCML,
    REG_VERSION, WRITE_FRAME_BITS,
};
use crate::DacBank;

/// Clock mode shared by every transfer: clock idles high, sample on the
/// trailing edge.
pub const BASE_FLAGS: SpiFlags = SpiFlags::CLK_POLARITY.union(SpiFlags::CLK_PHASE);

/// Board-level clock enables, driven high once the whole bank is up.
#[derive(Debug)]
pub struct BoardEnables<P> {
    /// Sampling oscillator enable
    pub osc_en: P,
    /// MMCX clock input select
    pub mmcx_sel: P,
    /// Reference clock select
    pub refclk_sel: P,
}

/// AD9117 bank driver.
pub struct DacBus<S, R, P, D> {
    spi: S,
    reset: R,
    board: BoardEnables<P>,
    delay: D,
    timing: TimingConfig,
}

impl<S, R, P, D> DacBus<S, R, P, D>
where
    S: SpiMaster,
    R: OutputPin,
    P: OutputPin,
    D: DelayNs,
{
    /// Create a driver with the default [`TimingConfig`].
    pub fn new(spi: S, reset: R, board: BoardEnables<P>, delay: D) -> Self {
        Self::with_timing(spi, reset, board, delay, TimingConfig::default())
    }

    /// Create a driver with explicit timing.
    pub fn with_timing(
        spi: S,
        reset: R,
        board: BoardEnables<P>,
        delay: D,
        timing: TimingConfig,
    ) -> Self {
        Self {
            spi,
            reset,
            board,
            delay,
            timing,
        }
    }

    /// Timing in use.
    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    /// Hand back the owned peripherals.
    pub fn release(self) -> (S, R, BoardEnables<P>, D) {
        (self.spi, self.reset, self.board, self.delay)
    }

    fn transfer(
        &mut self,
        flags: SpiFlags,
        length: u8,
        dac: DacIndex,
        data: u32,
    ) -> Result<(), DacError<S::Error>> {
        self.spi
            .set_config(SpiConfig {
                flags: BASE_FLAGS | flags,
                length,
                divider: self.timing.spi_divider,
                chip_select: chip_select(dac),
            })
            .map_err(DacError::Bus)?;
        self.spi.write(data).map_err(DacError::Bus)
    }

    fn enable_board_clocks(&mut self) -> Result<(), DacError<S::Error>> {
        for pin in [
            &mut self.board.osc_en,
            &mut self.board.mmcx_sel,
            &mut self.board.refclk_sel,
        ] {
            pin.set_high().map_err(|e| DacError::Pin(e.kind()))?;
        }
        Ok(())
    }
}

impl<S, R, P, D> DacBank for DacBus<S, R, P, D>
where
    S: SpiMaster,
    R: OutputPin,
    P: OutputPin,
    D: DelayNs,
{
    type BusError = S::Error;

    fn reset(&mut self) -> Result<(), DacError<S::Error>> {
        tracing::debug!("pulsing DAC reset");
        self.reset.set_high().map_err(|e| DacError::Pin(e.kind()))?;
        self.delay.delay_ns(self.timing.dac_reset_hold_ns);
        self.reset.set_low().map_err(|e| DacError::Pin(e.kind()))?;
        self.delay.delay_ns(self.timing.dac_reset_hold_ns);
        Ok(())
    }

    fn write_register(
        &mut self,
        dac: DacIndex,
        register: u8,
        data: u16,
    ) -> Result<(), DacError<S::Error>> {
        tracing::trace!(%dac, register, data, "register write");
        self.transfer(
            SpiFlags::END,
            WRITE_FRAME_BITS,
            dac,
            write_frame(register, data),
        )
    }

    fn read_register(&mut self, dac: DacIndex, register: u8) -> Result<u16, DacError<S::Error>> {
        let instruction = instruction_frame(read_instruction(register));
        self.transfer(SpiFlags::NONE, READ_COMMAND_BITS, dac, instruction)?;
        self.transfer(
            SpiFlags::INPUT | SpiFlags::HALF_DUPLEX | SpiFlags::END,
            READ_FRAME_BITS,
            dac,
            instruction,
        )?;
        let word = self.spi.read().map_err(DacError::Bus)?;
        #[allow(clippy::cast_possible_truncation)] // masked to 16 bits
        let data = (word & READ_DATA_MASK) as u16;
        tracing::trace!(%dac, register, data, "register read");
        Ok(data)
    }

    fn initialize(&mut self) -> Result<(), DacError<S::Error>> {
        tracing::info!("initialising DAC bank");
        self.reset()?;

        for dac in DacIndex::all() {
            let found = self.read_register(dac, REG_VERSION)?;
            if found != EXPECTED_VERSION {
                tracing::error!(
                    %dac,
                    found,
                    expected = EXPECTED_VERSION,
                    "DAC identity check failed"
                );
                return Err(DacError::IdentityMismatch {
                    dac,
                    expected: EXPECTED_VERSION,
                    found,
                });
            }
            tracing::debug!(%dac, version = found, "DAC identity ok");

            self.delay.delay_ns(self.timing.identity_settle_ns);
            self.write_register(dac, REG_IRCML, RCML_ENABLE)?;
            self.write_register(dac, REG_QRCML, RCML_ENABLE)?;
        }

        self.enable_board_clocks()?;
        tracing::info!("DAC bank initialisation complete");
        Ok(())
    }

    fn timing_status(&mut self, dac: DacIndex) -> Result<u16, DacError<S::Error>> {
        self.read_register(dac, REG_CLKMODE)
    }
}

impl<S, R, P, D> core::fmt::Debug for DacBus<S, R, P, D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DacBus")
            .field("timing", &self.timing)
            .finish_non_exhaustive()
    }
}
