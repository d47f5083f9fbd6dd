//! Board configuration and timing constants
//!
//! Central values shared by the DAC bus driver and the control facade.
//! Everything here is pure data; nothing touches hardware.

/// Number of DAC chips on the board (and parallel output lanes).
pub const DAC_COUNT: usize = 8;

/// Coarse RTIO reference period of the core device, in nanoseconds (125 MHz).
pub const COARSE_REF_PERIOD_NS: u32 = 8;

/// Minimum hold time around a DAC reset pulse.
pub const DAC_RESET_HOLD_NS: u32 = 100;

/// Settling time after a successful identity check, before calibration writes.
pub const IDENTITY_SETTLE_NS: u32 = 10_000;

/// Spacing between consecutive sample writes, in coarse reference periods.
pub const SAMPLE_WRITE_SPACING_PERIODS: u32 = 100;

/// Width of the AWG output-domain reset pulse.
pub const AWG_RESET_PULSE_NS: u32 = 100;

/// SPI clock divider for both register writes and register reads.
pub const SPI_DIVIDER: u8 = 16;

/// Timing parameters used by the drivers.
///
/// [`Default`] reproduces the values the board was brought up with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimingConfig {
    /// Hold time before and after deasserting the DAC reset line (ns).
    pub dac_reset_hold_ns: u32,
    /// Delay between a chip's identity read and its calibration writes (ns).
    pub identity_settle_ns: u32,
    /// Coarse RTIO reference period (ns).
    pub coarse_ref_period_ns: u32,
    /// Spacing between sample writes, in coarse reference periods.
    pub sample_write_spacing_periods: u32,
    /// Width of the AWG output-domain reset pulse (ns).
    pub awg_reset_pulse_ns: u32,
    /// SPI clock divider.
    pub spi_divider: u8,
}

impl TimingConfig {
    /// Spacing between sample writes in nanoseconds (saturating).
    pub const fn sample_write_spacing_ns(&self) -> u32 {
        self.coarse_ref_period_ns
            .saturating_mul(self.sample_write_spacing_periods)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            dac_reset_hold_ns: DAC_RESET_HOLD_NS,
            identity_settle_ns: IDENTITY_SETTLE_NS,
            coarse_ref_period_ns: COARSE_REF_PERIOD_NS,
            sample_write_spacing_periods: SAMPLE_WRITE_SPACING_PERIODS,
            awg_reset_pulse_ns: AWG_RESET_PULSE_NS,
            spi_divider: SPI_DIVIDER,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sample_spacing_is_100_reference_periods() {
        let timing = TimingConfig::default();
        assert_eq!(timing.sample_write_spacing_ns(), 800);
    }

    #[test]
    fn sample_spacing_saturates() {
        let timing = TimingConfig {
            coarse_ref_period_ns: u32::MAX,
            ..TimingConfig::default()
        };
        assert_eq!(timing.sample_write_spacing_ns(), u32::MAX);
    }
}
