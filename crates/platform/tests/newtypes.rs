//! Type system enforcement tests for the platform newtypes.
//! These types keep DAC indices and SPI framing in range at the call site.

#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects, clippy::cast_possible_truncation)]

// ── DacIndex ─────────────────────────────────────────────────────────────────

#[test]
fn dac_index_is_one_byte() {
    use platform::DacIndex;
    // DacIndex wraps a u8
    assert_eq!(core::mem::size_of::<DacIndex>(), 1);
}

#[test]
fn dac_index_try_from_matches_new() {
    use platform::DacIndex;
    for value in 0..=u8::MAX {
        assert_eq!(DacIndex::try_from(value), DacIndex::new(value));
    }
}

#[test]
fn dac_index_error_reports_range() {
    use platform::{DacIndex, DAC_COUNT};
    let err = DacIndex::new(9).unwrap_err();
    assert_eq!(err.value, 9);
    assert_eq!(err.max as usize, DAC_COUNT - 1);
}

#[test]
fn dac_index_all_covers_every_chip() {
    use platform::{DacIndex, DAC_COUNT};
    assert_eq!(DacIndex::all().count(), DAC_COUNT);
    assert!(DacIndex::all().all(|d| d.as_usize() < DAC_COUNT));
}

// ── SpiFlags ─────────────────────────────────────────────────────────────────

#[test]
fn spi_flags_combine_without_loss() {
    use platform::SpiFlags;
    let read_phase = SpiFlags::INPUT | SpiFlags::HALF_DUPLEX | SpiFlags::END;
    assert!(read_phase.contains(SpiFlags::INPUT));
    assert!(read_phase.contains(SpiFlags::HALF_DUPLEX));
    assert!(read_phase.contains(SpiFlags::END));
    assert!(!read_phase.contains(SpiFlags::OFFLINE));
    assert_eq!(read_phase.bits(), 0x86);
}

#[test]
fn spi_flags_default_is_empty() {
    use platform::SpiFlags;
    assert_eq!(SpiFlags::default(), SpiFlags::NONE);
    assert_eq!(SpiFlags::default().bits(), 0);
}

// ── TimingConfig ─────────────────────────────────────────────────────────────

#[test]
fn timing_config_default_matches_board_values() {
    use platform::TimingConfig;
    let t = TimingConfig::default();
    assert_eq!(t.dac_reset_hold_ns, 100);
    assert_eq!(t.identity_settle_ns, 10_000);
    assert_eq!(t.coarse_ref_period_ns, 8);
    assert_eq!(t.sample_write_spacing_periods, 100);
    assert_eq!(t.awg_reset_pulse_ns, 100);
    assert_eq!(t.spi_divider, 16);
}
