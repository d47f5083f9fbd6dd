//! Integration test: DAC bank bring-up through the control facade.
//!
//! Tests that:
//!   1. Status reads are refused before bring-up, and refused differently
//!      after a failed one
//!   2. A successful bring-up makes every chip's timing status readable
//!   3. Out-of-range DAC indices are rejected before touching the bus
//!   4. The AWG reset pulse reaches the output domain
//!
//! Run with: cargo test -p shuttler --test integration_bring_up

// Integration test file -- intentional test patterns permitted.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
)]

use std::sync::Arc;

use dac::registers::REG_CLKMODE;
use dac::{BoardEnables, DacBus, DacError, SimulatedDacBank};
use embedded_hal::delay::DelayNs;
use embedded_hal_mock::eh1::delay::NoopDelay;
use embedded_hal_mock::eh1::digital::{
    Mock as PinMock, State as PinState, Transaction as PinTransaction,
};
use platform::DacIndex;
use playback::SampleStore;
use shuttler::{AwgResetLine, BankState, LocalLink, Shuttler, ShuttlerError};

type Bank = DacBus<SimulatedDacBank, PinMock, PinMock, NoopDelay>;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn dac(i: u8) -> DacIndex {
    DacIndex::new(i).unwrap()
}

/// Bank whose bring-up is expected to pulse reset once and, if `succeeds`,
/// drive every board enable high.
fn bank(sim: SimulatedDacBank, succeeds: bool) -> Bank {
    let reset = PinMock::new(&[
        PinTransaction::set(PinState::High),
        PinTransaction::set(PinState::Low),
    ]);
    let pin = || {
        if succeeds {
            PinMock::new(&[PinTransaction::set(PinState::High)])
        } else {
            PinMock::new(&[])
        }
    };
    let board = BoardEnables {
        osc_en: pin(),
        mmcx_sel: pin(),
        refclk_sel: pin(),
    };
    DacBus::new(sim, reset, board, NoopDelay::new())
}

fn facade(bank: Bank) -> (Shuttler<LocalLink, Bank, NoopDelay, AwgResetLine>, Arc<SampleStore>) {
    let store = Arc::new(SampleStore::new());
    let mut link = LocalLink::new();
    link.register(0, Arc::clone(&store)).unwrap();
    let reset = AwgResetLine::new(Arc::clone(&store));
    (Shuttler::new(link, bank, NoopDelay::new(), reset), store)
}

fn finish(shuttler: Shuttler<LocalLink, Bank, NoopDelay, AwgResetLine>) -> SimulatedDacBank {
    let (_, bank, _, _) = shuttler.release();
    let (sim, mut reset, mut board, _) = bank.release();
    reset.done();
    board.osc_en.done();
    board.mmcx_sel.done();
    board.refclk_sel.done();
    sim
}

#[test]
fn status_before_bring_up_is_not_initialised() {
    init_tracing();
    // No bring-up will run: the reset line must see nothing.
    let bank = DacBus::new(
        SimulatedDacBank::new(),
        PinMock::new(&[]),
        BoardEnables {
            osc_en: PinMock::new(&[]),
            mmcx_sel: PinMock::new(&[]),
            refclk_sel: PinMock::new(&[]),
        },
        NoopDelay::new(),
    );
    let (mut shuttler, _) = facade(bank);

    assert_eq!(shuttler.bank_state(), BankState::Uninitialized);
    assert_eq!(
        shuttler.get_dac_timing_status(0),
        Err(ShuttlerError::NotInitialized)
    );

    let sim = finish(shuttler);
    assert!(sim.events().is_empty());
}

#[test]
fn successful_bring_up_enables_status_reads() {
    init_tracing();
    let mut sim = SimulatedDacBank::new();
    for i in 0..8 {
        sim.set_register(dac(i), REG_CLKMODE, u16::from(i) << 4);
    }
    let (mut shuttler, _) = facade(bank(sim, true));

    shuttler.initialize_dac_bank().unwrap();
    assert_eq!(shuttler.bank_state(), BankState::Ready);
    for i in 0..8u8 {
        assert_eq!(
            shuttler.get_dac_timing_status(i).unwrap(),
            u16::from(i) << 4
        );
    }

    let sim = finish(shuttler);
    assert_eq!(sim.writes().count(), 16);
    assert_eq!(sim.reads().count(), 8 + 8);
}

#[test]
fn failed_bring_up_reports_the_faulted_chip() {
    init_tracing();
    let sim = SimulatedDacBank::new().with_identity(dac(3), 0x00);
    let (mut shuttler, _) = facade(bank(sim, false));

    let err = shuttler.initialize_dac_bank().unwrap_err();
    assert!(matches!(
        err,
        ShuttlerError::Dac(DacError::IdentityMismatch { found: 0x00, .. })
    ));
    assert_eq!(shuttler.bank_state(), BankState::Faulted { dac: dac(3) });
    assert_eq!(
        shuttler.get_dac_timing_status(5),
        Err(ShuttlerError::BankFaulted { dac: dac(3) })
    );
    assert_eq!(
        shuttler.get_dac_timing_status(3),
        Err(ShuttlerError::BankFaulted { dac: dac(3) })
    );

    finish(shuttler);
}

#[test]
fn chips_ahead_of_the_fault_stay_diagnosable() {
    let mut sim = SimulatedDacBank::new().with_identity(dac(3), 0x00);
    sim.set_register(dac(1), REG_CLKMODE, 0x0007);
    let (mut shuttler, _) = facade(bank(sim, false));
    shuttler.initialize_dac_bank().unwrap_err();

    assert_eq!(shuttler.get_dac_timing_status(1), Ok(0x0007));
    assert_eq!(shuttler.get_dac_timing_status(0), Ok(0x0000));
    assert_eq!(
        shuttler.get_dac_timing_status(4),
        Err(ShuttlerError::BankFaulted { dac: dac(3) })
    );

    let sim = finish(shuttler);
    // Four identity reads during bring-up, then the two allowed status reads.
    assert_eq!(sim.reads().count(), 4 + 2);
}

#[test]
fn out_of_range_dac_index_is_rejected() {
    let (mut shuttler, _) = facade(bank(SimulatedDacBank::new(), true));
    shuttler.initialize_dac_bank().unwrap();

    assert_eq!(
        shuttler.get_dac_timing_status(8),
        Err(ShuttlerError::InvalidDac(8))
    );
    assert_eq!(
        shuttler.get_dac_timing_status(255),
        Err(ShuttlerError::InvalidDac(255))
    );

    let sim = finish(shuttler);
    assert_eq!(
        sim.reads().count(),
        8,
        "rejected indices never reach the bus"
    );
}

/// Records the reset level seen by the output domain while the pulse is held.
struct ResetLevelDelay {
    store: Arc<SampleStore>,
    in_reset_during_wait: Vec<bool>,
}

impl DelayNs for ResetLevelDelay {
    fn delay_ns(&mut self, _ns: u32) {
        self.in_reset_during_wait.push(self.store.domain_reset());
    }
}

#[test]
fn reset_awg_pulses_the_output_domain() {
    let store = Arc::new(SampleStore::new());
    let mut link = LocalLink::new();
    link.register(0, Arc::clone(&store)).unwrap();
    let delay = ResetLevelDelay {
        store: Arc::clone(&store),
        in_reset_during_wait: Vec::new(),
    };
    let bank = DacBus::new(
        SimulatedDacBank::new(),
        PinMock::new(&[]),
        BoardEnables {
            osc_en: PinMock::new(&[]),
            mmcx_sel: PinMock::new(&[]),
            refclk_sel: PinMock::new(&[]),
        },
        NoopDelay::new(),
    );
    let mut shuttler = Shuttler::new(link, bank, delay, AwgResetLine::new(Arc::clone(&store)));

    shuttler.reset_awg().unwrap();
    assert!(!store.domain_reset());

    let (_, bank, delay, _) = shuttler.release();
    assert_eq!(delay.in_reset_during_wait, vec![true]);
    let (_, mut reset, mut board, _) = bank.release();
    reset.done();
    board.osc_en.done();
    board.mmcx_sel.done();
    board.refclk_sel.done();
}
