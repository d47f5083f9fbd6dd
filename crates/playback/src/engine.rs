//! Playback state machine.
//!
//! `PlaybackEngine` is the output-domain half of an AWG channel. Each call to
//! [`PlaybackEngine::tick`] is one output clock edge: it reads the channel's
//! enable level, fetches at most one slot from the [`SampleStore`] and
//! produces the [`OutputFrame`] the eight DAC lanes see on that edge.
//!
//! It has **no** notion of wall-clock time. A virtual clock calls `tick()` in
//! a loop (see [`PlaybackEngine::run`]); the real-time driver lives in
//! [`crate::clock`].

use std::sync::Arc;

use platform::DAC_COUNT;

use crate::codec::N_SAMPLES;
use crate::sample_store::{SampleStore, IDLE_CODE};

/// Current playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Enable is low (or the output domain is in reset); output is [`IDLE_CODE`].
    Idle,
    /// Enable is high; the read pointer advances one slot per tick.
    Running,
}

/// Values a double-data-rate output takes on the rising and falling edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DdrPair {
    /// Level driven on the rising edge.
    pub rising: bool,
    /// Level driven on the falling edge.
    pub falling: bool,
}

impl DdrPair {
    /// Forwarded clock pattern: low on the rising edge, high on the falling.
    pub const FORWARDED_CLOCK: Self = Self {
        rising: false,
        falling: true,
    };
}

/// Everything the output domain drives on one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputFrame {
    /// 14-bit code presented to every DAC lane.
    pub code: u16,
    /// Clock-forwarded test point.
    pub test_point: DdrPair,
    /// DAC data clock.
    pub data_clock: DdrPair,
}

impl OutputFrame {
    fn with_code(code: u16) -> Self {
        Self {
            code,
            test_point: DdrPair::FORWARDED_CLOCK,
            data_clock: DdrPair::FORWARDED_CLOCK,
        }
    }

    /// Per-lane codes. All lanes carry the same sample.
    pub fn lanes(&self) -> [u16; DAC_COUNT] {
        [self.code; DAC_COUNT]
    }
}

/// Output-domain playback of one channel's [`SampleStore`].
pub struct PlaybackEngine {
    store: Arc<SampleStore>,
    read_pointer: usize,
    state: PlaybackState,
    seen_epoch: u32,
    ticks: u64,
}

impl PlaybackEngine {
    /// Create an idle engine reading from `store`.
    pub fn new(store: Arc<SampleStore>) -> Self {
        let seen_epoch = store.enable_epoch();
        Self {
            store,
            read_pointer: 0,
            state: PlaybackState::Idle,
            seen_epoch,
            ticks: 0,
        }
    }

    /// Advance one output clock tick.
    ///
    /// - disabled, or output domain in reset: emit [`IDLE_CODE`], pointer := 0;
    /// - first tick that observes enable (or a new enable epoch): pointer := 0
    ///   and emit slot 0 on this same tick;
    /// - otherwise emit the slot under the pointer and advance it mod
    ///   [`N_SAMPLES`].
    pub fn tick(&mut self) -> OutputFrame {
        self.ticks = self.ticks.wrapping_add(1);

        // enable is loaded before the epoch: the writer bumps the epoch before
        // publishing enable, so a new enable level always comes with its epoch.
        let enabled = self.store.is_enabled() && !self.store.domain_reset();
        let epoch = self.store.enable_epoch();

        if !enabled {
            if self.state == PlaybackState::Running {
                tracing::debug!(
                    tick = self.ticks,
                    pointer = self.read_pointer,
                    "playback disabled"
                );
            }
            self.state = PlaybackState::Idle;
            self.read_pointer = 0;
            return OutputFrame::with_code(IDLE_CODE);
        }

        if self.state == PlaybackState::Idle || epoch != self.seen_epoch {
            tracing::debug!(tick = self.ticks, epoch, "playback started from slot 0");
            self.state = PlaybackState::Running;
            self.read_pointer = 0;
        }
        self.seen_epoch = epoch;

        let code = self.store.sample(self.read_pointer).unwrap_or(IDLE_CODE);
        #[allow(clippy::arithmetic_side_effects)] // N_SAMPLES is a non-zero constant
        let next = self.read_pointer.wrapping_add(1) % N_SAMPLES;
        self.read_pointer = next;
        OutputFrame::with_code(code)
    }

    /// Run `n` ticks back to back and collect the frames.
    pub fn run(&mut self, n: usize) -> Vec<OutputFrame> {
        (0..n).map(|_| self.tick()).collect()
    }

    /// Return the current [`PlaybackState`].
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Slot the next running tick will emit.
    pub fn read_pointer(&self) -> usize {
        self.read_pointer
    }

    /// Ticks processed since construction (wrapping).
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// The store this engine plays from.
    pub fn store(&self) -> &Arc<SampleStore> {
        &self.store
    }
}

impl core::fmt::Debug for PlaybackEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PlaybackEngine")
            .field("state", &self.state)
            .field("read_pointer", &self.read_pointer)
            .field("ticks", &self.ticks)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap
)]
mod tests {
    use super::*;
    use crate::codec::encode;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn ramp_store() -> Arc<SampleStore> {
        let store = Arc::new(SampleStore::new());
        for address in 0..N_SAMPLES as u32 {
            store.apply(encode(address, address as i32, false));
        }
        store
    }

    fn codes(frames: &[OutputFrame]) -> Vec<u16> {
        frames.iter().map(|f| f.code).collect()
    }

    #[test]
    fn engine_starts_idle() {
        let mut engine = PlaybackEngine::new(Arc::new(SampleStore::new()));
        assert_eq!(engine.state(), PlaybackState::Idle);
        assert_eq!(engine.tick().code, IDLE_CODE);
        assert_eq!(engine.read_pointer(), 0);
    }

    #[test]
    fn enabled_playback_repeats_with_period_1024() {
        let store = ramp_store();
        let mut engine = PlaybackEngine::new(Arc::clone(&store));
        store.apply(encode(0, 0, true));

        let frames = engine.run(2 * N_SAMPLES);
        let expected: Vec<u16> = (0..N_SAMPLES as u16).chain(0..N_SAMPLES as u16).collect();
        assert_eq!(codes(&frames), expected);
        assert_eq!(engine.state(), PlaybackState::Running);
    }

    #[test]
    fn disable_outputs_idle_on_the_same_tick() {
        init_tracing();
        let store = ramp_store();
        let mut engine = PlaybackEngine::new(Arc::clone(&store));
        store.apply(encode(0, 0, true));
        engine.run(300);
        assert_eq!(engine.read_pointer(), 300);

        store.apply(encode(0, 0, false));
        let frame = engine.tick();
        assert_eq!(frame.code, IDLE_CODE);
        assert_eq!(engine.state(), PlaybackState::Idle);
        assert_eq!(engine.read_pointer(), 0);
    }

    #[test]
    fn re_enable_restarts_from_slot_0() {
        init_tracing();
        let store = ramp_store();
        let mut engine = PlaybackEngine::new(Arc::clone(&store));
        store.apply(encode(5, 5, true));
        engine.run(17);
        store.apply(encode(5, 5, false));
        engine.tick();
        store.apply(encode(5, 5, true));

        assert_eq!(codes(&engine.run(3)), vec![0, 1, 2]);
    }

    #[test]
    fn toggle_between_ticks_still_restarts() {
        init_tracing();
        let store = ramp_store();
        let mut engine = PlaybackEngine::new(Arc::clone(&store));
        store.apply(encode(0, 0, true));
        engine.run(40);

        // The engine never observes the low level, only the new epoch.
        store.apply(encode(1, 1, false));
        store.apply(encode(1, 1, true));
        assert_eq!(engine.tick().code, 0);
        assert_eq!(engine.tick().code, 1);
    }

    #[test]
    fn domain_reset_holds_output_idle() {
        init_tracing();
        let store = ramp_store();
        let mut engine = PlaybackEngine::new(Arc::clone(&store));
        store.apply(encode(0, 0, true));
        engine.run(10);

        store.set_domain_reset(true);
        assert!(engine.run(5).iter().all(|f| f.code == IDLE_CODE));
        assert_eq!(engine.state(), PlaybackState::Idle);

        store.set_domain_reset(false);
        assert_eq!(engine.tick().code, 0);
    }

    #[test]
    fn frames_carry_forwarded_clock_and_identical_lanes() {
        let store = ramp_store();
        let mut engine = PlaybackEngine::new(Arc::clone(&store));
        store.apply(encode(0, 0, true));
        engine.tick();
        let frame = engine.tick();
        assert_eq!(frame.test_point, DdrPair { rising: false, falling: true });
        assert_eq!(frame.data_clock, DdrPair::FORWARDED_CLOCK);
        assert_eq!(frame.lanes(), [1; DAC_COUNT]);
    }
}
