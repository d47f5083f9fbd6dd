//! Per-channel sample buffer shared by the write and output clock domains.
//!
//! `SampleStore` is written by exactly one actor (the link's write process,
//! one command word at a time) and read by exactly one actor (the playback
//! engine, one slot per output tick). There is no lock between them:
//!
//! - every slot is its own `AtomicU16`, so a read racing a write to the same
//!   slot sees either the old or the new code, never a mix of the two;
//! - slot stores are `Release` and slot loads are `Acquire`;
//! - the enable level is published after the slot write of the same word, so
//!   a playback tick that sees the new enable level also sees that sample.
//!
//! A read may be stale by one output tick. That is accepted.

use core::sync::atomic::{AtomicBool, AtomicU16, AtomicU32, Ordering};

use crate::codec::{decode, CommandWord, SampleCommand, N_SAMPLES};

/// Idle output code, emitted while playback is disabled.
pub const IDLE_CODE: u16 = 0;

/// Sample buffer, enable flag and domain-reset level of one AWG channel.
pub struct SampleStore {
    slots: Box<[AtomicU16]>,
    enable: AtomicBool,
    /// Bumped on every disabled → enabled transition, before `enable` is set.
    enable_epoch: AtomicU32,
    domain_reset: AtomicBool,
}

impl SampleStore {
    /// Create a store with every slot at [`IDLE_CODE`] and playback disabled.
    pub fn new() -> Self {
        Self {
            slots: (0..N_SAMPLES).map(|_| AtomicU16::new(IDLE_CODE)).collect(),
            enable: AtomicBool::new(false),
            enable_epoch: AtomicU32::new(0),
            domain_reset: AtomicBool::new(false),
        }
    }

    /// Write process: apply one command word.
    ///
    /// Stores the value into its slot, then the enable level. Must only be
    /// called from the write domain (one caller at a time).
    pub fn apply(&self, word: CommandWord) -> SampleCommand {
        let cmd = decode(word);
        if let Some(slot) = self.slots.get(usize::from(cmd.address)) {
            slot.store(cmd.value, Ordering::Release);
        }
        if cmd.enable && !self.enable.load(Ordering::Relaxed) {
            self.enable_epoch.fetch_add(1, Ordering::Release);
        }
        self.enable.store(cmd.enable, Ordering::Release);
        cmd
    }

    /// Current code of slot `address`, or `None` outside `[0, N_SAMPLES)`.
    pub fn sample(&self, address: usize) -> Option<u16> {
        self.slots.get(address).map(|slot| slot.load(Ordering::Acquire))
    }

    /// Copy of the whole buffer, in address order.
    pub fn snapshot(&self) -> Vec<u16> {
        self.slots
            .iter()
            .map(|slot| slot.load(Ordering::Acquire))
            .collect()
    }

    /// Enable level last written on the link.
    pub fn is_enabled(&self) -> bool {
        self.enable.load(Ordering::Acquire)
    }

    /// Number of disabled → enabled transitions seen so far (wrapping).
    pub fn enable_epoch(&self) -> u32 {
        self.enable_epoch.load(Ordering::Acquire)
    }

    /// Drive the output-domain reset level.
    pub fn set_domain_reset(&self, asserted: bool) {
        self.domain_reset.store(asserted, Ordering::Release);
    }

    /// `true` while the output-domain reset is asserted.
    pub fn domain_reset(&self) -> bool {
        self.domain_reset.load(Ordering::Acquire)
    }

    /// Number of slots (always [`N_SAMPLES`]).
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl Default for SampleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for SampleStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SampleStore")
            .field("enable", &self.is_enabled())
            .field("enable_epoch", &self.enable_epoch())
            .field("domain_reset", &self.domain_reset())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;
    use crate::codec::encode;

    #[test]
    fn new_store_is_idle_and_zeroed() {
        let store = SampleStore::new();
        assert_eq!(store.len(), N_SAMPLES);
        assert!(!store.is_enabled());
        assert!(store.snapshot().iter().all(|&code| code == IDLE_CODE));
    }

    #[test]
    fn apply_writes_slot_and_enable() {
        let store = SampleStore::new();
        let cmd = store.apply(encode(1023, 0x155, true));
        assert_eq!(cmd.address, 1023);
        assert_eq!(store.sample(1023), Some(0x155));
        assert!(store.is_enabled());
    }

    #[test]
    fn every_word_overwrites_enable() {
        let store = SampleStore::new();
        store.apply(encode(0, 1, true));
        store.apply(encode(1, 2, false));
        assert!(!store.is_enabled());
        assert_eq!(store.sample(0), Some(1));
        assert_eq!(store.sample(1), Some(2));
    }

    #[test]
    fn epoch_counts_rising_edges_only() {
        let store = SampleStore::new();
        store.apply(encode(0, 0, true));
        store.apply(encode(0, 0, true));
        assert_eq!(store.enable_epoch(), 1);
        store.apply(encode(0, 0, false));
        assert_eq!(store.enable_epoch(), 1);
        store.apply(encode(0, 0, true));
        assert_eq!(store.enable_epoch(), 2);
    }

    #[test]
    fn sample_out_of_range_is_none() {
        let store = SampleStore::new();
        assert_eq!(store.sample(N_SAMPLES), None);
    }

    #[test]
    fn concurrent_reader_never_sees_foreign_codes() {
        // Writer alternates every slot between two codes; the reader must only
        // ever observe one of them (or the initial idle code).
        const A: u16 = 0x2AAA;
        const B: u16 = 0x1555;
        let store = SampleStore::new();
        std::thread::scope(|s| {
            s.spawn(|| {
                for round in 0..64 {
                    let code = if round % 2 == 0 { A } else { B };
                    for address in 0..N_SAMPLES as u32 {
                        store.apply(encode(address, i32::from(code), true));
                    }
                }
            });
            s.spawn(|| {
                for _ in 0..64 {
                    for code in store.snapshot() {
                        assert!(
                            code == A || code == B || code == IDLE_CODE,
                            "torn read: {code:#x}"
                        );
                    }
                }
            });
        });
    }
}
