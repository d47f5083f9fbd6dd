//! AWG channel core: link codec, sample store and playback engine
//!
//! One AWG channel is two clock domains sharing a 1024-slot sample buffer:
//!
//! ```text
//! RTIO link ──▶ codec::decode ──▶ SampleStore::apply      (write domain)
//!                                      │
//!                                 SampleStore
//!                                      │
//!              OutputFrame ◀── PlaybackEngine::tick       (output domain)
//! ```
//!
//! The two sides never lock each other; see [`sample_store`] for the
//! visibility guarantees.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod clock;
pub mod codec;
pub mod engine;
pub mod sample_store;

pub use clock::{FrameSink, OutputClock};
pub use codec::{decode, encode, CommandWord, SampleCommand, N_SAMPLES};
pub use engine::{DdrPair, OutputFrame, PlaybackEngine, PlaybackState};
pub use sample_store::{SampleStore, IDLE_CODE};
