//! Shuttler AWG control facade
//!
//! Ties the pieces together for an experiment:
//!
//! ```text
//! Shuttler ──write_sample / set_enable──▶ RtioLink ──▶ SampleStore ──▶ PlaybackEngine
//!     │
//!     └──initialize_dac_bank / get_dac_timing_status──▶ DacBank (AD9117 × 8)
//! ```
//!
//! [`link::LocalLink`] and [`link::AwgResetLine`] run the whole data path in
//! process, which is how the tests and the `simulated_bring_up` demo use it.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod control;
pub mod error;
pub mod link;

pub use control::{BankState, Shuttler, MAX_CHANNELS};
pub use error::ShuttlerError;
pub use link::{AwgResetLine, LinkError, LocalLink};
