//! Hardware abstraction layer for the Shuttler AWG front-end
//!
//! This crate provides the trait seams between the AWG core and whatever
//! actually moves bits: a real-time I/O core on hardware, or in-process
//! simulations on the host.
//!
//! # Architecture Layers
//!
//! ```text
//! Control facade (shuttler crate)
//!         ↓
//! Core (playback: codec + sample store + engine, dac: bus driver)
//!         ↓
//! Platform HAL (this crate - trait abstractions)
//!         ↓
//! RTIO link / SPI master gateware, or host simulation
//! ```
//!
//! # Abstractions
//!
//! - [`SpiMaster`] - configurable SPI master with chip-select masks and
//!   half-duplex input mode (the DAC configuration bus)
//! - [`RtioLink`] - the real-time command link carrying sample words
//! - [`config`] - timing constants and [`TimingConfig`]
//! - [`types`] - range-checked newtypes ([`DacIndex`])
//!
//! Digital lines and delays use `embedded_hal::digital::OutputPin` and
//! `embedded_hal::delay::DelayNs` directly.
//!
//! # Features
//!
//! - `defmt`: Enable `defmt::Format` derives on plain-data types

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Pedantic lints suppressed for this hardware HAL crate:
#![allow(clippy::doc_markdown)] // hex addresses and register names in doc comments
#![allow(clippy::must_use_candidate)] // plain accessors
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod peripheral;
pub mod rtio;
pub mod types;

pub use config::{TimingConfig, DAC_COUNT};
pub use peripheral::{SpiConfig, SpiFlags, SpiMaster};
pub use rtio::RtioLink;
pub use types::{DacIndex, OutOfRangeError};
