//! Bring up a simulated Shuttler board and play a triangle wave.
//!
//! Run with: RUST_LOG=debug cargo run -p shuttler --example simulated_bring_up

#![allow(
    clippy::arithmetic_side_effects,
    clippy::cast_possible_wrap,
    clippy::cast_possible_truncation
)]

use std::convert::Infallible;
use std::error::Error;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dac::{BoardEnables, DacBus, SimulatedDacBank};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};
use playback::{OutputClock, OutputFrame, PlaybackEngine, SampleStore, N_SAMPLES};
use shuttler::{AwgResetLine, LocalLink, Shuttler};

const CHANNEL: u32 = 0;

/// Board line that only logs its level.
struct LoggedPin(&'static str);

impl ErrorType for LoggedPin {
    type Error = Infallible;
}

impl OutputPin for LoggedPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        tracing::info!(line = self.0, "low");
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        tracing::info!(line = self.0, "high");
        Ok(())
    }
}

/// Busy-free delay: the simulation has no real timing to honour.
struct SimDelay;

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let store = Arc::new(SampleStore::new());
    let mut link = LocalLink::new();
    link.register(CHANNEL, Arc::clone(&store))?;

    let bank = DacBus::new(
        SimulatedDacBank::new(),
        LoggedPin("dac_reset"),
        BoardEnables {
            osc_en: LoggedPin("osc_en"),
            mmcx_sel: LoggedPin("mmcx_sel"),
            refclk_sel: LoggedPin("refclk_sel"),
        },
        SimDelay,
    );
    let mut shuttler = Shuttler::new(link, bank, SimDelay, AwgResetLine::new(Arc::clone(&store)));

    shuttler
        .initialize_dac_bank()
        .map_err(|e| format!("bring-up failed: {e}"))?;
    for dac in 0..8 {
        let status = shuttler
            .get_dac_timing_status(dac)
            .map_err(|e| format!("status read failed: {e}"))?;
        tracing::info!(dac, status, "timing status");
    }

    // Triangle wave spanning the full signed 14-bit range.
    let half = N_SAMPLES as i32 / 2;
    let triangle: Vec<i32> = (0..N_SAMPLES as i32)
        .map(|i| {
            let ramp = if i < half { i } else { N_SAMPLES as i32 - i };
            ramp * 16383 / half - 8192
        })
        .collect();
    shuttler
        .write_samples(CHANNEL, &triangle)
        .map_err(|e| format!("sample write failed: {e}"))?;
    shuttler.reset_awg().map_err(|e| format!("AWG reset failed: {e}"))?;

    let peak = Arc::new(Mutex::new((0u64, i16::MIN, i16::MAX)));
    let sink = {
        let peak = Arc::clone(&peak);
        move |frame: OutputFrame| {
            // Sign-extend the 14-bit code for display.
            let value = ((frame.code << 2) as i16) >> 2;
            if let Ok(mut p) = peak.lock() {
                p.0 += 1;
                p.1 = p.1.max(value);
                p.2 = p.2.min(value);
            }
        }
    };
    let clock = OutputClock::spawn(
        PlaybackEngine::new(Arc::clone(&store)),
        Duration::from_micros(10),
        sink,
    );

    shuttler
        .set_enable(CHANNEL, true)
        .map_err(|e| format!("enable failed: {e}"))?;
    tokio::time::sleep(Duration::from_millis(100)).await;
    shuttler
        .set_enable(CHANNEL, false)
        .map_err(|e| format!("disable failed: {e}"))?;

    let engine = clock.stop().await.ok_or("output clock task failed")?;
    if let Ok(p) = peak.lock() {
        tracing::info!(
            frames = p.0,
            max = p.1,
            min = p.2,
            ticks = engine.ticks(),
            "playback finished"
        );
    }
    Ok(())
}
