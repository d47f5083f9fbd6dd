//! Real-time output clock.
//!
//! Drives a [`PlaybackEngine`] from a fixed-rate `tokio` interval in its own
//! task. Late ticks are delivered in a burst, so the number of emitted frames
//! always matches the number of elapsed periods.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::engine::{OutputFrame, PlaybackEngine};

/// Consumer of output frames (the DAC lanes, a capture buffer, a scope).
pub trait FrameSink: Send + 'static {
    /// Receive the frame for one tick.
    fn emit(&mut self, frame: OutputFrame);
}

impl<F> FrameSink for F
where
    F: FnMut(OutputFrame) + Send + 'static,
{
    fn emit(&mut self, frame: OutputFrame) {
        self(frame);
    }
}

/// A running output clock task.
#[derive(Debug)]
pub struct OutputClock {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<PlaybackEngine>,
}

impl OutputClock {
    /// Spawn a task that ticks `engine` every `period` and hands each frame to
    /// `sink`. Must be called from within a tokio runtime.
    pub fn spawn<S: FrameSink>(mut engine: PlaybackEngine, period: Duration, mut sink: S) -> Self {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            let start = Instant::now();
            let mut timer = interval_at(start.checked_add(period).unwrap_or(start), period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Burst);
            tracing::debug!(period_ns = period.as_nanos(), "output clock started");

            loop {
                tokio::select! {
                    changed = stop_rx.changed() => {
                        // A dropped sender also stops the clock.
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                    _ = timer.tick() => {
                        sink.emit(engine.tick());
                    }
                }
            }

            tracing::debug!(ticks = engine.ticks(), "output clock stopped");
            engine
        });
        Self { stop_tx, task }
    }

    /// Stop the clock and take the engine back.
    ///
    /// Returns `None` if the clock task panicked (for instance inside the
    /// sink).
    pub async fn stop(self) -> Option<PlaybackEngine> {
        // The receiver only disappears once the task has finished.
        let _ = self.stop_tx.send(true);
        match self.task.await {
            Ok(engine) => Some(engine),
            Err(e) => {
                tracing::error!("output clock task failed: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
    clippy::cast_possible_wrap
)]
mod tests {
    use super::*;
    use crate::codec::encode;
    use crate::engine::PlaybackState;
    use crate::sample_store::SampleStore;
    use std::sync::{Arc, Mutex};

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn clock_ticks_engine_until_stopped() {
        init_tracing();
        let store = Arc::new(SampleStore::new());
        for address in 0..4u32 {
            store.apply(encode(address, 10 + address as i32, true));
        }
        let captured = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let captured = Arc::clone(&captured);
            move |frame: OutputFrame| captured.lock().unwrap().push(frame.code)
        };

        let clock = OutputClock::spawn(
            PlaybackEngine::new(Arc::clone(&store)),
            Duration::from_micros(200),
            sink,
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
        let engine = clock.stop().await.unwrap();

        let codes = captured.lock().unwrap().clone();
        assert!(
            codes.len() >= 4,
            "expected several ticks, got {}",
            codes.len()
        );
        assert_eq!(&codes[..4], &[10, 11, 12, 13]);
        assert_eq!(engine.state(), PlaybackState::Running);
        assert_eq!(engine.ticks(), codes.len() as u64);
    }
}
