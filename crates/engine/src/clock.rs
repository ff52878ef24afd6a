//! Round clock - periodic ticks on a tokio interval.
//!
//! The interval runs in its own task and forwards tick numbers over a small channel.
//! [`RoundClock::stop`] aborts the task and drops the receiver, so ticks that were already
//! buffered are discarded too.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use honeycomb_core::types::TICK_PERIOD_MS;

const TICK_BUFFER: usize = 8;

/// Default tick period (one elapsed-time unit)
pub fn default_period() -> Duration {
    Duration::from_millis(TICK_PERIOD_MS)
}

/// Cancellable periodic tick source
///
/// Must be started inside a tokio runtime.
#[derive(Debug)]
pub struct RoundClock {
    period: Duration,
    handle: Option<JoinHandle<()>>,
    rx: Option<mpsc::Receiver<u64>>,
}

impl RoundClock {
    /// Start ticking; the first tick arrives one `period` from now
    pub fn start(period: Duration) -> Self {
        let (tx, rx) = mpsc::channel(TICK_BUFFER);
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut n = 0u64;
            loop {
                interval.tick().await;
                n += 1;
                if tx.send(n).await.is_err() {
                    break;
                }
            }
        });
        tracing::trace!(period_ms = period.as_millis() as u64, "round clock started");
        Self {
            period,
            handle: Some(handle),
            rx: Some(rx),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Wait for the next tick number; `None` once stopped
    pub async fn tick(&mut self) -> Option<u64> {
        match self.rx.as_mut() {
            Some(rx) => rx.recv().await,
            None => None,
        }
    }

    /// Cancel the clock. Idempotent.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::trace!("round clock stopped");
        }
        self.rx = None;
    }
}

impl Drop for RoundClock {
    fn drop(&mut self) {
        self.stop();
    }
}
