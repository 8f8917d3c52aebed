//! Pacing policies for sequential remote calls.
//!
//! The hosted model enforces a request-rate ceiling, so the orchestrator
//! waits between consecutive calls. [`FixedDelay`] of one second is the
//! default.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::contract::Pacer;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Sleeps for the same interval on every pause.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(pub Duration);

impl Default for FixedDelay {
    fn default() -> Self {
        FixedDelay(DEFAULT_INTERVAL)
    }
}

#[async_trait]
impl Pacer for FixedDelay {
    async fn pause(&self) {
        tokio::time::sleep(self.0).await;
    }
}

/// Keeps at least `interval` between the ends of consecutive pauses; only the
/// remainder is slept when the caller was already slow.
#[derive(Debug)]
pub struct MinInterval {
    interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl MinInterval {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Mutex::new(None),
        }
    }
}

#[async_trait]
impl Pacer for MinInterval {
    async fn pause(&self) {
        let mut last = self.last.lock().await;
        let wait = match *last {
            Some(previous) => self.interval.saturating_sub(previous.elapsed()),
            None => self.interval,
        };
        tokio::time::sleep(wait).await;
        *last = Some(Instant::now());
    }
}

/// Pacing policy chosen through configuration.
#[derive(Debug)]
pub enum Pacing {
    Fixed(FixedDelay),
    MinInterval(MinInterval),
}

impl Default for Pacing {
    fn default() -> Self {
        Pacing::Fixed(FixedDelay::default())
    }
}

#[async_trait]
impl Pacer for Pacing {
    async fn pause(&self) {
        match self {
            Pacing::Fixed(p) => p.pause().await,
            Pacing::MinInterval(p) => p.pause().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Timer deadlines round to the millisecond.
    fn assert_close(actual: Duration, expected: Duration) {
        assert!(
            actual >= expected && actual < expected + Duration::from_millis(2),
            "expected ~{expected:?}, got {actual:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn fixed_delay_sleeps_full_interval() {
        let start = Instant::now();
        FixedDelay::default().pause().await;
        assert_close(start.elapsed(), DEFAULT_INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn min_interval_only_sleeps_the_remainder() {
        let pacer = MinInterval::new(Duration::from_millis(1000));
        pacer.pause().await;

        tokio::time::advance(Duration::from_millis(600)).await;
        let start = Instant::now();
        pacer.pause().await;
        assert_close(start.elapsed(), Duration::from_millis(400));

        tokio::time::advance(Duration::from_millis(1500)).await;
        let start = Instant::now();
        pacer.pause().await;
        assert_close(start.elapsed(), Duration::ZERO);
    }
}
