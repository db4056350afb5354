use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Time source used by the rate limiter.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Suspends the caller for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Wall-clock time backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Clock that returns immediately and records every requested wait.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    waits: Arc<Mutex<Vec<Duration>>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits requested so far, in order.
    pub fn waits(&self) -> Vec<Duration> {
        self.waits
            .lock()
            .map(|waits| waits.clone())
            .unwrap_or_default()
    }

    /// Sum of all requested waits.
    pub fn total_waited(&self) -> Duration {
        self.waits().iter().sum()
    }
}

#[async_trait]
impl Clock for ManualClock {
    async fn sleep(&self, duration: Duration) {
        if let Ok(mut waits) = self.waits.lock() {
            waits.push(duration);
        }
    }
}

/// Fixed-interval throttle applied after every registry lookup attempt.
///
/// The delay is static: it does not react to failures or to the registry's
/// responses.
pub struct RateLimiter<C: Clock> {
    interval: Duration,
    clock: C,
}

impl<C: Clock> RateLimiter<C> {
    pub fn new(interval: Duration, clock: C) -> Self {
        Self { interval, clock }
    }

    /// Blocks the pipeline for the configured interval.
    pub async fn wait(&self) {
        if self.interval.is_zero() {
            return;
        }
        tracing::debug!("Throttling for {:?} before next lookup", self.interval);
        self.clock.sleep(self.interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_manual_clock_records_waits() {
        let clock = ManualClock::new();
        let limiter = RateLimiter::new(Duration::from_secs(20), clock.clone());

        limiter.wait().await;
        limiter.wait().await;

        assert_eq!(
            clock.waits(),
            vec![Duration::from_secs(20), Duration::from_secs(20)]
        );
        assert_eq!(clock.total_waited(), Duration::from_secs(40));
    }

    #[tokio::test]
    async fn test_zero_interval_never_sleeps() {
        let clock = ManualClock::new();
        let limiter = RateLimiter::new(Duration::ZERO, clock.clone());

        limiter.wait().await;

        assert!(clock.waits().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_clock_advances_paused_time() {
        let limiter = RateLimiter::new(Duration::from_secs(20), TokioClock);
        let start = tokio::time::Instant::now();

        limiter.wait().await;

        assert!(start.elapsed() >= Duration::from_secs(20));
    }
}
