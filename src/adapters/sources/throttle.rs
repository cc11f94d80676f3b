//! Per-source request throttle.
//!
//! Enforces a minimum interval between consecutive requests to one external
//! source. When a request arrives too early it waits for the remainder of
//! the interval plus a random jitter. Callers queue strictly one after
//! another, so a source's lookups can spend far longer waiting here than on
//! the wire.

use rand::Rng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::debug;

#[derive(Debug)]
pub struct RequestThrottle {
    min_interval: Duration,
    jitter_min: Duration,
    jitter_max: Duration,
    /// Start of the previous request. Held across the wait so callers
    /// queue up behind each other.
    last_request: Mutex<Option<Instant>>,
    queued: AtomicUsize,
}

/// Counts a caller as queued until it is released or dropped.
struct QueueSlot<'a>(&'a AtomicUsize);

impl<'a> QueueSlot<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::Relaxed);
        Self(counter)
    }
}

impl Drop for QueueSlot<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

impl RequestThrottle {
    pub fn new(min_interval: Duration, jitter_min: Duration, jitter_max: Duration) -> Self {
        let (jitter_min, jitter_max) = if jitter_min <= jitter_max {
            (jitter_min, jitter_max)
        } else {
            (jitter_max, jitter_min)
        };
        Self {
            min_interval,
            jitter_min,
            jitter_max,
            last_request: Mutex::new(None),
            queued: AtomicUsize::new(0),
        }
    }

    /// A throttle that never waits.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO, Duration::ZERO)
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Callers currently waiting for a slot, including the one sleeping
    /// out the interval.
    pub fn queued(&self) -> usize {
        self.queued.load(Ordering::Relaxed)
    }

    /// Waits until the next request may be sent, then records it.
    pub async fn acquire(&self) {
        let slot = QueueSlot::enter(&self.queued);
        let mut last = self.last_request.lock().await;

        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                let delay = self.min_interval - elapsed + self.jitter();
                debug!(
                    delay_ms = delay.as_millis() as u64,
                    queued = self.queued(),
                    "rate limiting source request"
                );
                sleep(delay).await;
            }
        }

        *last = Some(Instant::now());
        drop(slot);
    }

    fn jitter(&self) -> Duration {
        if self.jitter_max.is_zero() || self.jitter_min == self.jitter_max {
            return self.jitter_min;
        }
        let millis = rand::thread_rng()
            .gen_range(self.jitter_min.as_millis() as u64..=self.jitter_max.as_millis() as u64);
        Duration::from_millis(millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn throttle(interval_ms: u64, jitter_min_ms: u64, jitter_max_ms: u64) -> RequestThrottle {
        RequestThrottle::new(
            Duration::from_millis(interval_ms),
            Duration::from_millis(jitter_min_ms),
            Duration::from_millis(jitter_max_ms),
        )
    }

    #[tokio::test]
    async fn first_request_is_not_delayed() {
        let throttle = throttle(1_000, 100, 300);
        let start = Instant::now();
        throttle.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn second_request_waits_interval_plus_jitter() {
        let throttle = throttle(50, 10, 20);
        throttle.acquire().await;
        let start = Instant::now();
        throttle.acquire().await;

        let waited = start.elapsed();
        assert!(waited >= Duration::from_millis(55), "waited {:?}", waited);
        assert!(waited < Duration::from_millis(1_000), "waited {:?}", waited);
    }

    #[tokio::test]
    async fn no_wait_after_interval_has_passed() {
        let throttle = throttle(20, 0, 0);
        throttle.acquire().await;
        sleep(Duration::from_millis(40)).await;

        let start = Instant::now();
        throttle.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(20));
    }

    #[tokio::test]
    async fn disabled_throttle_never_waits() {
        let throttle = RequestThrottle::disabled();
        let start = Instant::now();
        for _ in 0..5 {
            throttle.acquire().await;
        }
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn queued_counts_waiting_callers() {
        let throttle = std::sync::Arc::new(throttle(50, 0, 0));
        throttle.acquire().await;

        let waiters: Vec<_> = (0..3)
            .map(|_| {
                let throttle = throttle.clone();
                tokio::spawn(async move { throttle.acquire().await })
            })
            .collect();
        sleep(Duration::from_millis(10)).await;
        assert_eq!(throttle.queued(), 3);

        for waiter in waiters {
            waiter.await.unwrap();
        }
        assert_eq!(throttle.queued(), 0);
    }

    #[tokio::test]
    async fn cancelled_waiter_leaves_queue() {
        let throttle = throttle(200, 0, 0);
        throttle.acquire().await;

        let result = tokio::time::timeout(Duration::from_millis(20), throttle.acquire()).await;
        assert!(result.is_err());
        assert_eq!(throttle.queued(), 0);
    }

    #[test]
    fn jitter_stays_in_range() {
        let throttle = throttle(0, 100, 300);
        for _ in 0..50 {
            let jitter = throttle.jitter();
            assert!(jitter >= Duration::from_millis(100) && jitter <= Duration::from_millis(300));
        }
    }
}
