//! Request pacing for rate-limited services.
//!
//! [`RateLimiter`] is a leaky bucket with a capacity of one request: each
//! [`RateLimiter::acquire`] waits until at least `min_interval` has passed
//! since the previous one. Time comes from an injectable [`Clock`] so the
//! pacing contract can be tested without real sleeps.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;

/// Source of time for the rate limiter.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> Instant;

    /// Suspends for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Wall clock backed by `tokio::time`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Enforces a minimum spacing between requests.
pub struct RateLimiter {
    min_interval: Duration,
    next_allowed: Option<Instant>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Creates a limiter using the wall clock.
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self::with_clock(min_interval, Arc::new(TokioClock))
    }

    /// Creates a limiter using a custom clock.
    #[must_use]
    pub fn with_clock(min_interval: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            min_interval,
            next_allowed: None,
            clock,
        }
    }

    /// Minimum spacing between requests.
    #[must_use]
    pub const fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Waits until a request is allowed, then reserves the slot.
    ///
    /// The first call never waits. Returns how long it waited.
    pub async fn acquire(&mut self) -> Duration {
        let now = self.clock.now();
        let waited = match self.next_allowed {
            Some(next) if next > now => {
                let wait = next - now;
                log::trace!("Rate limiter: waiting {wait:?}");
                self.clock.sleep(wait).await;
                wait
            }
            _ => Duration::ZERO,
        };

        self.next_allowed = Some(self.clock.now() + self.min_interval);
        waited
    }

    /// Pushes the next allowed request out to at least `delay` from now,
    /// e.g. after the service answered HTTP 429.
    pub fn back_off(&mut self, delay: Duration) {
        let until = self.clock.now() + delay;
        self.next_allowed = Some(self.next_allowed.map_or(until, |next| next.max(until)));
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Clock whose time only moves when slept on or advanced.
    pub struct ManualClock {
        start: Instant,
        elapsed: Mutex<Duration>,
        sleeps: Mutex<Vec<Duration>>,
    }

    impl ManualClock {
        pub fn new() -> Self {
            Self {
                start: Instant::now(),
                elapsed: Mutex::new(Duration::ZERO),
                sleeps: Mutex::new(Vec::new()),
            }
        }

        pub fn advance(&self, by: Duration) {
            *self.elapsed.lock().unwrap() += by;
        }

        pub fn sleeps(&self) -> Vec<Duration> {
            self.sleeps.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            self.start + *self.elapsed.lock().unwrap()
        }

        async fn sleep(&self, duration: Duration) {
            self.sleeps.lock().unwrap().push(duration);
            self.advance(duration);
        }
    }

    #[tokio::test]
    async fn first_acquire_does_not_wait() {
        let clock = Arc::new(ManualClock::new());
        let mut limiter = RateLimiter::with_clock(Duration::from_secs(1), clock.clone());

        assert_eq!(limiter.acquire().await, Duration::ZERO);
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn back_to_back_acquires_are_spaced() {
        let clock = Arc::new(ManualClock::new());
        let mut limiter = RateLimiter::with_clock(Duration::from_secs(1), clock.clone());

        limiter.acquire().await;
        assert_eq!(limiter.acquire().await, Duration::from_secs(1));
        assert_eq!(limiter.acquire().await, Duration::from_secs(1));
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(1); 2]);
    }

    #[tokio::test]
    async fn elapsed_time_counts_toward_spacing() {
        let clock = Arc::new(ManualClock::new());
        let mut limiter = RateLimiter::with_clock(Duration::from_millis(1000), clock.clone());

        limiter.acquire().await;
        clock.advance(Duration::from_millis(400));
        assert_eq!(limiter.acquire().await, Duration::from_millis(600));

        clock.advance(Duration::from_secs(5));
        assert_eq!(limiter.acquire().await, Duration::ZERO);
    }

    #[tokio::test]
    async fn back_off_delays_next_acquire() {
        let clock = Arc::new(ManualClock::new());
        let mut limiter = RateLimiter::with_clock(Duration::from_secs(1), clock.clone());

        limiter.acquire().await;
        limiter.back_off(Duration::from_secs(60));
        assert_eq!(limiter.acquire().await, Duration::from_secs(60));
    }
}
