//! Request pacing

use std::time::{Duration, Instant};

/// Default minimum time between the starts of two file downloads.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Keeps file downloads at least `interval` apart.
///
/// After a download that took `t`, the pacer sleeps `interval - t`, so
/// slow downloads are not delayed further.
#[derive(Debug, Clone)]
pub struct Pacer {
    interval: Duration,
}

impl Pacer {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Sleep out the remainder of the interval for a request begun at `started`.
    ///
    /// Returns how long it slept.
    pub fn pause_after(&self, started: Instant) -> Duration {
        let remaining = self.interval.saturating_sub(started.elapsed());
        if !remaining.is_zero() {
            tracing::trace!(?remaining, "pacing");
            std::thread::sleep(remaining);
        }
        remaining
    }
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}
