/// Time source for token issuance and expiry checks.
///
/// Production code uses `SystemClock`. Tests drive a `ManualClock` so that
/// expiry can be exercised without sleeping.

use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
///
/// Cloning shares the underlying instant, so a test can keep one handle and
/// hand the other to the server.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Starts at the current wall-clock time truncated to whole seconds,
    /// matching the resolution of token timestamps.
    pub fn starting_now() -> Self {
        let now = Utc::now();
        let truncated = DateTime::<Utc>::from_timestamp(now.timestamp(), 0).unwrap_or(now);
        Self::new(truncated)
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now = *now + by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advances_shared_handles() {
        let clock = ManualClock::starting_now();
        let other = clock.clone();
        let start = clock.now();

        other.advance(Duration::seconds(90));

        assert_eq!(clock.now() - start, Duration::seconds(90));
    }

    #[test]
    fn test_manual_clock_starts_on_whole_second() {
        let clock = ManualClock::starting_now();
        assert_eq!(clock.now().timestamp_subsec_nanos(), 0);
    }
}
