use chrono::{DateTime, Utc};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Source of time for the tracker.
///
/// Wall-clock readings stamp sessions, monotonic readings measure them, so a
/// wall-clock jump never produces a negative duration.
pub trait Clock: Send + Sync {
    /// Current wall-clock time
    fn now(&self) -> DateTime<Utc>;

    /// Current monotonic instant
    fn instant(&self) -> Instant;
}

/// Clock backed by the operating system
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn instant(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
///
/// Wall and monotonic readings advance together, which keeps duration
/// arithmetic exact in tests.
#[derive(Debug)]
pub struct ManualClock {
    wall_origin: DateTime<Utc>,
    instant_origin: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    #[must_use]
    pub fn new(wall_origin: DateTime<Utc>) -> Self {
        Self {
            wall_origin,
            instant_origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(PoisonError::into_inner);
        *offset += by;
    }

    fn offset(&self) -> Duration {
        *self.offset.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.wall_origin + to_chrono(self.offset())
    }

    fn instant(&self) -> Instant {
        self.instant_origin + self.offset()
    }
}

/// Convert a std duration, saturating at the chrono maximum
#[must_use]
pub fn to_chrono(duration: Duration) -> chrono::Duration {
    chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_manual_clock_advances_both_readings() {
        let origin = Utc.with_ymd_and_hms(2025, 9, 30, 12, 0, 0).unwrap();
        let clock = ManualClock::new(origin);
        let start = clock.instant();

        clock.advance(Duration::from_secs(90));

        assert_eq!(clock.now(), origin + chrono::Duration::seconds(90));
        assert_eq!(clock.instant() - start, Duration::from_secs(90));
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock;
        let first = clock.instant();
        let second = clock.instant();
        assert!(second >= first);
    }
}
