use chrono::{DateTime, Duration, Utc};

/// A continuous interval of focus on one application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivitySession {
    pub start_time: DateTime<Utc>,
    /// `None` while the session is still open
    pub end_time: Option<DateTime<Utc>>,
    pub app_class: String,
    /// Most recent window title seen for this session
    pub window_title: String,
    /// Finalized when the session closes
    pub duration: Duration,
    pub active: bool,
}

impl ActivitySession {
    /// Open a new session at `start_time`
    #[must_use]
    pub fn open(
        app_class: impl Into<String>,
        window_title: impl Into<String>,
        start_time: DateTime<Utc>,
    ) -> Self {
        Self {
            start_time,
            end_time: None,
            app_class: app_class.into(),
            window_title: window_title.into(),
            duration: Duration::zero(),
            active: true,
        }
    }

    /// Close the session after `elapsed` has passed since it opened.
    ///
    /// The end stamp is derived from the start so `end - start == duration`
    /// holds exactly.
    pub fn close(&mut self, elapsed: Duration) {
        let elapsed = elapsed.max(Duration::zero());
        self.end_time = Some(self.start_time + elapsed);
        self.duration = elapsed;
        self.active = false;
    }

    /// End stamp, falling back to the start for sessions that never closed
    #[must_use]
    pub fn end_or_start(&self) -> DateTime<Utc> {
        self.end_time.unwrap_or(self.start_time)
    }
}

/// Aggregated usage of one application across the observation period
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivitySummary {
    pub app_class: String,
    /// Most recently observed window title
    pub activity_details: String,
    pub total_duration: Duration,
    pub session_count: usize,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl ActivitySummary {
    /// End of the reported interval when it is laid out contiguously from
    /// `first_seen`
    #[must_use]
    pub fn end_time(&self) -> DateTime<Utc> {
        self.first_seen + self.total_duration
    }

    /// Total duration in whole minutes, rounded up
    #[must_use]
    pub fn duration_minutes_ceil(&self) -> i64 {
        let millis = self.total_duration.num_milliseconds().max(0);
        (millis + 59_999) / 60_000
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 30, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_close_sets_end_from_elapsed() {
        let mut session = ActivitySession::open("kitty", "nvim", t0());
        session.close(Duration::seconds(42));

        assert!(!session.active);
        assert_eq!(session.end_time, Some(t0() + Duration::seconds(42)));
        assert_eq!(session.duration, Duration::seconds(42));
    }

    #[test]
    fn test_close_clamps_negative_elapsed() {
        let mut session = ActivitySession::open("kitty", "nvim", t0());
        session.close(Duration::seconds(-5));

        assert_eq!(session.end_time, Some(t0()));
        assert_eq!(session.duration, Duration::zero());
    }

    #[test]
    fn test_duration_minutes_ceil() {
        let mut summary = ActivitySummary {
            app_class: "firefox".to_string(),
            activity_details: "docs".to_string(),
            total_duration: Duration::seconds(60),
            session_count: 1,
            first_seen: t0(),
            last_seen: t0(),
        };
        assert_eq!(summary.duration_minutes_ceil(), 1);

        summary.total_duration = Duration::seconds(61);
        assert_eq!(summary.duration_minutes_ceil(), 2);

        summary.total_duration = Duration::zero();
        assert_eq!(summary.duration_minutes_ceil(), 0);
    }

    #[test]
    fn test_summary_end_time() {
        let summary = ActivitySummary {
            app_class: "firefox".to_string(),
            activity_details: "docs".to_string(),
            total_duration: Duration::minutes(5),
            session_count: 2,
            first_seen: t0(),
            last_seen: t0() + Duration::minutes(30),
        };
        assert_eq!(summary.end_time(), t0() + Duration::minutes(5));
    }
}
