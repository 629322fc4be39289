use chrono::{Local, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use wintrack_core::ActivitySummary;

/// Body of the legacy `offline_time_post` endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyPayload {
    /// `YYYY-MM-DD HH:MM:SS`
    pub start_time: String,
    /// Whole minutes, rounded up
    pub duration: i64,
    pub activity_name: String,
    pub activity_details: String,
}

impl LegacyPayload {
    /// Build the payload with the start stamp in local time
    #[must_use]
    pub fn from_summary(summary: &ActivitySummary) -> Self {
        Self::from_summary_in(summary, &Local)
    }

    /// Build the payload with the start stamp rendered in `tz`
    #[must_use]
    pub fn from_summary_in<Tz>(summary: &ActivitySummary, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        Self {
            start_time: summary
                .first_seen
                .with_timezone(tz)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            duration: summary.duration_minutes_ceil(),
            activity_name: summary.app_class.clone(),
            activity_details: summary.activity_details.clone(),
        }
    }
}

/// Body of the native `user_client_events` endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClientEventPayload {
    pub user_client_event: UserClientEvent,
}

/// A single tracked interval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClientEvent {
    pub event_description: String,
    /// RFC 3339, UTC
    pub start_time: String,
    /// RFC 3339, UTC
    pub end_time: String,
    pub window_title: String,
    /// Same as `event_description`
    pub application: String,
}

impl UserClientEventPayload {
    #[must_use]
    pub fn from_summary(summary: &ActivitySummary) -> Self {
        let start = summary.first_seen.with_timezone(&Utc);
        let end = summary.end_time().with_timezone(&Utc);

        Self {
            user_client_event: UserClientEvent {
                event_description: summary.app_class.clone(),
                start_time: start.to_rfc3339_opts(SecondsFormat::Secs, true),
                end_time: end.to_rfc3339_opts(SecondsFormat::Secs, true),
                window_title: summary.activity_details.clone(),
                application: summary.app_class.clone(),
            },
        }
    }
}
