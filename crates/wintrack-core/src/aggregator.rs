//! Folds sessions into per-application summaries.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

use crate::session::{ActivitySession, ActivitySummary};

/// Elapsed time of the session that is still open, measured at query time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSample<'a> {
    pub app_class: &'a str,
    pub window_title: &'a str,
    pub start_time: DateTime<Utc>,
    pub elapsed: Duration,
    pub now: DateTime<Utc>,
}

/// Summarize closed sessions plus an optional in-progress sample.
///
/// When two sessions of one app end at the same instant, the one stored later
/// supplies the activity details.
#[must_use]
pub fn summarize(
    sessions: &[ActivitySession],
    active: Option<&ActiveSample<'_>>,
) -> HashMap<String, ActivitySummary> {
    let mut summaries: HashMap<String, ActivitySummary> = HashMap::new();

    for session in sessions {
        fold_closed(&mut summaries, session);
    }

    if let Some(sample) = active {
        fold_active(&mut summaries, sample);
    }

    summaries
}

fn fold_closed(summaries: &mut HashMap<String, ActivitySummary>, session: &ActivitySession) {
    let end = session.end_or_start();
    let summary = summaries
        .entry(session.app_class.clone())
        .or_insert_with(|| ActivitySummary {
            app_class: session.app_class.clone(),
            activity_details: session.window_title.clone(),
            total_duration: Duration::zero(),
            session_count: 0,
            first_seen: session.start_time,
            last_seen: end,
        });

    summary.total_duration += session.duration;
    summary.session_count += 1;

    if session.start_time < summary.first_seen {
        summary.first_seen = session.start_time;
    }
    if end >= summary.last_seen {
        summary.last_seen = end;
        summary.activity_details.clone_from(&session.window_title);
    }
}

fn fold_active(summaries: &mut HashMap<String, ActivitySummary>, sample: &ActiveSample<'_>) {
    let summary = summaries
        .entry(sample.app_class.to_string())
        .or_insert_with(|| ActivitySummary {
            app_class: sample.app_class.to_string(),
            activity_details: sample.window_title.to_string(),
            total_duration: Duration::zero(),
            session_count: 0,
            first_seen: sample.start_time,
            last_seen: sample.now,
        });

    summary.total_duration += sample.elapsed;
    summary.session_count += 1;
    summary.first_seen = summary.first_seen.min(sample.start_time);
    summary.activity_details = sample.window_title.to_string();
    summary.last_seen = sample.now;
}
