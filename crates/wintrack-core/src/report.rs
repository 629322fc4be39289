//! Human-readable rendering of summaries and submission results.

use chrono::Duration;
use std::collections::HashMap;
use std::fmt::Write;

use crate::session::ActivitySummary;
use crate::upload::SubmissionReport;

/// Render a duration rounded to whole seconds, e.g. `1h2m5s`, `35s`, `0s`
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    // Round half up to the nearest second.
    let total = (duration.num_milliseconds().max(0) + 500) / 1000;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}s")
    } else {
        format!("{seconds}s")
    }
}

/// Summaries ordered by descending total, then by app name
#[must_use]
pub fn sorted_summaries(summaries: &HashMap<String, ActivitySummary>) -> Vec<&ActivitySummary> {
    let mut ordered: Vec<&ActivitySummary> = summaries.values().collect();
    ordered.sort_by(|a, b| {
        b.total_duration
            .cmp(&a.total_duration)
            .then_with(|| a.app_class.cmp(&b.app_class))
    });
    ordered
}

/// The block printed when the monitor shuts down
#[must_use]
pub fn format_activity_summary(summaries: &HashMap<String, ActivitySummary>) -> String {
    let mut out = String::from("\n=== Activity Summary ===\n");

    if summaries.is_empty() {
        out.push_str("No activities tracked.\n");
        return out;
    }

    let total_time = summaries
        .values()
        .fold(Duration::zero(), |acc, s| acc + s.total_duration);
    let _ = writeln!(out, "Total tracking time: {}\n", format_duration(total_time));

    for summary in sorted_summaries(summaries) {
        let percentage = percentage_of(summary.total_duration, total_time);
        let _ = writeln!(
            out,
            "{}: {} ({percentage:.1}%) - {} sessions",
            summary.app_class,
            format_duration(summary.total_duration),
            summary.session_count
        );
        let _ = writeln!(out, "  \u{2514}\u{2500} {}\n", summary.activity_details);
    }

    out
}

/// The block printed after an upload cycle
#[must_use]
pub fn format_submission_report(service: &str, report: &SubmissionReport) -> String {
    let mut out = format!("\n=== {service} Submission Summary ===\n");
    let _ = writeln!(
        out,
        "Total succeeded: {}, failed: {}, skipped: {}",
        report.succeeded, report.failed, report.skipped
    );
    if report.fallbacks > 0 {
        let _ = writeln!(out, "Fallback successes: {}", report.fallbacks);
    }
    for (app_class, error) in &report.errors {
        let _ = writeln!(out, "  failed {app_class}: {error}");
    }
    out
}

#[allow(clippy::cast_precision_loss)]
fn percentage_of(part: Duration, total: Duration) -> f64 {
    let total_ms = total.num_milliseconds();
    if total_ms <= 0 {
        return 0.0;
    }
    part.num_milliseconds() as f64 / total_ms as f64 * 100.0
}
