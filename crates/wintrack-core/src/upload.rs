use async_trait::async_trait;
use std::collections::HashMap;

use crate::session::ActivitySummary;

/// Outcome of handing a batch of summaries to an uploader
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Summaries below the uploader's minimum duration
    pub skipped: usize,
    /// Successes that needed the uploader's fallback path
    pub fallbacks: usize,
    /// `(app_class, message)` for every failed summary
    pub errors: Vec<(String, String)>,
}

impl SubmissionReport {
    /// Create a new report for `total` summaries
    #[must_use]
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    /// Record a successful submission
    pub fn record_success(&mut self, used_fallback: bool) {
        self.succeeded += 1;
        if used_fallback {
            self.fallbacks += 1;
        }
    }

    /// Record a failed submission
    pub fn record_failure(&mut self, app_class: impl Into<String>, error: impl Into<String>) {
        self.failed += 1;
        self.errors.push((app_class.into(), error.into()));
    }

    pub fn record_skip(&mut self) {
        self.skipped += 1;
    }

    /// Check if every attempted summary went through
    #[must_use]
    pub fn is_complete_success(&self) -> bool {
        self.failed == 0
    }
}

/// Capability that exports summaries to a remote service
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Submit every summary and report per-item results.
    ///
    /// Failures are reported, never raised: the caller decides what to do
    /// with the batch regardless of outcome.
    async fn submit(&self, summaries: &HashMap<String, ActivitySummary>) -> SubmissionReport;

    /// Get the service name
    fn service_name(&self) -> &'static str;
}
