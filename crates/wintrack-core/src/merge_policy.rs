use chrono::Duration;

use crate::config::TrackerConfig;
use crate::session::ActivitySession;

/// What happened to a session when it was closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeDecision {
    /// Shorter than the minimum duration, dropped
    Discard,
    /// Folded into the last stored session
    Merge,
    /// Stored as a new entry
    Append,
}

/// Decides whether a closed session extends the previous one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergePolicy {
    pub merge_threshold: Duration,
    pub min_duration: Duration,
}

impl Default for MergePolicy {
    fn default() -> Self {
        Self::from(&TrackerConfig::default())
    }
}

impl From<&TrackerConfig> for MergePolicy {
    fn from(config: &TrackerConfig) -> Self {
        Self {
            merge_threshold: config.merge_threshold,
            min_duration: config.min_duration,
        }
    }
}

impl MergePolicy {
    /// Classify a closed candidate against the last stored session.
    ///
    /// The minimum duration filter runs first: a short candidate is dropped
    /// even when it could have been merged.
    #[must_use]
    pub fn decide(
        &self,
        candidate: &ActivitySession,
        last: Option<&ActivitySession>,
    ) -> MergeDecision {
        if candidate.duration < self.min_duration {
            return MergeDecision::Discard;
        }

        match last {
            Some(last) if self.can_extend(last, candidate) => MergeDecision::Merge,
            _ => MergeDecision::Append,
        }
    }

    /// Apply the decision for `candidate` to the stored sequence
    pub fn apply(
        &self,
        candidate: ActivitySession,
        sessions: &mut Vec<ActivitySession>,
    ) -> MergeDecision {
        let decision = self.decide(&candidate, sessions.last());

        match decision {
            MergeDecision::Discard => {}
            MergeDecision::Merge => {
                if let Some(last) = sessions.last_mut() {
                    extend(last, &candidate);
                }
            }
            MergeDecision::Append => sessions.push(candidate),
        }

        decision
    }

    // Overlapping (negative) gaps still merge.
    fn can_extend(&self, last: &ActivitySession, candidate: &ActivitySession) -> bool {
        if last.app_class != candidate.app_class {
            return false;
        }
        let gap = candidate.start_time - last.end_or_start();
        gap <= self.merge_threshold
    }
}

fn extend(last: &mut ActivitySession, candidate: &ActivitySession) {
    let end = candidate.end_or_start();
    last.end_time = Some(end);
    last.duration = end - last.start_time;
    last.window_title.clone_from(&candidate.window_title);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 30, 12, 0, 0).unwrap() + Duration::seconds(secs)
    }

    fn closed(app: &str, title: &str, start: i64, end: i64) -> ActivitySession {
        let mut session = ActivitySession::open(app, title, at(start));
        session.close(Duration::seconds(end - start));
        session
    }

    #[test]
    fn test_short_candidate_is_discarded() {
        let policy = MergePolicy::default();
        let candidate = closed("kitty", "nvim", 0, 9);
        assert_eq!(policy.decide(&candidate, None), MergeDecision::Discard);
    }

    #[test]
    fn test_min_duration_filter_beats_merge() {
        let policy = MergePolicy::default();
        let last = closed("kitty", "nvim", 0, 60);
        let candidate = closed("kitty", "shell", 61, 65);
        assert_eq!(policy.decide(&candidate, Some(&last)), MergeDecision::Discard);
    }

    #[test]
    fn test_exact_min_duration_is_kept() {
        let policy = MergePolicy::default();
        let candidate = closed("kitty", "nvim", 0, 10);
        assert_eq!(policy.decide(&candidate, None), MergeDecision::Append);
    }

    #[test]
    fn test_same_app_within_threshold_merges() {
        let policy = MergePolicy::default();
        let last = closed("kitty", "nvim", 0, 60);
        let candidate = closed("kitty", "shell", 90, 120);
        assert_eq!(policy.decide(&candidate, Some(&last)), MergeDecision::Merge);
    }

    #[test]
    fn test_gap_beyond_threshold_appends() {
        let policy = MergePolicy::default();
        let last = closed("kitty", "nvim", 0, 60);
        let candidate = closed("kitty", "shell", 91, 120);
        assert_eq!(policy.decide(&candidate, Some(&last)), MergeDecision::Append);
    }

    #[test]
    fn test_different_app_appends() {
        let policy = MergePolicy::default();
        let last = closed("kitty", "nvim", 0, 60);
        let candidate = closed("firefox", "docs", 60, 120);
        assert_eq!(policy.decide(&candidate, Some(&last)), MergeDecision::Append);
    }

    #[test]
    fn test_overlapping_gap_merges() {
        let policy = MergePolicy::default();
        let last = closed("kitty", "nvim", 0, 60);
        let candidate = closed("kitty", "shell", 50, 80);
        assert_eq!(policy.decide(&candidate, Some(&last)), MergeDecision::Merge);
    }

    #[test]
    fn test_apply_merge_extends_last_and_takes_title() {
        let policy = MergePolicy::default();
        let mut sessions = vec![closed("kitty", "nvim", 0, 60)];

        let decision = policy.apply(closed("kitty", "shell", 70, 100), &mut sessions);

        assert_eq!(decision, MergeDecision::Merge);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].start_time, at(0));
        assert_eq!(sessions[0].end_time, Some(at(100)));
        assert_eq!(sessions[0].duration, Duration::seconds(100));
        assert_eq!(sessions[0].window_title, "shell");
    }

    #[test]
    fn test_apply_discard_leaves_sequence_untouched() {
        let policy = MergePolicy::default();
        let mut sessions = vec![closed("kitty", "nvim", 0, 60)];
        let before = sessions.clone();

        policy.apply(closed("kitty", "shell", 61, 62), &mut sessions);

        assert_eq!(sessions, before);
    }
}
