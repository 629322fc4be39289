use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

use crate::aggregator::{self, ActiveSample};
use crate::clock::{to_chrono, Clock, SystemClock};
use crate::config::TrackerConfig;
use crate::merge_policy::{MergeDecision, MergePolicy};
use crate::session::{ActivitySession, ActivitySummary};

/// The open session together with the monotonic instant it started at
#[derive(Debug)]
struct OpenSession {
    session: ActivitySession,
    started: Instant,
}

#[derive(Debug, Default)]
struct TrackerState {
    current: Option<OpenSession>,
    /// Ordered by close time
    sessions: Vec<ActivitySession>,
}

/// Turns focus changes into closed, merged sessions.
///
/// All operations take `&self` and are safe to call from several threads.
/// Mutations hold the write lock, summary queries the read lock.
pub struct ActivityTracker {
    state: RwLock<TrackerState>,
    policy: MergePolicy,
    clock: Arc<dyn Clock>,
}

impl Default for ActivityTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ActivityTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityTracker")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl ActivityTracker {
    /// Create a tracker with default thresholds
    ///
    /// Defaults:
    /// - Merge threshold: 30 seconds
    /// - Minimum duration: 10 seconds
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(TrackerConfig::default(), Arc::new(SystemClock))
    }

    /// Create a tracker with custom thresholds and clock
    #[must_use]
    pub fn with_config(config: TrackerConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: RwLock::new(TrackerState::default()),
            policy: MergePolicy::from(&config),
            clock,
        }
    }

    /// Close the active session, if any, and open a new one
    pub fn start_session(&self, app_class: impl Into<String>, window_title: impl Into<String>) {
        let mut state = self.write();
        self.close_current(&mut state);

        state.current = Some(OpenSession {
            session: ActivitySession::open(app_class, window_title, self.clock.now()),
            started: self.clock.instant(),
        });
    }

    /// Close the active session. No-op when nothing is active.
    pub fn end_current_session(&self) {
        let mut state = self.write();
        self.close_current(&mut state);
    }

    /// Per-application rollup of everything observed so far.
    ///
    /// An open session contributes its elapsed time without being closed or
    /// stored.
    #[must_use]
    pub fn activity_summaries(&self) -> HashMap<String, ActivitySummary> {
        let state = self.read();

        // Read while the lock is held so a concurrent close cannot interleave.
        let sample = state.current.as_ref().map(|open| ActiveSample {
            app_class: &open.session.app_class,
            window_title: &open.session.window_title,
            start_time: open.session.start_time,
            elapsed: to_chrono(self.clock.instant().saturating_duration_since(open.started)),
            now: self.clock.now(),
        });

        aggregator::summarize(&state.sessions, sample.as_ref())
    }

    /// Drop every stored session. The active session is left running.
    pub fn clear_completed_sessions(&self) {
        let mut state = self.write();
        let cleared = std::mem::take(&mut state.sessions).len();
        log::debug!("Cleared {cleared} completed sessions");
    }

    /// Snapshot of the stored sessions
    #[must_use]
    pub fn completed_sessions(&self) -> Vec<ActivitySession> {
        self.read().sessions.clone()
    }

    /// Snapshot of the active session
    #[must_use]
    pub fn current_session(&self) -> Option<ActivitySession> {
        self.read().current.as_ref().map(|open| open.session.clone())
    }

    fn close_current(&self, state: &mut TrackerState) {
        let Some(OpenSession {
            mut session,
            started,
        }) = state.current.take()
        else {
            return;
        };

        session.close(to_chrono(
            self.clock.instant().saturating_duration_since(started),
        ));

        let app_class = session.app_class.clone();
        let duration = session.duration;
        match self.policy.apply(session, &mut state.sessions) {
            MergeDecision::Discard => {
                log::debug!("Discarded short session: {app_class} ({}s)", duration.num_seconds());
            }
            MergeDecision::Merge => log::debug!("Merged session into previous: {app_class}"),
            MergeDecision::Append => {
                log::debug!("Stored session: {app_class} ({}s)", duration.num_seconds());
            }
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, TrackerState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, TrackerState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests;
