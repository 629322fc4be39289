//! Bounded retry with an authentication fallback.
//!
//! Each submission walks `QueryAuth -> BearerAuth -> Exhausted`. The bearer
//! step is only taken after a 401 under query-parameter auth, and only when
//! the caller allows it.

use std::time::Duration;

/// How many times to try and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Backoff before attempt number `attempt` (0-based): none, then 1x, 2x, 4x...
    #[must_use]
    pub fn delay_before(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 {
            return None;
        }
        let factor = 1u32.checked_shl(attempt - 1).unwrap_or(u32::MAX);
        Some(self.base_delay.saturating_mul(factor))
    }
}

/// Authentication mode for the next request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// API key passed as `?key=`
    QueryAuth,
    /// `Authorization: Bearer` header
    BearerAuth,
    /// No attempts left
    Exhausted,
}

/// What came back from one attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Status(u16),
    TransportError,
}

/// What to do after an attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Succeeded,
    /// Try again in the machine's current state
    Retry,
    /// Non-retryable failure
    Abort,
    /// Attempt budget used up
    Exhausted,
}

/// Per-submission retry state
#[derive(Debug, Clone)]
pub struct RetryMachine {
    policy: RetryPolicy,
    state: AuthState,
    attempts: u32,
    bearer_fallback: bool,
}

impl RetryMachine {
    #[must_use]
    pub fn new(policy: RetryPolicy, bearer_fallback: bool) -> Self {
        Self {
            policy,
            state: AuthState::QueryAuth,
            attempts: 0,
            bearer_fallback,
        }
    }

    #[must_use]
    pub fn state(&self) -> AuthState {
        self.state
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.policy.max_attempts
    }

    /// Wait to apply before the next attempt
    #[must_use]
    pub fn next_delay(&self) -> Option<Duration> {
        self.policy.delay_before(self.attempts)
    }

    /// Record the outcome of the attempt just made
    pub fn record(&mut self, outcome: AttemptOutcome) -> Transition {
        self.attempts += 1;

        match outcome {
            AttemptOutcome::Status(status) if (200..300).contains(&status) => {
                return Transition::Succeeded;
            }
            AttemptOutcome::Status(401)
                if self.bearer_fallback && self.state == AuthState::QueryAuth =>
            {
                self.state = AuthState::BearerAuth;
            }
            AttemptOutcome::Status(status) if (400..500).contains(&status) => {
                return Transition::Abort;
            }
            AttemptOutcome::Status(_) | AttemptOutcome::TransportError => {}
        }

        if self.attempts >= self.policy.max_attempts {
            self.state = AuthState::Exhausted;
            Transition::Exhausted
        } else {
            Transition::Retry
        }
    }
}
