//! RescueTime integration: activity upload and account activation.

pub mod activation;
pub mod client;
pub mod payload;
pub mod retry;

pub use activation::{parse_activation_response, ActivationKeys};
pub use client::RescueTimeClient;
pub use payload::{LegacyPayload, UserClientEvent, UserClientEventPayload};
pub use retry::{AttemptOutcome, AuthState, RetryMachine, RetryPolicy, Transition};

/// Credentials passed explicitly to the client
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RescueTimeCredentials {
    pub api_key: String,
    pub account_key: Option<String>,
    pub data_key: Option<String>,
}

impl RescueTimeCredentials {
    /// Build credentials, treating empty optional keys as absent
    #[must_use]
    pub fn new(
        api_key: impl Into<String>,
        account_key: Option<String>,
        data_key: Option<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            account_key: account_key.filter(|k| !k.trim().is_empty()),
            data_key: data_key.filter(|k| !k.trim().is_empty()),
        }
    }

    /// Whether the native event API can be attempted
    #[must_use]
    pub fn has_native(&self) -> bool {
        self.account_key.is_some() || self.data_key.is_some()
    }

    /// Key for query-parameter auth on the native API
    #[must_use]
    pub fn query_key(&self) -> &str {
        self.account_key.as_deref().unwrap_or(&self.api_key)
    }

    /// Token for bearer auth on the native API
    #[must_use]
    pub fn bearer_token(&self) -> &str {
        self.data_key.as_deref().unwrap_or(&self.api_key)
    }
}

/// Service URLs, overridable for self-hosted proxies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RescueTimeEndpoints {
    pub legacy: String,
    pub native: String,
    pub activate: String,
}

impl Default for RescueTimeEndpoints {
    fn default() -> Self {
        Self {
            legacy: "https://www.rescuetime.com/anapi/offline_time_post".to_string(),
            native: "https://api.rescuetime.com/api/resource/user_client_events".to_string(),
            activate: "https://api.rescuetime.com/activate".to_string(),
        }
    }
}
