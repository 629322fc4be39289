use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use wintrack_core::{ActivitySummary, SubmissionReport, Uploader};

use super::activation::{parse_activation_response, ActivationKeys};
use super::payload::{LegacyPayload, UserClientEventPayload};
use super::retry::{AttemptOutcome, AuthState, RetryMachine, RetryPolicy, Transition};
use super::{RescueTimeCredentials, RescueTimeEndpoints};
use crate::error::UploadError;
use crate::http::{HttpRequest, HttpResponse, ReqwestTransport, Transport};

const USER_AGENT: &str = "RescueTime/2.16.5.1 (Linux)";

/// RescueTime API client
pub struct RescueTimeClient {
    transport: Arc<dyn Transport>,
    credentials: RescueTimeCredentials,
    endpoints: RescueTimeEndpoints,
    retry: RetryPolicy,
    min_duration: chrono::Duration,
}

impl RescueTimeClient {
    /// Create a client over the default HTTP transport
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created
    pub fn new(credentials: RescueTimeCredentials) -> Result<Self, UploadError> {
        let transport = ReqwestTransport::new(Duration::from_secs(10))?;
        Ok(Self::with_transport(Arc::new(transport), credentials))
    }

    #[must_use]
    pub fn with_transport(transport: Arc<dyn Transport>, credentials: RescueTimeCredentials) -> Self {
        Self {
            transport,
            credentials,
            endpoints: RescueTimeEndpoints::default(),
            retry: RetryPolicy::default(),
            min_duration: chrono::Duration::minutes(1),
        }
    }

    #[must_use]
    pub fn with_endpoints(mut self, endpoints: RescueTimeEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Summaries shorter than this are not uploaded
    #[must_use]
    pub fn with_min_duration(mut self, min_duration: chrono::Duration) -> Self {
        self.min_duration = min_duration;
        self
    }

    /// Submit one summary through the legacy offline-time API
    ///
    /// # Errors
    ///
    /// Returns an error on a non-retryable rejection or once retries run out
    pub async fn submit_legacy(&self, payload: &LegacyPayload) -> Result<(), UploadError> {
        let mut machine = RetryMachine::new(self.retry, false);

        self.drive(&mut machine, |_| {
            Ok(HttpRequest::post_json(&self.endpoints.legacy, payload)?
                .query("key", &self.credentials.api_key)
                .header("Content-Type", "application/json"))
        })
        .await?;

        log::info!(
            "Submitted to RescueTime: {} ({} min)",
            payload.activity_name,
            payload.duration
        );
        Ok(())
    }

    /// Submit one summary through the native event API.
    ///
    /// Returns the auth mode that was accepted.
    ///
    /// # Errors
    ///
    /// Returns an error on a non-retryable rejection or once retries run out
    pub async fn submit_native(
        &self,
        payload: &UserClientEventPayload,
    ) -> Result<AuthState, UploadError> {
        let mut machine = RetryMachine::new(self.retry, true);

        let accepted = self
            .drive(&mut machine, |state| self.native_request(state, payload))
            .await?;

        let event = &payload.user_client_event;
        log::info!(
            "Submitted to RescueTime via {}: {} ({} to {})",
            match accepted {
                AuthState::BearerAuth => "Bearer token",
                _ => "query parameter",
            },
            event.application,
            event.start_time,
            event.end_time
        );
        Ok(accepted)
    }

    /// Submit one summary, native first when possible.
    ///
    /// Returns `true` when the legacy fallback was needed.
    ///
    /// # Errors
    ///
    /// Returns the legacy error if every route failed
    pub async fn submit_summary(&self, summary: &ActivitySummary) -> Result<bool, UploadError> {
        if !self.credentials.has_native() {
            self.submit_legacy(&LegacyPayload::from_summary(summary)).await?;
            return Ok(false);
        }

        log::debug!("Trying native API for {}", summary.app_class);
        match self
            .submit_native(&UserClientEventPayload::from_summary(summary))
            .await
        {
            Ok(_) => Ok(false),
            Err(e) => {
                log::warn!("Native API failed for {}: {e}", summary.app_class);
                log::info!("Attempting legacy API for {}", summary.app_class);
                self.submit_legacy(&LegacyPayload::from_summary(summary)).await?;
                Ok(true)
            }
        }
    }

    /// Exchange account credentials for API keys
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service refuses the login
    pub async fn activate(&self, email: &str, password: &str) -> Result<ActivationKeys, UploadError> {
        let request = HttpRequest::post_form(
            &self.endpoints.activate,
            &[("username", email), ("password", password)],
        )
        .header("User-Agent", USER_AGENT);

        let response = self.transport.send(request).await?.ensure_success()?;
        parse_activation_response(&response.body)
    }

    fn native_request(
        &self,
        state: AuthState,
        payload: &UserClientEventPayload,
    ) -> Result<HttpRequest, UploadError> {
        let request = HttpRequest::post_json(&self.endpoints.native, payload)?
            .header("Content-Type", "application/json; charset=utf-8")
            .header("User-Agent", USER_AGENT);

        Ok(match state {
            AuthState::BearerAuth | AuthState::Exhausted => {
                let bearer = format!("Bearer {}", self.credentials.bearer_token());
                let request = request.header("Authorization", &bearer);
                match &self.credentials.account_key {
                    Some(account_key) => request.query("key", account_key),
                    None => request,
                }
            }
            AuthState::QueryAuth => request.query("key", self.credentials.query_key()),
        })
    }

    /// Send requests built by `build` until the machine says stop
    async fn drive<F>(&self, machine: &mut RetryMachine, build: F) -> Result<AuthState, UploadError>
    where
        F: Fn(AuthState) -> Result<HttpRequest, UploadError> + Send + Sync,
    {
        loop {
            if let Some(delay) = machine.next_delay() {
                log::info!(
                    "Retrying in {delay:?}... (attempt {}/{})",
                    machine.attempts() + 1,
                    machine.max_attempts()
                );
                tokio::time::sleep(delay).await;
            }

            let state = machine.state();
            let request = build(state)?;
            let result = self
                .transport
                .send(request)
                .await
                .and_then(HttpResponse::ensure_success);
            let outcome = match &result {
                Ok(response) => AttemptOutcome::Status(response.status),
                Err(e) => e
                    .status()
                    .map_or(AttemptOutcome::TransportError, AttemptOutcome::Status),
            };

            let transition = machine.record(outcome);
            let error = match result {
                Ok(_) => return Ok(state),
                Err(e) => e,
            };
            log::debug!("Attempt {} failed: {error}", machine.attempts());

            match transition {
                Transition::Abort => return Err(error),
                Transition::Exhausted => {
                    return Err(UploadError::Exhausted {
                        attempts: machine.attempts(),
                        last: Box::new(error),
                    });
                }
                Transition::Retry | Transition::Succeeded => {
                    if machine.state() != state {
                        log::info!("Query parameter auth failed (401), trying Bearer token authentication");
                    }
                }
            }
        }
    }
}

#[async_trait]
impl Uploader for RescueTimeClient {
    async fn submit(&self, summaries: &HashMap<String, ActivitySummary>) -> SubmissionReport {
        let mut report = SubmissionReport::new(summaries.len());

        if self.credentials.has_native() {
            log::info!("Native API credentials detected, will try native API first with legacy fallback");
        } else {
            log::info!("Using legacy offline time API (no native credentials found)");
        }
        log::info!("Submitting {} activities to RescueTime", summaries.len());

        let mut ordered: Vec<&ActivitySummary> = summaries.values().collect();
        ordered.sort_by(|a, b| a.app_class.cmp(&b.app_class));

        for summary in ordered {
            if summary.total_duration < self.min_duration {
                log::debug!("Skipping short activity {}", summary.app_class);
                report.record_skip();
                continue;
            }

            match self.submit_summary(summary).await {
                Ok(used_fallback) => report.record_success(used_fallback),
                Err(e) => report.record_failure(summary.app_class.clone(), e.to_string()),
            }
        }

        report
    }

    fn service_name(&self) -> &'static str {
        "RescueTime"
    }
}
