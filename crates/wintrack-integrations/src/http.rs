//! HTTP plumbing for API integrations.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use crate::error::UploadError;

/// Request body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Json(Vec<u8>),
    Form(Vec<(String, String)>),
}

/// A POST request, independent of the HTTP client that sends it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Body,
}

impl HttpRequest {
    /// POST a JSON-encoded body
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be serialized
    pub fn post_json<B: Serialize>(url: impl Into<String>, body: &B) -> Result<Self, UploadError> {
        Ok(Self {
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: Body::Json(serde_json::to_vec(body)?),
        })
    }

    /// POST a form-encoded body
    #[must_use]
    pub fn post_form(url: impl Into<String>, fields: &[(&str, &str)]) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: Body::Form(
                fields
                    .iter()
                    .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                    .collect(),
            ),
        }
    }

    #[must_use]
    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Value of the first header called `name` (case-insensitive)
    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Value of the first query parameter called `key`
    #[must_use]
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Status and body of a completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx response into an error carrying status and body
    ///
    /// # Errors
    ///
    /// Returns an error if the status is not successful
    pub fn ensure_success(self) -> Result<Self, UploadError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(UploadError::Status {
                status: self.status,
                body: self.body,
            })
        }
    }
}

/// Sends requests. Implemented over reqwest in production.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and read the full response
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be sent or the body could
    /// not be read; HTTP error statuses are returned as responses
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, UploadError>;
}

/// Transport backed by `reqwest`
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport whose requests time out after `timeout`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created
    pub fn new(timeout: Duration) -> Result<Self, UploadError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, UploadError> {
        log::debug!("POST {}", request.url);

        let mut builder = self.client.post(&request.url).query(&request.query);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match request.body {
            Body::Json(bytes) => builder.body(bytes),
            Body::Form(fields) => builder.form(&fields),
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        Ok(HttpResponse { status, body })
    }
}
