/// Errors raised while talking to a remote time-tracking service
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("request failed: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Box<UploadError>,
    },
    #[error("failed to encode payload: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("activation failed: {0}")]
    Activation(String),
}

impl UploadError {
    /// HTTP status carried by this error, if any
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Exhausted { last, .. } => last.status(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for UploadError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(Box::new(error))
    }
}
