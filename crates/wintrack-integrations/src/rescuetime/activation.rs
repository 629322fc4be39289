use crate::error::UploadError;

/// Keys handed out by the `/activate` endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationKeys {
    pub account_key: String,
    /// Not returned by `/activate`; stays empty until obtained elsewhere
    pub data_key: String,
    pub api_url: String,
    pub url: String,
}

/// Parse the line-oriented `/activate` response.
///
/// A successful body looks like `c:\n- 0\n- RT:ok\naccount_key: ...`.
///
/// # Errors
///
/// Returns an error if the body reports `RT:error` or carries no account key
pub fn parse_activation_response(body: &str) -> Result<ActivationKeys, UploadError> {
    if body.contains("RT:error") {
        return Err(UploadError::Activation(body.trim().to_string()));
    }

    let account_key = body
        .lines()
        .find_map(|line| line.strip_prefix("account_key:"))
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .ok_or_else(|| {
            UploadError::Activation(format!("no account_key in response: {}", body.trim()))
        })?;

    Ok(ActivationKeys {
        account_key: account_key.to_string(),
        data_key: String::new(),
        api_url: "api.rescuetime.com".to_string(),
        url: "www.rescuetime.com".to_string(),
    })
}
