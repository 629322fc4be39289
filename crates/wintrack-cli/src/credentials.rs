//! RescueTime keys kept in a `.env` file.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;
use wintrack_integrations::{ActivationKeys, RescueTimeCredentials};

pub const API_KEY: &str = "RESCUE_TIME_API_KEY";
pub const ACCOUNT_KEY: &str = "RESCUE_TIME_ACCOUNT_KEY";
pub const DATA_KEY: &str = "RESCUE_TIME_DATA_KEY";

fn read_env_file(path: &Path) -> Result<BTreeMap<String, String>> {
    let entries = dotenvy::from_path_iter(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut vars = BTreeMap::new();
    for entry in entries {
        let (key, value) =
            entry.with_context(|| format!("Failed to parse {}", path.display()))?;
        vars.insert(key, value);
    }
    Ok(vars)
}

/// Read upload credentials from `path`.
///
/// # Errors
///
/// Returns an error if the file is missing or unreadable, or has no API key
pub fn load_credentials(path: &Path) -> Result<RescueTimeCredentials> {
    let mut vars = read_env_file(path).context("Error loading .env file")?;

    let api_key = vars
        .remove(API_KEY)
        .filter(|key| !key.trim().is_empty())
        .with_context(|| format!("{API_KEY} not found in {}", path.display()))?;

    Ok(RescueTimeCredentials::new(
        api_key,
        vars.remove(ACCOUNT_KEY),
        vars.remove(DATA_KEY),
    ))
}

/// Store activation keys in `path`, keeping every other entry already there
///
/// # Errors
///
/// Returns an error if an existing file cannot be parsed or the file cannot be written
pub fn save_activation(path: &Path, keys: &ActivationKeys) -> Result<()> {
    let mut vars = if path.exists() {
        read_env_file(path)?
    } else {
        BTreeMap::new()
    };

    vars.insert(ACCOUNT_KEY.to_string(), keys.account_key.clone());
    vars.insert(DATA_KEY.to_string(), keys.data_key.clone());

    let mut contents = String::from("# RescueTime API Credentials\n# Generated by wintrack\n\n");
    for (key, value) in &vars {
        let _ = writeln!(contents, "{key}={value}");
    }

    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(account_key: &str) -> ActivationKeys {
        ActivationKeys {
            account_key: account_key.to_string(),
            data_key: String::new(),
            api_url: "api.rescuetime.com".to_string(),
            url: "www.rescuetime.com".to_string(),
        }
    }

    #[test]
    fn test_load_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(
            &path,
            "# keys\nRESCUE_TIME_API_KEY=api\nRESCUE_TIME_ACCOUNT_KEY=acct\nRESCUE_TIME_DATA_KEY=\n",
        )
        .unwrap();

        let creds = load_credentials(&path).unwrap();
        assert_eq!(creds.api_key, "api");
        assert_eq!(creds.account_key.as_deref(), Some("acct"));
        assert_eq!(creds.data_key, None);
    }

    #[test]
    fn test_load_requires_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_credentials(&dir.path().join(".env")).unwrap_err();
        assert!(err.to_string().contains("Error loading .env file"));
    }

    #[test]
    fn test_load_requires_api_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "RESCUE_TIME_ACCOUNT_KEY=acct\n").unwrap();

        let err = load_credentials(&path).unwrap_err();
        assert!(err.to_string().contains(API_KEY));
    }

    #[test]
    fn test_save_preserves_existing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "RESCUE_TIME_API_KEY=api\nRESCUE_TIME_ACCOUNT_KEY=old\n").unwrap();

        save_activation(&path, &keys("new")).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# RescueTime API Credentials\n# Generated by wintrack\n\n"));
        assert_eq!(
            written.lines().skip(3).collect::<Vec<_>>(),
            vec![
                "RESCUE_TIME_ACCOUNT_KEY=new",
                "RESCUE_TIME_API_KEY=api",
                "RESCUE_TIME_DATA_KEY=",
            ]
        );

        let creds = load_credentials(&path).unwrap();
        assert_eq!(creds.api_key, "api");
        assert_eq!(creds.account_key.as_deref(), Some("new"));
    }

    #[test]
    fn test_save_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");

        save_activation(&path, &keys("acct")).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("RESCUE_TIME_ACCOUNT_KEY=acct\n"));
    }
}
