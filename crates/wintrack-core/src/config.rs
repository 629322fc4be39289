use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Get the configuration directory for wintrack.
///
/// # Errors
///
/// Returns an error if the user configuration directory cannot be determined.
pub fn get_config_dir() -> Result<PathBuf> {
    let mut path =
        dirs::config_dir().ok_or_else(|| anyhow::anyhow!("Failed to get config dir"))?;
    path.push("wintrack");
    Ok(path)
}

/// Longest accepted poll interval
pub const MAX_POLL_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Longest accepted interval between uploads
pub const MAX_SUBMISSION_INTERVAL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Session bookkeeping thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Largest gap between two same-app sessions that still merges them
    pub merge_threshold: chrono::Duration,
    /// Shortest closed session worth keeping
    pub min_duration: chrono::Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            merge_threshold: chrono::Duration::seconds(30),
            min_duration: chrono::Duration::seconds(10),
        }
    }
}

/// Poll loop timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
    pub poll_interval: Duration,
    pub submission_interval: Duration,
    /// Whether the periodic upload timer runs at all
    pub submit: bool,
    /// Upper bound on a single window-source query
    pub query_timeout: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(200),
            submission_interval: Duration::from_secs(15 * 60),
            submit: false,
            query_timeout: Duration::from_secs(2),
        }
    }
}

/// Optional on-disk settings (`config.toml`).
///
/// Every key may be omitted; missing keys keep their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub poll_interval_ms: Option<u64>,
    pub submission_interval_secs: Option<u64>,
    pub merge_threshold_secs: Option<i64>,
    pub min_duration_secs: Option<i64>,
    pub query_timeout_ms: Option<u64>,
    pub min_submit_secs: Option<i64>,
}

impl Settings {
    /// Default settings file location
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration directory cannot be determined
    pub fn default_path() -> Result<PathBuf> {
        Ok(get_config_dir()?.join("config.toml"))
    }

    /// Load settings from `path`, returning defaults when the file is absent
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("Invalid settings file {}", path.display()))
    }

    /// Parse settings from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid settings TOML
    pub fn parse(raw: &str) -> Result<Self> {
        let settings: Self = toml::from_str(raw)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("merge_threshold_secs", self.merge_threshold_secs),
            ("min_duration_secs", self.min_duration_secs),
            ("min_submit_secs", self.min_submit_secs),
        ] {
            if let Some(secs) = value {
                if secs < 0 || chrono::Duration::try_seconds(secs).is_none() {
                    bail!("{key} = {secs} is out of range");
                }
            }
        }

        if let Some(ms) = self.poll_interval_ms {
            if Duration::from_millis(ms) > MAX_POLL_INTERVAL {
                bail!("poll_interval_ms = {ms} exceeds {MAX_POLL_INTERVAL:?}");
            }
        }
        if let Some(secs) = self.submission_interval_secs {
            if Duration::from_secs(secs) > MAX_SUBMISSION_INTERVAL {
                bail!("submission_interval_secs = {secs} exceeds {MAX_SUBMISSION_INTERVAL:?}");
            }
        }

        Ok(())
    }

    #[must_use]
    pub fn tracker_config(&self) -> TrackerConfig {
        let defaults = TrackerConfig::default();
        TrackerConfig {
            merge_threshold: seconds_or(self.merge_threshold_secs, defaults.merge_threshold),
            min_duration: seconds_or(self.min_duration_secs, defaults.min_duration),
        }
    }

    #[must_use]
    pub fn monitor_config(&self) -> MonitorConfig {
        let defaults = MonitorConfig::default();
        MonitorConfig {
            poll_interval: self
                .poll_interval_ms
                .map_or(defaults.poll_interval, Duration::from_millis),
            submission_interval: self
                .submission_interval_secs
                .map_or(defaults.submission_interval, Duration::from_secs),
            submit: defaults.submit,
            query_timeout: self
                .query_timeout_ms
                .map_or(defaults.query_timeout, Duration::from_millis),
        }
    }

    /// Shortest summary worth uploading
    #[must_use]
    pub fn min_submit(&self) -> chrono::Duration {
        seconds_or(self.min_submit_secs, chrono::Duration::minutes(1))
    }
}

fn seconds_or(secs: Option<i64>, default: chrono::Duration) -> chrono::Duration {
    secs.and_then(chrono::Duration::try_seconds)
        .unwrap_or(default)
}
