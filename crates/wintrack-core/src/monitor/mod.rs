use async_trait::async_trait;
use std::time::Duration;

pub mod hyprland;

pub use hyprland::{HyprlandSource, HyprlandWindow};

/// The application and window title that currently hold focus
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FocusedWindow {
    pub app_class: String,
    pub title: String,
}

impl FocusedWindow {
    #[must_use]
    pub fn new(app_class: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            app_class: app_class.into(),
            title: title.into(),
        }
    }

    /// Human-readable one-line description
    #[must_use]
    pub fn describe(&self) -> String {
        format_window_output(&self.title, &self.app_class)
    }
}

/// Failure to sample the focused window.
///
/// These are expected while the desktop changes state underneath the query.
#[derive(Debug, thiserror::Error)]
pub enum WindowSourceError {
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{command} did not answer within {timeout:?}")]
    Timeout {
        command: String,
        timeout: Duration,
    },
    #[error("{command} exited with {status}: {stderr}")]
    ExitStatus {
        command: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("failed to parse {command} output: {source}")]
    Parse {
        command: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Capability that reports the currently focused window
#[async_trait]
pub trait WindowSource: Send + Sync {
    /// Sample the focused window
    ///
    /// # Errors
    ///
    /// Returns an error if the compositor could not be queried or its answer
    /// could not be understood
    async fn query(&self) -> Result<FocusedWindow, WindowSourceError>;

    /// Short name used in log messages
    fn name(&self) -> &'static str;
}

/// Format a window for display
#[must_use]
pub fn format_window_output(window_name: &str, window_class: &str) -> String {
    if window_class.is_empty() {
        format!("Active Window: {window_name}")
    } else {
        format!("Active Window: {window_name} ({window_class})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_with_class() {
        assert_eq!(
            format_window_output("README.md - nvim", "kitty"),
            "Active Window: README.md - nvim (kitty)"
        );
    }

    #[test]
    fn test_format_without_class() {
        assert_eq!(format_window_output("Desktop", ""), "Active Window: Desktop");
    }

    #[test]
    fn test_describe_uses_title_then_class() {
        let window = FocusedWindow::new("firefox", "Docs");
        assert_eq!(window.describe(), "Active Window: Docs (firefox)");
    }
}
