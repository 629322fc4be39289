use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tokio::process::Command;

use super::{FocusedWindow, WindowSource, WindowSourceError};

/// Workspace entry of `hyprctl activewindow -j`
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HyprlandWorkspace {
    pub id: i64,
    pub name: String,
}

/// JSON returned by `hyprctl activewindow -j`
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct HyprlandWindow {
    pub address: String,
    pub mapped: bool,
    pub hidden: bool,
    pub at: [i32; 2],
    pub size: [i32; 2],
    pub workspace: HyprlandWorkspace,
    pub floating: bool,
    pub pseudo: bool,
    pub monitor: i64,
    pub class: String,
    pub title: String,
    pub initial_class: String,
    pub initial_title: String,
    pub pid: i64,
    pub xwayland: bool,
    pub pinned: bool,
    pub fullscreen: i64,
}

impl HyprlandWindow {
    /// Decode the JSON printed by `hyprctl activewindow -j`
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a JSON window object
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    #[must_use]
    pub fn focused(&self) -> FocusedWindow {
        FocusedWindow::new(self.class.clone(), self.title.clone())
    }
}

/// Window source backed by the Hyprland compositor
#[derive(Debug, Clone)]
pub struct HyprlandSource {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl HyprlandSource {
    pub const PROGRAM: &'static str = "hyprctl";

    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self::with_command(Self::PROGRAM, ["activewindow", "-j"], timeout)
    }

    /// Use a different command that prints the same JSON
    #[must_use]
    pub fn with_command<I, S>(program: impl Into<String>, args: I, timeout: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            timeout,
        }
    }

    /// Fetch and decode the full window record
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned, times out, exits
    /// unsuccessfully, or prints something that is not a window object
    pub async fn active_window(&self) -> Result<HyprlandWindow, WindowSourceError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, output)
            .await
            .map_err(|_| WindowSourceError::Timeout {
                command: self.program.clone(),
                timeout: self.timeout,
            })?
            .map_err(|source| WindowSourceError::Spawn {
                command: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(WindowSourceError::ExitStatus {
                command: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        HyprlandWindow::from_json(&output.stdout).map_err(|source| WindowSourceError::Parse {
            command: self.program.clone(),
            source,
        })
    }
}

#[async_trait]
impl WindowSource for HyprlandSource {
    async fn query(&self) -> Result<FocusedWindow, WindowSourceError> {
        Ok(self.active_window().await?.focused())
    }

    fn name(&self) -> &'static str {
        "hyprland"
    }
}
