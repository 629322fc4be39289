//! Environment checks run before any window query.

use anyhow::{bail, Result};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use wintrack_core::monitor::HyprlandSource;

/// Display-related environment, captured once
#[derive(Debug, Clone, Default)]
pub struct DisplayEnv {
    pub wayland_display: Option<String>,
    pub display: Option<String>,
    pub path: Option<std::ffi::OsString>,
}

impl DisplayEnv {
    pub fn from_process() -> Self {
        let non_empty = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());
        Self {
            wayland_display: non_empty("WAYLAND_DISPLAY"),
            display: non_empty("DISPLAY"),
            path: std::env::var_os("PATH"),
        }
    }
}

/// First executable called `program` on the search path
fn find_on_path(program: &str, path: Option<&OsStr>) -> Option<PathBuf> {
    std::env::split_paths(path?)
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Fail unless a graphical session is present and, on Wayland, `hyprctl` is installed
///
/// # Errors
///
/// Returns an error naming the first failed check
pub fn check_environment(env: &DisplayEnv) -> Result<()> {
    if env.wayland_display.is_none() && env.display.is_none() {
        bail!(
            "No graphical display found. Make sure you're running this in a Wayland or X11 environment."
        );
    }

    if env.wayland_display.is_some()
        && find_on_path(HyprlandSource::PROGRAM, env.path.as_deref()).is_none()
    {
        bail!(
            "{} not found. This tool requires Hyprland on Wayland.",
            HyprlandSource::PROGRAM
        );
    }

    Ok(())
}
