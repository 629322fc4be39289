//! One-shot query of the focused window

use anyhow::{Context, Result};
use std::time::Duration;
use wintrack_core::monitor::HyprlandSource;
use wintrack_core::WindowSource;

/// Print the focused window once
///
/// # Errors
///
/// Returns an error if the window cannot be queried
pub async fn window_command(query_timeout: Duration) -> Result<()> {
    let source = HyprlandSource::new(query_timeout);
    let window = source
        .query()
        .await
        .context("Error getting window info")?;

    println!("{}", window.describe());
    Ok(())
}
