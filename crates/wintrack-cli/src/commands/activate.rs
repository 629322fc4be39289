//! Account activation against RescueTime

use anyhow::{Context, Result};
use std::path::Path;
use wintrack_integrations::{RescueTimeClient, RescueTimeCredentials};

use crate::credentials::save_activation;

/// Exchange email and password for account keys and store them in `env_file`
///
/// # Errors
///
/// Returns an error if activation is refused or the keys cannot be saved
pub async fn activate_command(email: &str, password: &str, env_file: &Path) -> Result<()> {
    println!("Activating RescueTime account {email}...");

    let client = RescueTimeClient::new(RescueTimeCredentials::default())?;
    let keys = client
        .activate(email, password)
        .await
        .context("Activation failed")?;

    save_activation(env_file, &keys)?;

    println!("Account key saved to {}", env_file.display());
    if keys.data_key.is_empty() {
        log::warn!("No data key was returned; native uploads will authenticate with the account key");
    }
    Ok(())
}
