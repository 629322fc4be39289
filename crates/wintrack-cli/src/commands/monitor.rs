//! Continuous monitoring and time tracking

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use wintrack_core::monitor::HyprlandSource;
use wintrack_core::report::{format_activity_summary, format_submission_report};
use wintrack_core::{
    ActivityTracker, Monitor, MonitorConfig, MonitorEvent, SystemClock, TrackerConfig,
};
use wintrack_integrations::RescueTimeClient;

use crate::credentials::load_credentials;
use crate::duration::format_interval;

/// Everything the monitor loop needs, resolved from flags and settings
#[derive(Debug, Clone)]
pub struct MonitorOptions {
    /// Print the tracking intro instead of the plain monitoring one
    pub track: bool,
    pub env_file: PathBuf,
    pub monitor: MonitorConfig,
    pub tracker: TrackerConfig,
    pub min_submit: chrono::Duration,
}

/// Watch the focused window until interrupted, then print the summary
///
/// # Errors
///
/// Returns an error if credentials are needed but unusable, or the first
/// window query fails
pub async fn monitor_command(options: MonitorOptions) -> Result<()> {
    let interval = format_interval(options.monitor.poll_interval);
    if options.track {
        println!(
            "Tracking application usage (polling every {interval}). Press Ctrl+C to stop and see summary."
        );
    } else {
        println!("Monitoring window changes (polling every {interval}). Press Ctrl+C to stop.");
    }

    let uploader = if options.monitor.submit {
        let credentials = load_credentials(&options.env_file)?;
        let client = RescueTimeClient::new(credentials)?.with_min_duration(options.min_submit);
        Some(Arc::new(client))
    } else {
        None
    };

    let tracker = Arc::new(ActivityTracker::with_config(
        options.tracker,
        Arc::new(SystemClock),
    ));
    let source = HyprlandSource::new(options.monitor.query_timeout);
    let mut monitor = Monitor::new(Box::new(source), Arc::clone(&tracker), options.monitor)
        .with_reporter(print_event);
    if let Some(uploader) = uploader {
        monitor = monitor.with_uploader(uploader);
    }

    monitor
        .start()
        .await
        .context("Error getting initial window info")?;

    monitor.run_with_signals().await;

    print!("{}", format_activity_summary(&tracker.activity_summaries()));
    Ok(())
}

fn print_event(event: MonitorEvent<'_>) {
    match event {
        MonitorEvent::WindowChanged { window, at } => {
            println!("{} [{}]", window.describe(), at.format("%H:%M:%S"));
        }
        MonitorEvent::NothingToSubmit => println!("No activities to submit."),
        MonitorEvent::Submitted { service, report } => {
            print!("{}", format_submission_report(service, report));
            if !report.is_complete_success() {
                log::warn!(
                    "{} of {} activities were not uploaded to {service}",
                    report.failed,
                    report.total
                );
            }
        }
    }
}
