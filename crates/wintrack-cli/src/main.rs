mod commands;
mod credentials;
mod duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use wintrack_core::Settings;

use commands::monitor::MonitorOptions;
use commands::preflight::{check_environment, DisplayEnv};
use duration::{parse_poll_interval, parse_submission_interval};

#[derive(Parser, Debug)]
#[command(name = "wintrack")]
#[command(about = "Show the focused window, or track time spent in each application", long_about = None)]
struct Cli {
    /// Continuously monitor for window changes
    #[arg(long)]
    monitor: bool,
    /// Monitor and track time spent in applications
    #[arg(long)]
    track: bool,
    /// Submit activity data to RescueTime
    #[arg(long)]
    submit: bool,
    /// Polling interval for monitoring mode (e.g. 100ms, 1s)
    #[arg(long, value_parser = parse_poll_interval)]
    interval: Option<Duration>,
    /// Interval between RescueTime submissions (e.g. 15m, 1h)
    #[arg(long, value_parser = parse_submission_interval)]
    submission_interval: Option<Duration>,
    /// File holding the RescueTime keys
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,
    /// Settings file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Activate a RescueTime account and store its keys
    Activate {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    if let Some(Commands::Activate { email, password }) = &cli.command {
        return commands::activate::activate_command(email, password, &cli.env_file).await;
    }

    check_environment(&DisplayEnv::from_process())?;

    let settings_path = match &cli.config {
        Some(path) => path.clone(),
        None => Settings::default_path()?,
    };
    let settings = Settings::load(&settings_path)?;

    let mut monitor_config = settings.monitor_config();
    if let Some(interval) = cli.interval {
        monitor_config.poll_interval = interval;
    }
    if let Some(interval) = cli.submission_interval {
        monitor_config.submission_interval = interval;
    }
    monitor_config.submit = cli.submit;

    if cli.monitor || cli.track {
        commands::monitor::monitor_command(MonitorOptions {
            track: cli.track,
            env_file: cli.env_file,
            monitor: monitor_config,
            tracker: settings.tracker_config(),
            min_submit: settings.min_submit(),
        })
        .await
    } else {
        commands::window::window_command(monitor_config.query_timeout).await
    }
}
