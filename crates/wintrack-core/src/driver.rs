use chrono::{DateTime, Local};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use crate::config::{MonitorConfig, MAX_POLL_INTERVAL, MAX_SUBMISSION_INTERVAL};
use crate::monitor::{FocusedWindow, WindowSource, WindowSourceError};
use crate::tracker::ActivityTracker;
use crate::upload::{SubmissionReport, Uploader};

/// Result of a single poll tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Sampling failed; nothing was changed
    Skipped,
    /// Same application and title as last time
    Unchanged,
    /// Focus moved and a new session was started
    Changed(FocusedWindow),
}

/// Something the monitor has to show the user
#[derive(Debug, Clone, Copy)]
pub enum MonitorEvent<'a> {
    /// Focus moved, observed at local time `at`
    WindowChanged {
        window: &'a FocusedWindow,
        at: DateTime<Local>,
    },
    /// An upload cycle found no summaries
    NothingToSubmit,
    /// An upload cycle finished
    Submitted {
        service: &'static str,
        report: &'a SubmissionReport,
    },
}

type Reporter = Box<dyn Fn(MonitorEvent<'_>) + Send + Sync>;

/// Drives the tracker from a periodic window sample.
///
/// Polling, the optional upload timer and the shutdown signal are handled
/// one at a time on a single task, so an upload in flight always finishes
/// before shutdown proceeds.
pub struct Monitor {
    source: Box<dyn WindowSource>,
    tracker: Arc<ActivityTracker>,
    uploader: Option<Arc<dyn Uploader>>,
    reporter: Option<Reporter>,
    config: MonitorConfig,
    last_window: Option<FocusedWindow>,
}

impl Monitor {
    #[must_use]
    pub fn new(
        source: Box<dyn WindowSource>,
        tracker: Arc<ActivityTracker>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            source,
            tracker,
            uploader: None,
            reporter: None,
            config,
            last_window: None,
        }
    }

    /// Attach the uploader used for periodic and final submissions
    #[must_use]
    pub fn with_uploader(mut self, uploader: Arc<dyn Uploader>) -> Self {
        self.uploader = Some(uploader);
        self
    }

    /// Receive window changes and upload results as they happen
    #[must_use]
    pub fn with_reporter<F>(mut self, reporter: F) -> Self
    where
        F: Fn(MonitorEvent<'_>) + Send + Sync + 'static,
    {
        self.reporter = Some(Box::new(reporter));
        self
    }

    #[must_use]
    pub fn tracker(&self) -> &Arc<ActivityTracker> {
        &self.tracker
    }

    /// Take the first sample and open the first session
    ///
    /// # Errors
    ///
    /// Returns an error if the window source cannot be queried
    pub async fn start(&mut self) -> Result<FocusedWindow, WindowSourceError> {
        let window = self.source.query().await?;
        self.observe(window.clone());
        Ok(window)
    }

    /// Sample the window source once and start a session on change
    pub async fn poll_once(&mut self) -> PollOutcome {
        let window = match self.source.query().await {
            Ok(window) => window,
            Err(e) => {
                log::debug!("Skipping poll, {} query failed: {e}", self.source.name());
                return PollOutcome::Skipped;
            }
        };

        if self.last_window.as_ref() == Some(&window) {
            return PollOutcome::Unchanged;
        }

        self.observe(window.clone());
        PollOutcome::Changed(window)
    }

    /// Upload the current summaries, then clear completed sessions.
    ///
    /// Sessions are cleared whether or not the upload succeeded. Returns
    /// `None` when submission is disabled.
    pub async fn flush(&self) -> Option<SubmissionReport> {
        let report = self.upload().await?;
        self.tracker.clear_completed_sessions();
        Some(report)
    }

    /// Close the active session and make one last upload attempt
    pub async fn shutdown(&self) -> Option<SubmissionReport> {
        self.tracker.end_current_session();
        self.upload().await
    }

    /// Run until `shutdown` resolves, then close out the tracker
    pub async fn run_until<F>(&mut self, shutdown: F) -> Option<SubmissionReport>
    where
        F: Future<Output = ()>,
    {
        let poll_every = bounded_period(
            self.config.poll_interval,
            Duration::from_millis(1),
            MAX_POLL_INTERVAL,
        );
        let mut poll = delayed_interval(poll_every);

        let mut submit = self.submission_timer();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                () = &mut shutdown => {
                    log::info!("Shutting down window monitor...");
                    break;
                }
                _ = next_tick(&mut submit) => {
                    let _ = self.flush().await;
                }
                _ = poll.tick() => {
                    self.poll_once().await;
                }
            }
        }

        self.shutdown().await
    }

    /// Run until Ctrl-C or SIGTERM
    pub async fn run_with_signals(&mut self) -> Option<SubmissionReport> {
        self.run_until(shutdown_signal()).await
    }

    fn observe(&mut self, window: FocusedWindow) {
        self.tracker
            .start_session(window.app_class.clone(), window.title.clone());
        self.emit(MonitorEvent::WindowChanged {
            window: &window,
            at: Local::now(),
        });
        self.last_window = Some(window);
    }

    fn emit(&self, event: MonitorEvent<'_>) {
        if let Some(reporter) = &self.reporter {
            reporter(event);
        }
    }

    fn submission_timer(&self) -> Option<Interval> {
        if !self.config.submit || self.uploader.is_none() {
            return None;
        }
        let every = bounded_period(
            self.config.submission_interval,
            Duration::from_secs(1),
            MAX_SUBMISSION_INTERVAL,
        );
        log::info!("API submission enabled: will submit every {every:?}");

        Some(delayed_interval(every))
    }

    async fn upload(&self) -> Option<SubmissionReport> {
        if !self.config.submit {
            return None;
        }
        let uploader = self.uploader.as_ref()?;

        let summaries = self.tracker.activity_summaries();
        if summaries.is_empty() {
            self.emit(MonitorEvent::NothingToSubmit);
            return Some(SubmissionReport::new(0));
        }

        let report = uploader.submit(&summaries).await;
        for (app_class, error) in &report.errors {
            log::error!("Failed to submit {app_class}: {error}");
        }
        self.emit(MonitorEvent::Submitted {
            service: uploader.service_name(),
            report: &report,
        });
        Some(report)
    }
}

fn bounded_period(requested: Duration, min: Duration, max: Duration) -> Duration {
    if requested > max {
        log::warn!("Interval {requested:?} is too long, using {max:?}");
    }
    requested.clamp(min, max)
}

/// Interval whose first tick is one period from now
fn delayed_interval(period: Duration) -> Interval {
    let now = Instant::now();
    let start = now.checked_add(period).unwrap_or(now);
    let mut timer = interval_at(start, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    timer
}

async fn next_tick(timer: &mut Option<Interval>) -> Instant {
    match timer {
        Some(timer) => timer.tick().await,
        None => std::future::pending().await,
    }
}

/// Resolves on the first Ctrl-C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => log::info!("Received Ctrl-C"),
        () = terminate => log::info!("Received SIGTERM"),
    }
}
