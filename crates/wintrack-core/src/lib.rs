pub mod aggregator;
pub mod clock;
pub mod config;
pub mod driver;
pub mod merge_policy;
pub mod monitor;
pub mod report;
pub mod session;
pub mod tracker;
pub mod upload;

pub use clock::{Clock, SystemClock};
pub use config::{MonitorConfig, Settings, TrackerConfig};
pub use driver::{Monitor, MonitorEvent, PollOutcome};
pub use merge_policy::{MergeDecision, MergePolicy};
pub use monitor::{FocusedWindow, WindowSource, WindowSourceError};
pub use session::{ActivitySession, ActivitySummary};
pub use tracker::ActivityTracker;
pub use upload::{SubmissionReport, Uploader};
