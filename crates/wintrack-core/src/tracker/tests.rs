use super::*;
use crate::clock::ManualClock;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::time::Duration as StdDuration;

fn origin() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 30, 12, 0, 0).unwrap()
}

fn tracker() -> (ActivityTracker, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(origin()));
    let tracker = ActivityTracker::with_config(TrackerConfig::default(), clock.clone());
    (tracker, clock)
}

fn secs(n: u64) -> StdDuration {
    StdDuration::from_secs(n)
}

// ==================== start / end ====================

#[test]
fn test_start_session_opens_active_session() {
    let (tracker, _clock) = tracker();
    tracker.start_session("kitty", "nvim");

    let current = tracker.current_session().unwrap();
    assert!(current.active);
    assert_eq!(current.app_class, "kitty");
    assert_eq!(current.window_title, "nvim");
    assert_eq!(current.start_time, origin());
    assert!(tracker.completed_sessions().is_empty());
}

#[test]
fn test_end_without_active_session_is_noop() {
    let (tracker, _clock) = tracker();
    tracker.end_current_session();
    assert!(tracker.current_session().is_none());
    assert!(tracker.completed_sessions().is_empty());
}

#[test]
fn test_end_current_session_stores_long_session() {
    let (tracker, clock) = tracker();
    tracker.start_session("kitty", "nvim");
    clock.advance(secs(25));
    tracker.end_current_session();

    assert!(tracker.current_session().is_none());
    let sessions = tracker.completed_sessions();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].duration, Duration::seconds(25));
    assert_eq!(sessions[0].end_time, Some(origin() + Duration::seconds(25)));
    assert!(!sessions[0].active);
}

#[test]
fn test_short_session_never_stored() {
    let (tracker, clock) = tracker();
    tracker.start_session("kitty", "nvim");
    clock.advance(secs(9));
    tracker.end_current_session();

    assert!(tracker.completed_sessions().is_empty());
    assert!(tracker.activity_summaries().is_empty());
}

#[test]
fn test_zero_length_session_is_discarded() {
    let (tracker, _clock) = tracker();
    tracker.start_session("kitty", "nvim");
    tracker.start_session("firefox", "docs");
    tracker.end_current_session();

    assert!(tracker.completed_sessions().is_empty());
}

// ==================== merging ====================

#[test]
fn test_same_app_title_changes_merge_into_one_session() {
    let (tracker, clock) = tracker();
    tracker.start_session("kitty", "nvim");
    clock.advance(secs(15));
    tracker.start_session("kitty", "cargo test");
    clock.advance(secs(20));
    tracker.start_session("kitty", "git log");
    clock.advance(secs(12));
    tracker.end_current_session();

    let sessions = tracker.completed_sessions();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].start_time, origin());
    assert_eq!(sessions[0].end_time, Some(origin() + Duration::seconds(47)));
    assert_eq!(sessions[0].duration, Duration::seconds(47));
    assert_eq!(sessions[0].window_title, "git log");
}

#[test]
fn test_merge_spans_discarded_interruption() {
    let (tracker, clock) = tracker();
    tracker.start_session("kitty", "nvim");
    clock.advance(secs(20));
    tracker.start_session("firefox", "quick look");
    clock.advance(secs(5));
    tracker.start_session("kitty", "nvim");
    clock.advance(secs(20));
    tracker.end_current_session();

    let sessions = tracker.completed_sessions();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].app_class, "kitty");
    assert_eq!(sessions[0].duration, Duration::seconds(45));
}

#[test]
fn test_gap_beyond_threshold_keeps_sessions_apart() {
    let (tracker, clock) = tracker();
    tracker.start_session("kitty", "nvim");
    clock.advance(secs(20));
    for app in ["a", "b", "c", "d"] {
        tracker.start_session(app, "blip");
        clock.advance(secs(8));
    }
    tracker.start_session("kitty", "nvim");
    clock.advance(secs(20));
    tracker.end_current_session();

    let sessions = tracker.completed_sessions();
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].duration, Duration::seconds(20));
    assert_eq!(sessions[1].start_time, origin() + Duration::seconds(52));
    assert_eq!(sessions[1].duration, Duration::seconds(20));
}

#[test]
fn test_different_apps_are_separate_sessions() {
    let (tracker, clock) = tracker();
    tracker.start_session("kitty", "nvim");
    clock.advance(secs(30));
    tracker.start_session("firefox", "docs");
    clock.advance(secs(30));
    tracker.start_session("kitty", "nvim");
    clock.advance(secs(30));
    tracker.end_current_session();

    let apps: Vec<String> = tracker
        .completed_sessions()
        .into_iter()
        .map(|s| s.app_class)
        .collect();
    assert_eq!(apps, vec!["kitty", "firefox", "kitty"]);
}

// ==================== summaries ====================

#[test]
fn test_summary_mixes_discarded_stored_and_active() {
    let (tracker, clock) = tracker();
    tracker.start_session("A", "t1");
    clock.advance(secs(5));
    tracker.start_session("B", "t2");
    clock.advance(secs(35));
    tracker.start_session("A", "t3");
    clock.advance(secs(1));

    let summaries = tracker.activity_summaries();
    assert_eq!(summaries.len(), 2);

    let b = &summaries["B"];
    assert_eq!(b.total_duration, Duration::seconds(35));
    assert_eq!(b.session_count, 1);

    let a = &summaries["A"];
    assert_eq!(a.total_duration, Duration::seconds(1));
    assert_eq!(a.session_count, 1);
    assert_eq!(a.activity_details, "t3");
    assert_eq!(a.last_seen, origin() + Duration::seconds(41));

    tracker.end_current_session();
    let summaries = tracker.activity_summaries();
    assert_eq!(summaries.len(), 1);
    assert!(summaries.contains_key("B"));
}

#[test]
fn test_summaries_do_not_mutate_state() {
    let (tracker, clock) = tracker();
    tracker.start_session("kitty", "nvim");
    clock.advance(secs(30));

    let _ = tracker.activity_summaries();

    assert!(tracker.completed_sessions().is_empty());
    assert!(tracker.current_session().unwrap().active);
}

#[test]
fn test_summaries_idempotent_without_active_session() {
    let (tracker, clock) = tracker();
    tracker.start_session("kitty", "nvim");
    clock.advance(secs(30));
    tracker.end_current_session();
    clock.advance(secs(30));

    assert_eq!(tracker.activity_summaries(), tracker.activity_summaries());
}

#[test]
fn test_active_total_is_non_decreasing() {
    let (tracker, clock) = tracker();
    tracker.start_session("kitty", "nvim");

    let mut previous = Duration::zero();
    for _ in 0..5 {
        clock.advance(secs(3));
        let total = tracker.activity_summaries()["kitty"].total_duration;
        assert!(total >= previous);
        previous = total;
    }
    assert_eq!(previous, Duration::seconds(15));
}

#[test]
fn test_total_is_sum_of_stored_plus_active() {
    let (tracker, clock) = tracker();
    tracker.start_session("kitty", "nvim");
    clock.advance(secs(40));
    tracker.start_session("firefox", "docs");
    clock.advance(secs(40));
    tracker.start_session("kitty", "cargo");
    clock.advance(secs(7));

    let stored: Duration = tracker
        .completed_sessions()
        .iter()
        .filter(|s| s.app_class == "kitty")
        .map(|s| s.duration)
        .fold(Duration::zero(), |acc, d| acc + d);

    let kitty = &tracker.activity_summaries()["kitty"];
    assert_eq!(kitty.total_duration, stored + Duration::seconds(7));
    assert_eq!(kitty.session_count, 2);
    assert_eq!(kitty.first_seen, origin());
}

// ==================== clearing ====================

#[test]
fn test_clear_then_summaries_is_empty() {
    let (tracker, clock) = tracker();
    tracker.start_session("kitty", "nvim");
    clock.advance(secs(30));
    tracker.end_current_session();

    tracker.clear_completed_sessions();

    assert!(tracker.activity_summaries().is_empty());
}

#[test]
fn test_clear_keeps_active_session() {
    let (tracker, clock) = tracker();
    tracker.start_session("kitty", "nvim");
    clock.advance(secs(30));
    tracker.start_session("firefox", "docs");
    clock.advance(secs(2));

    tracker.clear_completed_sessions();

    assert!(tracker.completed_sessions().is_empty());
    let summaries = tracker.activity_summaries();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries["firefox"].total_duration, Duration::seconds(2));
}

#[test]
fn test_session_after_clear_does_not_merge_into_cleared() {
    let (tracker, clock) = tracker();
    tracker.start_session("kitty", "nvim");
    clock.advance(secs(30));
    tracker.start_session("kitty", "shell");
    tracker.clear_completed_sessions();
    clock.advance(secs(30));
    tracker.end_current_session();

    let sessions = tracker.completed_sessions();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].start_time, origin() + Duration::seconds(30));
    assert_eq!(sessions[0].window_title, "shell");
}

// ==================== concurrency ====================

#[test]
fn test_concurrent_writers_and_readers() {
    let tracker = Arc::new(ActivityTracker::new());

    let writer = {
        let tracker = Arc::clone(&tracker);
        std::thread::spawn(move || {
            for i in 0..200 {
                tracker.start_session(format!("app-{}", i % 3), "title");
            }
            tracker.end_current_session();
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let tracker = Arc::clone(&tracker);
            std::thread::spawn(move || {
                for _ in 0..200 {
                    for summary in tracker.activity_summaries().values() {
                        assert!(summary.first_seen <= summary.last_seen);
                        assert!(summary.total_duration >= Duration::zero());
                    }
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    assert!(tracker.current_session().is_none());
}
