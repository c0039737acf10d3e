//! Integration tests for the tracking lifecycle against a real stats file

use chrono::{Duration as ChronoDuration, Local, TimeZone};
use crossbeam_channel::{bounded, unbounded, Sender};
use scroll_tracker::{
    LifetimeRecord, ScrollDirection, ScrollEvent, SessionSnapshot, StatsStore, Tracker,
};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

fn send(tx: &Sender<ScrollEvent>, direction: ScrollDirection, count: usize) {
    for _ in 0..count {
        tx.send(ScrollEvent::new(direction)).unwrap();
    }
}

fn start(store: &StatsStore) -> (Tracker, Sender<ScrollEvent>) {
    let (tx, rx) = unbounded();
    let tracker = Tracker::new(store.clone(), store.load(), rx, Duration::from_millis(10));
    (tracker, tx)
}

#[test]
fn test_sub_second_durations_do_not_drift_across_runs() {
    let dir = TempDir::new().unwrap();
    let store = StatsStore::new(dir.path().join("scroll_data.json"));
    let run = Local.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
    let durations = [
        Duration::new(3841, 198_436_235),
        Duration::new(59, 999_999_999),
        Duration::new(0, 1),
        Duration::new(7_203, 123_456_789),
        Duration::new(12, 345_678_901),
    ];

    let mut expected = 0.0_f64;
    for elapsed in durations {
        let (tracker, _tx) = start(&store);
        let report = tracker.finish_at(elapsed, run).unwrap();
        expected += elapsed.as_secs_f64();

        let saved = store.load();
        assert_eq!(saved.total_time_seconds.to_bits(), expected.to_bits());
        assert_eq!(saved, report.record);
    }
}

#[test]
fn test_fresh_environment_loads_zero_record() {
    let dir = TempDir::new().unwrap();
    let store = StatsStore::new(dir.path().join("scroll_data.json"));

    let record = store.load();
    assert_eq!(record, LifetimeRecord::default());
    assert_eq!(record.total_clicks, 0);
    assert!(record.first_session.is_none());
    assert!(record.last_session.is_none());
}

#[test]
fn test_two_sessions_accumulate() {
    let dir = TempDir::new().unwrap();
    let store = StatsStore::new(dir.path().join("scroll_data.json"));
    let first_run = Local.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
    let second_run = first_run + ChronoDuration::days(1);

    // First run: 7 up, 3 down over 120 seconds.
    let (tracker, tx) = start(&store);
    send(&tx, ScrollDirection::Up, 7);
    send(&tx, ScrollDirection::Down, 3);
    tracker
        .finish_at(Duration::from_secs(120), first_run)
        .unwrap();

    let saved = store.load();
    assert_eq!(saved.total_scroll_up, 7);
    assert_eq!(saved.total_scroll_down, 3);
    assert_eq!(saved.total_clicks, 10);
    assert_eq!(saved.total_sessions, 1);
    assert!((saved.total_time_seconds - 120.0).abs() < 1e-9);
    assert_eq!(saved.first_session, Some(first_run));
    assert_eq!(saved.last_session, Some(first_run));

    // Second run: 2 up over 30 seconds.
    let (tracker, tx) = start(&store);
    assert_eq!(tracker.record().total_sessions, 1);
    send(&tx, ScrollDirection::Up, 2);
    let report = tracker
        .finish_at(Duration::from_secs(30), second_run)
        .unwrap();
    assert_eq!(report.session, SessionSnapshot::new(2, 0));

    let saved = store.load();
    assert_eq!(saved.total_scroll_up, 9);
    assert_eq!(saved.total_scroll_down, 3);
    assert_eq!(saved.total_clicks, 12);
    assert_eq!(saved.total_sessions, 2);
    assert!((saved.total_time_seconds - 150.0).abs() < 1e-9);
    assert_eq!(saved.first_session, Some(first_run));
    assert_eq!(saved.last_session, Some(second_run));
    assert_eq!(saved, report.record);
}

#[test]
fn test_empty_session_still_counts() {
    let dir = TempDir::new().unwrap();
    let store = StatsStore::new(dir.path().join("scroll_data.json"));
    let now = Local.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();

    let (tracker, _tx) = start(&store);
    tracker.finish_at(Duration::ZERO, now).unwrap();

    let saved = store.load();
    assert_eq!(saved.total_clicks, 0);
    assert_eq!(saved.total_time_seconds, 0.0);
    assert_eq!(saved.total_sessions, 1);
    assert_eq!(saved.last_session, Some(now));
}

#[test]
fn test_legacy_file_is_extended() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scroll_data.json");
    std::fs::write(
        &path,
        r#"{
  "total_scroll_up": 50,
  "total_scroll_down": 25,
  "total_clicks": 75
}"#,
    )
    .unwrap();
    let store = StatsStore::new(&path);

    let (tracker, tx) = start(&store);
    assert_eq!(tracker.metrics().alltime_sessions, 1);
    send(&tx, ScrollDirection::Down, 5);
    let report = tracker.finish().unwrap();

    assert_eq!(report.record.total_scroll_up, 50);
    assert_eq!(report.record.total_scroll_down, 30);
    assert_eq!(report.record.total_clicks, 80);
    assert_eq!(report.record.total_sessions, 1);
    assert!(report.record.first_session.is_some());
    assert_eq!(report.record.first_session, report.record.last_session);
}

#[test]
fn test_concurrent_events_and_snapshots() {
    const PRODUCERS: usize = 4;
    const PER_PRODUCER: usize = 2_500;

    let dir = TempDir::new().unwrap();
    let store = StatsStore::new(dir.path().join("scroll_data.json"));
    let (tx, rx) = bounded(64);
    let tracker = Tracker::new(store.clone(), store.load(), rx, Duration::from_millis(10));

    thread::scope(|s| {
        for i in 0..PRODUCERS {
            let tx = tx.clone();
            s.spawn(move || {
                let direction = if i % 2 == 0 {
                    ScrollDirection::Up
                } else {
                    ScrollDirection::Down
                };
                send(&tx, direction, PER_PRODUCER);
            });
        }

        // Read while the producers and the pump are running.
        let mut last = 0;
        for _ in 0..500 {
            let snapshot = tracker.session().snapshot();
            assert!(snapshot.total() >= last);
            assert!(snapshot.total() as usize <= PRODUCERS * PER_PRODUCER);
            last = snapshot.total();
        }
    });
    drop(tx);

    let report = tracker.finish().unwrap();
    let expected = (PRODUCERS * PER_PRODUCER) as u64;
    assert_eq!(report.session.total(), expected);
    assert_eq!(report.session.up, expected / 2);
    assert_eq!(report.session.down, expected / 2);
    assert_eq!(store.load().total_clicks, expected);
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
#[test]
fn test_unsupported_platform_fails_before_any_session() {
    use scroll_tracker::{Collector, CollectorError};

    let dir = TempDir::new().unwrap();
    let store = StatsStore::new(dir.path().join("scroll_data.json"));

    let mut collector = Collector::new();
    let tracker = Tracker::new(
        store.clone(),
        store.load(),
        collector.receiver().clone(),
        Duration::from_millis(10),
    );

    assert!(!scroll_tracker::collector::check_permission());
    assert!(matches!(
        collector.start(),
        Err(CollectorError::Unsupported)
    ));
    drop(tracker);

    assert!(!store.path().exists());
    assert_eq!(store.load().total_sessions, 0);
}
