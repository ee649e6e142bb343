// tests/run_guard.rs
use chrono::{Duration as ChronoDuration, Utc};
use deal_watch::guard::RunLock;

#[test]
fn overlapping_run_backs_off() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deal-watch.lock");
    let now = Utc::now();

    let first = RunLock::acquire(&path, ChronoDuration::minutes(10), now)
        .unwrap()
        .expect("first run gets the lock");
    let second = RunLock::acquire(&path, ChronoDuration::minutes(10), now).unwrap();
    assert!(second.is_none());
    assert!(first.path().exists());
}

#[test]
fn dropping_the_lock_releases_it() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deal-watch.lock");
    let now = Utc::now();

    {
        let _lock = RunLock::acquire(&path, ChronoDuration::minutes(10), now)
            .unwrap()
            .unwrap();
        assert!(path.exists());
    }
    assert!(!path.exists());
    assert!(RunLock::acquire(&path, ChronoDuration::minutes(10), now)
        .unwrap()
        .is_some());
}

#[test]
fn stale_lock_is_taken_over() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deal-watch.lock");
    let now = Utc::now();
    let long_ago = now - ChronoDuration::hours(2);
    std::fs::write(&path, format!("4242 {}\n", long_ago.timestamp())).unwrap();

    let lock = RunLock::acquire(&path, ChronoDuration::minutes(10), now)
        .unwrap()
        .expect("stale lock replaced");
    let body = std::fs::read_to_string(lock.path()).unwrap();
    assert!(body.starts_with(&format!("{} ", std::process::id())));
}

#[test]
fn live_lock_is_honoured_at_the_largest_stale_window() {
    use deal_watch::config::app::MAX_RUN_LOCK_STALE_SECS;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deal-watch.lock");
    let now = Utc::now();
    let stale_after = ChronoDuration::seconds(MAX_RUN_LOCK_STALE_SECS as i64);

    let _held = RunLock::acquire(&path, stale_after, now).unwrap().unwrap();
    let later = now + ChronoDuration::hours(1);
    assert!(RunLock::acquire(&path, stale_after, later).unwrap().is_none());
}
