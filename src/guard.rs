// src/guard.rs
//! Lock file against overlapping runs (scheduler double-fire).
//!
//! Optional: without `RUN_LOCK_PATH` two overlapping runs may both alert on
//! the same items. With it, the second run sees the lock and exits early.
//! A lock older than `stale_after` is assumed to belong to a crashed run and
//! is taken over.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use tracing::{info, warn};

#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
}

impl RunLock {
    /// `Ok(None)` when another live run holds the lock.
    pub fn acquire(path: impl Into<PathBuf>, stale_after: ChronoDuration, now: DateTime<Utc>) -> Result<Option<Self>> {
        let path = path.into();
        if stale_after < ChronoDuration::zero() {
            bail!("negative stale window for {}", path.display());
        }
        if let Some(lock) = Self::try_create(&path, now)? {
            return Ok(Some(lock));
        }

        let held_raw = fs::read_to_string(&path).ok();
        let held_since = held_raw.as_deref().and_then(parse_lock_timestamp);
        let stale = match held_since {
            Some(ts) => now.signed_duration_since(ts) > stale_after,
            // Unreadable/half-written lock: only trust it while it is young.
            None => file_age(&path, now).map_or(true, |age| age > stale_after),
        };
        if !stale {
            info!(target: "pipeline", lock = %path.display(), ?held_since, "another run holds the lock");
            return Ok(None);
        }

        // Check-then-remove is not atomic: two runs that both judged the lock
        // stale can race, and the slower one could delete the lock the faster
        // one just wrote. Re-reading right before removal shrinks that window
        // to the gap between the read and the unlink; it does not close it.
        if fs::read_to_string(&path).ok() != held_raw {
            info!(target: "pipeline", lock = %path.display(), "lock changed hands during takeover; backing off");
            return Ok(None);
        }
        warn!(target: "pipeline", lock = %path.display(), ?held_since, "taking over stale run lock");
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e).with_context(|| format!("removing stale lock {}", path.display())),
        }
        Self::try_create(&path, now)
    }

    fn try_create(path: &Path, now: DateTime<Utc>) -> Result<Option<Self>> {
        match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(mut f) => {
                writeln!(f, "{} {}", std::process::id(), now.timestamp())
                    .with_context(|| format!("writing lock {}", path.display()))?;
                Ok(Some(Self {
                    path: path.to_path_buf(),
                }))
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(None),
            Err(e) => Err(e).with_context(|| format!("creating lock {}", path.display())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path); // best-effort
    }
}

/// Lock files hold `<pid> <unix_ts>`.
fn parse_lock_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let ts: i64 = s.split_whitespace().nth(1)?.parse().ok()?;
    DateTime::<Utc>::from_timestamp(ts, 0)
}

#[cfg(test)]
fn lock_timestamp(path: &Path) -> Option<DateTime<Utc>> {
    parse_lock_timestamp(&fs::read_to_string(path).ok()?)
}

fn file_age(path: &Path, now: DateTime<Utc>) -> Option<ChronoDuration> {
    let modified = fs::metadata(path).ok()?.modified().ok()?;
    Some(now.signed_duration_since(DateTime::<Utc>::from(modified)))
}
