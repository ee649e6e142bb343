// src/seen.rs
//! Seen-item store: explicit "already alerted" memory across runs.
//!
//! The default [`WindowOnlyStore`] remembers nothing and leaves dedup to the
//! freshness window (each item falls in exactly one run's window when the
//! scheduler cadence equals the window). [`FileSeenStore`] adds a durable
//! JSON file so a late or repeated run does not re-alert.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration as ChronoDuration, Utc};

pub trait SeenItemStore: Send + Sync {
    fn has_seen(&self, id: &str) -> bool;
    fn mark_seen(&self, id: &str, at: DateTime<Utc>);
    /// Persist pending changes. No-op for in-memory stores.
    fn flush(&self) -> Result<()> {
        Ok(())
    }
    fn name(&self) -> &'static str;
}

/// No memory at all; freshness window only.
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowOnlyStore;

impl SeenItemStore for WindowOnlyStore {
    fn has_seen(&self, _id: &str) -> bool {
        false
    }
    fn mark_seen(&self, _id: &str, _at: DateTime<Utc>) {}
    fn name(&self) -> &'static str {
        "window-only"
    }
}

/// JSON file `{ "<id>": <first_seen_unix>, ... }`. Entries older than the
/// retention are dropped when the file is opened.
pub struct FileSeenStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, i64>>,
}

impl FileSeenStore {
    /// A missing file starts empty; an unreadable/corrupt one is an error
    /// (silently starting empty would re-alert everything).
    pub fn open(path: impl Into<PathBuf>, retention: ChronoDuration, now: DateTime<Utc>) -> Result<Self> {
        let path = path.into();
        let mut entries: HashMap<String, i64> = match fs::read_to_string(&path) {
            Ok(s) if s.trim().is_empty() => HashMap::new(),
            Ok(s) => serde_json::from_str(&s)
                .with_context(|| format!("parsing seen store {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                return Err(e).with_context(|| format!("reading seen store {}", path.display()))
            }
        };
        let cutoff = (now - retention).timestamp();
        entries.retain(|_, ts| *ts >= cutoff);

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|g| g.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SeenItemStore for FileSeenStore {
    fn has_seen(&self, id: &str) -> bool {
        match self.entries.lock() {
            Ok(g) => g.contains_key(id),
            Err(_) => false,
        }
    }

    fn mark_seen(&self, id: &str, at: DateTime<Utc>) {
        if let Ok(mut g) = self.entries.lock() {
            g.entry(id.to_string()).or_insert_with(|| at.timestamp());
        }
    }

    fn flush(&self) -> Result<()> {
        let snapshot = {
            let g = self
                .entries
                .lock()
                .map_err(|_| anyhow::anyhow!("seen store mutex poisoned"))?;
            serde_json::to_string(&*g).context("serializing seen store")?
        };

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let mut f = fs::File::create(&tmp)
            .with_context(|| format!("creating {}", tmp.display()))?;
        f.write_all(snapshot.as_bytes())?;
        f.sync_all()?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
