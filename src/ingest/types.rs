// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// How an alert for a given source kind is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presentation {
    /// Leading symbol for keyword or fail-open accepts.
    pub symbol: &'static str,
    /// Leading symbol when the oracle affirmatively confirmed the item.
    pub verified_symbol: &'static str,
    pub headline: &'static str,
}

/// Kind of upstream feed an item came from. Fixed when the adapter is built,
/// so the formatter never has to guess from a label string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Reddit-style search API (JSON listing).
    SearchApi,
    /// Any RSS 2.0 deal feed (e.g. Slickdeals).
    Rss,
}

impl SourceKind {
    pub fn presentation(self) -> Presentation {
        match self {
            SourceKind::SearchApi => Presentation {
                symbol: "\u{1F4B0}",          // money bag
                verified_symbol: "\u{1F916}", // robot
                headline: "PROFIT OPPORTUNITY",
            },
            SourceKind::Rss => Presentation {
                symbol: "\u{1F3F7}\u{FE0F}",  // label
                verified_symbol: "\u{1F916}",
                headline: "DEAL ALERT",
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::SearchApi => "search_api",
            SourceKind::Rss => "rss",
        }
    }
}

/// One candidate posting as observed upstream. Built once by a provider and
/// passed around read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub source: String, // e.g., "r/Steelbooks", "Slickdeals"
    pub kind: SourceKind,
    pub title: String, // normalized text
    pub link: String,
    pub observed_at: Option<DateTime<Utc>>,
    /// Origin-specific tag (subreddit) for oracle prompts.
    pub context: Option<String>,
}

impl Item {
    /// Stable identity for the seen-item store: first 16 hex chars of sha256(link).
    pub fn id(&self) -> String {
        let digest = Sha256::digest(self.link.as_bytes());
        let mut out = String::with_capacity(16);
        for b in digest.iter().take(8) {
            use std::fmt::Write as _;
            let _ = write!(&mut out, "{:02x}", b);
        }
        out
    }
}

#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<Item>>;
    fn name(&self) -> &str;
}
