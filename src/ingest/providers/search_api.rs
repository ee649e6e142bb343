// src/ingest/providers/search_api.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use metrics::histogram;
use serde::Deserialize;

use crate::ingest::normalize_text;
use crate::ingest::types::{Item, SourceKind, SourceProvider};

pub const DEFAULT_SEARCH_LIMIT: usize = 10;
const PERMALINK_BASE: &str = "https://www.reddit.com";

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: Post,
}

#[derive(Debug, Deserialize)]
struct Post {
    #[serde(default)]
    title: String,
    created_utc: Option<f64>,
    permalink: Option<String>,
    subreddit: Option<String>,
}

fn unix_to_utc(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() || secs < 0.0 {
        return None;
    }
    let whole = secs.trunc() as i64;
    let nanos = ((secs - secs.trunc()) * 1e9) as u32;
    Utc.timestamp_opt(whole, nanos).single()
}

/// Search-API adapter (Reddit listing JSON).
pub struct SearchApiProvider {
    name: String,
    limit: usize,
    mode: Mode,
}

enum Mode {
    // Owned body so tests can hand in fixtures of any lifetime.
    Fixture(String),
    Http {
        url: String,
        client: reqwest::Client,
    },
}

impl SearchApiProvider {
    /// `client` should carry the client-identifier user agent
    /// (see `providers::build_http_client`).
    pub fn from_url(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            name: "search_api".to_string(),
            limit: DEFAULT_SEARCH_LIMIT,
            mode: Mode::Http {
                url: url.into(),
                client,
            },
        }
    }

    pub fn from_fixture_str(body: &str) -> Self {
        Self {
            name: "search_api".to_string(),
            limit: DEFAULT_SEARCH_LIMIT,
            mode: Mode::Fixture(body.to_string()),
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn parse_listing(body: &str, limit: usize) -> Result<Vec<Item>> {
        let t0 = std::time::Instant::now();
        let listing: Listing = serde_json::from_str(body).context("parsing search api json")?;

        let mut out = Vec::with_capacity(listing.data.children.len().min(limit));
        for child in listing.data.children.into_iter().take(limit) {
            let post = child.data;
            let title = normalize_text(&post.title);
            let Some(permalink) = post.permalink.filter(|p| !p.is_empty()) else {
                continue;
            };
            if title.is_empty() {
                continue;
            }

            let link = if permalink.starts_with("http") {
                permalink
            } else {
                format!("{PERMALINK_BASE}{permalink}")
            };
            let subreddit = post.subreddit.filter(|s| !s.is_empty());
            let source = subreddit
                .as_deref()
                .map(|s| format!("r/{s}"))
                .unwrap_or_else(|| "search_api".to_string());

            out.push(Item {
                source,
                kind: SourceKind::SearchApi,
                title,
                link,
                observed_at: post.created_utc.and_then(unix_to_utc),
                context: subreddit,
            });
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("deals_parse_ms").record(ms);
        Ok(out)
    }
}

#[async_trait]
impl SourceProvider for SearchApiProvider {
    async fn fetch_latest(&self) -> Result<Vec<Item>> {
        let items = match &self.mode {
            Mode::Fixture(s) => Self::parse_listing(s, self.limit)?,
            Mode::Http { url, client } => {
                let body = client
                    .get(url.as_str())
                    .send()
                    .await
                    .context("search api http get()")?
                    .error_for_status()
                    .context("search api non-2xx")?
                    .text()
                    .await
                    .context("search api http .text()")?;
                Self::parse_listing(&body, self.limit)?
            }
        };
        Ok(items)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
