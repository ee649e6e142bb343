// src/config/app.rs
use anyhow::{bail, Result};
use std::path::PathBuf;
use std::str::FromStr;

use super::ai::OracleConfig;
use super::{env_lookup, flag, non_empty, parse_opt, parse_or, triggers, Lookup};
use crate::analyze::ErrorPolicy;
use crate::ingest::providers::rss::DEFAULT_RSS_LIMIT;
use crate::ingest::providers::search_api::DEFAULT_SEARCH_LIMIT;

pub const DEFAULT_WINDOW_MINUTES: f64 = 5.0;
pub const DEFAULT_SEARCH_URL: &str = "https://www.reddit.com/r/Steelbooks+4kbluray+boutiquebluray/search.json?q=%22OOP%22+OR+%22Restock%22+OR+%22Glitch%22+OR+%22Misprice%22+OR+%22Steal%22&restrict_sr=on&sort=new&limit=10";
pub const DEFAULT_RSS_URL: &str = "https://slickdeals.net/newsearch.php?mode=popdeals&searcharea=deals&sort=newest&q=4k+blu-ray&rss=1";
pub const DEFAULT_RSS_NAME: &str = "Slickdeals";
pub const DEFAULT_USER_AGENT: &str = "deal-watch/0.1 (run-once deal alerts)";

/// Upper bounds for duration knobs; larger values are configuration errors.
pub const MAX_SEEN_RETENTION_HOURS: u64 = 24 * 365;
pub const MAX_RUN_LOCK_STALE_SECS: u64 = 7 * 24 * 3600;
pub const MAX_FUTURE_TOLERANCE_SECS: i64 = 24 * 3600;
pub const MAX_HTTP_TIMEOUT_SECS: u64 = 300;

/// `parse_or`, then reject anything outside `min..=max`.
fn bounded<T>(lookup: Lookup<'_>, key: &str, default: T, min: T, max: T) -> Result<T>
where
    T: FromStr + PartialOrd + std::fmt::Display + Copy,
    T::Err: std::fmt::Display,
{
    let v = parse_or(lookup, key, default)?;
    if v < min || v > max {
        bail!("{key}={v} is out of range ({min}..={max})");
    }
    Ok(v)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierKind {
    Keyword,
    Oracle,
}

impl FromStr for ClassifierKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keyword" | "keywords" => Ok(ClassifierKind::Keyword),
            "oracle" | "ai" => Ok(ClassifierKind::Oracle),
            other => bail!("unknown classifier: {other}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyChannel {
    Discord,
    Slack,
}

impl FromStr for NotifyChannel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "discord" => Ok(NotifyChannel::Discord),
            "slack" => Ok(NotifyChannel::Slack),
            other => bail!("unknown notify channel: {other}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchSourceConfig {
    pub enabled: bool,
    pub url: String,
    pub limit: usize,
    pub user_agent: String,
    pub classifier: ClassifierKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RssSourceConfig {
    pub enabled: bool,
    pub name: String,
    pub url: String,
    pub limit: usize,
    pub classifier: ClassifierKind,
}

/// Everything one run needs. Built once in `main`, handed to `bootstrap`.
#[derive(Clone)]
pub struct AppConfig {
    pub window_minutes: f64,
    pub future_tolerance_secs: Option<i64>,
    pub search: SearchSourceConfig,
    pub rss: RssSourceConfig,
    pub notify_channel: NotifyChannel,
    /// `None` = dry run: alerts are formatted and logged, not posted.
    pub webhook_url: Option<String>,
    pub on_classifier_error: ErrorPolicy,
    pub triggers: Vec<String>,
    pub oracle: OracleConfig,
    pub seen_store_path: Option<PathBuf>,
    pub seen_retention_hours: u64,
    pub run_lock_path: Option<PathBuf>,
    pub run_lock_stale_secs: u64,
    pub http_timeout_secs: u64,
    pub strict_exit: bool,
    pub metrics_textfile: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&env_lookup)
    }

    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Self> {
        let window_minutes = parse_or(lookup, "DEALWATCH_WINDOW_MINUTES", DEFAULT_WINDOW_MINUTES)?;
        if !window_minutes.is_finite() || window_minutes <= 0.0 {
            bail!("DEALWATCH_WINDOW_MINUTES must be a positive number");
        }

        let search = SearchSourceConfig {
            enabled: parse_or(lookup, "SEARCH_API_ENABLED", true)?,
            url: non_empty(lookup, "SEARCH_API_URL").unwrap_or_else(|| DEFAULT_SEARCH_URL.into()),
            limit: parse_or(lookup, "SEARCH_API_LIMIT", DEFAULT_SEARCH_LIMIT)?,
            user_agent: non_empty(lookup, "SEARCH_API_USER_AGENT")
                .unwrap_or_else(|| DEFAULT_USER_AGENT.into()),
            classifier: parse_or(lookup, "SEARCH_API_CLASSIFIER", ClassifierKind::Oracle)?,
        };
        let rss = RssSourceConfig {
            enabled: parse_or(lookup, "RSS_ENABLED", true)?,
            name: non_empty(lookup, "RSS_FEED_NAME").unwrap_or_else(|| DEFAULT_RSS_NAME.into()),
            url: non_empty(lookup, "RSS_FEED_URL").unwrap_or_else(|| DEFAULT_RSS_URL.into()),
            limit: parse_or(lookup, "RSS_LIMIT", DEFAULT_RSS_LIMIT)?,
            classifier: parse_or(lookup, "RSS_CLASSIFIER", ClassifierKind::Keyword)?,
        };
        if search.limit == 0 || rss.limit == 0 {
            bail!("SEARCH_API_LIMIT and RSS_LIMIT must be at least 1");
        }

        let future_tolerance_secs: Option<i64> =
            parse_opt(lookup, "DEALWATCH_FUTURE_TOLERANCE_SECS")?;
        if let Some(t) = future_tolerance_secs {
            if !(0..=MAX_FUTURE_TOLERANCE_SECS).contains(&t) {
                bail!("DEALWATCH_FUTURE_TOLERANCE_SECS={t} is out of range (0..={MAX_FUTURE_TOLERANCE_SECS})");
            }
        }

        let webhook_url =
            non_empty(lookup, "NOTIFY_WEBHOOK_URL").or_else(|| non_empty(lookup, "DISCORD_WEBHOOK_URL"));

        Ok(Self {
            window_minutes,
            future_tolerance_secs,
            search,
            rss,
            notify_channel: parse_or(lookup, "NOTIFY_CHANNEL", NotifyChannel::Discord)?,
            webhook_url,
            on_classifier_error: parse_or(lookup, "ON_CLASSIFIER_ERROR", ErrorPolicy::Accept)?,
            triggers: triggers::load_triggers(lookup)?,
            oracle: OracleConfig::from_lookup(lookup)?,
            seen_store_path: non_empty(lookup, "SEEN_STORE_PATH").map(PathBuf::from),
            seen_retention_hours: bounded(lookup, "SEEN_RETENTION_HOURS", 48, 1, MAX_SEEN_RETENTION_HOURS)?,
            run_lock_path: non_empty(lookup, "RUN_LOCK_PATH").map(PathBuf::from),
            run_lock_stale_secs: bounded(lookup, "RUN_LOCK_STALE_SECS", 600, 1, MAX_RUN_LOCK_STALE_SECS)?,
            http_timeout_secs: bounded(lookup, "HTTP_TIMEOUT_SECS", 10, 1, MAX_HTTP_TIMEOUT_SECS)?,
            strict_exit: flag(lookup, "STRICT_EXIT"),
            metrics_textfile: non_empty(lookup, "METRICS_TEXTFILE").map(PathBuf::from),
        })
    }
}
