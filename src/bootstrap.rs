// src/bootstrap.rs
//! Explicit wiring from `AppConfig` to a runnable pipeline. Nothing here
//! runs at import time; tests build their own `Runtime` from fakes.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use tracing::{info, warn};

use crate::analyze::ai_adapter::build_client_from_config;
use crate::analyze::{KeywordClassifier, OracleClassifier, RelevanceClassifier};
use crate::config::app::{ClassifierKind, NotifyChannel};
use crate::config::AppConfig;
use crate::guard::RunLock;
use crate::ingest::freshness::FreshnessWindow;
use crate::ingest::providers::build_http_client;
use crate::ingest::providers::rss::RssProvider;
use crate::ingest::providers::search_api::SearchApiProvider;
use crate::notify::{DiscordNotifier, Notifier, SlackNotifier};
use crate::pipeline::{run_once, RunContext, RunReport, SourcePipeline};
use crate::seen::{FileSeenStore, SeenItemStore, WindowOnlyStore};

/// `value * unit_secs` seconds, or an error instead of a chrono overflow panic.
fn checked(value: u64, unit_secs: u64, key: &str) -> Result<ChronoDuration> {
    value
        .checked_mul(unit_secs)
        .and_then(|s| i64::try_from(s).ok())
        .and_then(ChronoDuration::try_seconds)
        .ok_or_else(|| anyhow!("{key}={value} is out of range"))
}

pub struct Runtime {
    pub sources: Vec<SourcePipeline>,
    pub notifier: Box<dyn Notifier>,
    pub seen: Box<dyn SeenItemStore>,
    pub freshness: FreshnessWindow,
}

impl Runtime {
    pub fn from_config(cfg: &AppConfig, now: DateTime<Utc>) -> Result<Self> {
        // Safe diagnostics: provider + enabled + key length only.
        info!(
            "oracle cfg: provider={}, enabled={}, key_len={}, mock={}",
            cfg.oracle.provider,
            cfg.oracle.enabled,
            cfg.oracle.api_key.len(),
            cfg.oracle.test_mode.as_deref() == Some("mock")
        );
        let oracle_client = build_client_from_config(&cfg.oracle)?;
        if oracle_client.provider_name() == "disabled" {
            warn!(
                policy = ?cfg.on_classifier_error,
                "oracle has no credentials; oracle-classified sources follow the error policy"
            );
        }

        let keyword: Arc<dyn RelevanceClassifier> =
            Arc::new(KeywordClassifier::new(cfg.triggers.iter()));
        let oracle: Arc<dyn RelevanceClassifier> =
            Arc::new(OracleClassifier::new(oracle_client, cfg.on_classifier_error));
        let pick = |kind: ClassifierKind| match kind {
            ClassifierKind::Keyword => keyword.clone(),
            ClassifierKind::Oracle => oracle.clone(),
        };

        let timeout = Duration::from_secs(cfg.http_timeout_secs.max(1));
        let http = build_http_client(&cfg.search.user_agent, timeout)?;

        let mut sources = Vec::new();
        if cfg.search.enabled {
            let provider = SearchApiProvider::from_url(cfg.search.url.clone(), http.clone())
                .with_name("search_api")
                .with_limit(cfg.search.limit);
            sources.push(SourcePipeline::new(Box::new(provider), pick(cfg.search.classifier)));
        }
        if cfg.rss.enabled {
            let provider = RssProvider::from_url(cfg.rss.name.clone(), cfg.rss.url.clone(), http)
                .with_limit(cfg.rss.limit);
            sources.push(SourcePipeline::new(Box::new(provider), pick(cfg.rss.classifier)));
        }

        let notifier: Box<dyn Notifier> = match cfg.notify_channel {
            NotifyChannel::Discord => Box::new(
                DiscordNotifier::new(cfg.webhook_url.clone()).with_timeout(cfg.http_timeout_secs),
            ),
            NotifyChannel::Slack => Box::new(
                SlackNotifier::new(cfg.webhook_url.clone()).with_timeout(cfg.http_timeout_secs),
            ),
        };
        if cfg.webhook_url.is_none() {
            info!("no webhook configured; dry run (alerts are logged only)");
        }

        let seen: Box<dyn SeenItemStore> = match &cfg.seen_store_path {
            Some(p) => Box::new(FileSeenStore::open(
                p,
                checked(cfg.seen_retention_hours, 3600, "SEEN_RETENTION_HOURS")?,
                now,
            )?),
            None => Box::new(WindowOnlyStore),
        };

        let mut freshness = FreshnessWindow::new(cfg.window_minutes);
        if let Some(secs) = cfg.future_tolerance_secs {
            let secs = u64::try_from(secs).map_err(|_| anyhow!("DEALWATCH_FUTURE_TOLERANCE_SECS is negative"))?;
            freshness = freshness.with_future_tolerance(checked(secs, 1, "DEALWATCH_FUTURE_TOLERANCE_SECS")?);
        }

        Ok(Self {
            sources,
            notifier,
            seen,
            freshness,
        })
    }

    pub async fn run(&self, now: DateTime<Utc>) -> RunReport {
        let ctx = RunContext {
            freshness: self.freshness,
            now,
            notifier: self.notifier.as_ref(),
            seen: self.seen.as_ref(),
        };
        run_once(&self.sources, &ctx).await
    }
}

/// One guarded run. `Ok(None)` means another run holds the lock.
pub async fn run_guarded(cfg: &AppConfig) -> Result<Option<RunReport>> {
    let now = Utc::now();
    let _lock = match &cfg.run_lock_path {
        Some(p) => {
            let stale = checked(cfg.run_lock_stale_secs, 1, "RUN_LOCK_STALE_SECS")?;
            match RunLock::acquire(p, stale, now)? {
                Some(lock) => Some(lock),
                None => return Ok(None),
            }
        }
        None => None,
    };

    let runtime = Runtime::from_config(cfg, now)?;
    Ok(Some(runtime.run(now).await))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_durations_are_errors_not_panics() {
        assert_eq!(checked(48, 3600, "H").unwrap(), ChronoDuration::hours(48));
        assert!(checked(9_999_999_999_999, 3600, "H").is_err());
        assert!(checked(u64::MAX, 1, "S").is_err());
    }
}
