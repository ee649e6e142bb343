// src/pipeline.rs
//! Run orchestrator: fetch → freshness → dedup → classify → format → send,
//! one source at a time. A failing source yields zero items and never stops
//! the others; a failed delivery is logged and never retried.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::analyze::RelevanceClassifier;
use crate::ingest::collapse_duplicates;
use crate::ingest::freshness::FreshnessWindow;
use crate::ingest::types::SourceProvider;
use crate::notify::{format_alert, Delivery, Notifier};
use crate::seen::SeenItemStore;

/// One-time metrics registration (so series carry descriptions).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("deals_fetched_total", "Items returned by source adapters.");
        describe_counter!("deals_fresh_total", "Items inside the freshness window.");
        describe_counter!(
            "deals_duplicates_total",
            "Items collapsed as duplicates within one run."
        );
        describe_counter!(
            "deals_already_seen_total",
            "Items skipped because the seen-item store knew them."
        );
        describe_counter!("deals_relevant_total", "Items accepted by a classifier.");
        describe_counter!("deals_notified_total", "Alerts delivered to the sink.");
        describe_counter!(
            "deals_dry_run_total",
            "Alerts logged instead of posted (no webhook configured)."
        );
        describe_counter!("deals_notify_errors_total", "Alert deliveries that failed.");
        describe_counter!("deals_source_errors_total", "Source fetch/parse errors.");
        describe_counter!(
            "deals_classifier_errors_total",
            "Oracle calls that failed or returned no usable verdict."
        );
        describe_histogram!("deals_parse_ms", "Feed parse time in milliseconds.");
        describe_gauge!("deals_last_run_ts", "Unix ts when the pipeline last ran.");
    });
}

/// A source adapter paired with the classifier that judges its items.
pub struct SourcePipeline {
    pub provider: Box<dyn SourceProvider>,
    pub classifier: Arc<dyn RelevanceClassifier>,
}

impl SourcePipeline {
    pub fn new(provider: Box<dyn SourceProvider>, classifier: Arc<dyn RelevanceClassifier>) -> Self {
        Self {
            provider,
            classifier,
        }
    }
}

pub struct RunContext<'a> {
    pub freshness: FreshnessWindow,
    pub now: DateTime<Utc>,
    pub notifier: &'a dyn Notifier,
    pub seen: &'a dyn SeenItemStore,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceReport {
    pub source: String,
    pub fetched: usize,
    pub fresh: usize,
    pub duplicates: usize,
    pub already_seen: usize,
    pub relevant: usize,
    pub delivered: usize,
    /// Logged only, because no webhook is configured.
    pub dry_run: usize,
    pub delivery_failures: usize,
    pub fetch_error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub sources: Vec<SourceReport>,
}

impl RunReport {
    pub fn delivered(&self) -> usize {
        self.sources.iter().map(|s| s.delivered).sum()
    }

    pub fn relevant(&self) -> usize {
        self.sources.iter().map(|s| s.relevant).sum()
    }

    pub fn failed_sources(&self) -> Vec<&str> {
        self.sources
            .iter()
            .filter(|s| s.fetch_error.is_some())
            .map(|s| s.source.as_str())
            .collect()
    }
}

pub async fn run_source(pipeline: &SourcePipeline, ctx: &RunContext<'_>) -> SourceReport {
    let name = pipeline.provider.name().to_string();
    let mut report = SourceReport {
        source: name.clone(),
        ..Default::default()
    };

    let items = match pipeline.provider.fetch_latest().await {
        Ok(v) => v,
        Err(e) => {
            warn!(target: "pipeline", error = ?e, source = %name, "source fetch failed; skipping");
            counter!("deals_source_errors_total", "source" => name.clone()).increment(1);
            report.fetch_error = Some(format!("{e:#}"));
            return report;
        }
    };
    report.fetched = items.len();
    counter!("deals_fetched_total", "source" => name.clone()).increment(items.len() as u64);

    let fresh = ctx.freshness.retain(items, ctx.now);
    report.fresh = fresh.len();
    counter!("deals_fresh_total").increment(fresh.len() as u64);

    let (candidates, dups) = collapse_duplicates(fresh);
    report.duplicates = dups;
    counter!("deals_duplicates_total").increment(dups as u64);

    for item in candidates {
        let id = item.id();
        if ctx.seen.has_seen(&id) {
            debug!(target: "pipeline", source = %item.source, title = %item.title, "already alerted; skipping");
            report.already_seen += 1;
            counter!("deals_already_seen_total").increment(1);
            continue;
        }

        info!(target: "pipeline", source = %item.source, kind = item.kind.as_str(), title = %item.title, "fresh candidate");
        let decision = pipeline.classifier.classify(&item).await;
        ctx.seen.mark_seen(&id, ctx.now);

        if !decision.relevant {
            info!(
                target: "pipeline",
                classifier = pipeline.classifier.name(),
                rationale = %decision.rationale,
                "ignored (not relevant)"
            );
            continue;
        }
        report.relevant += 1;
        counter!("deals_relevant_total", "classifier" => pipeline.classifier.name()).increment(1);

        let payload = format_alert(&item, decision.verified);
        match ctx.notifier.send(&payload).await {
            Ok(Delivery::Posted) => {
                info!(
                    target: "notify",
                    sink = ctx.notifier.name(),
                    verified = decision.verified,
                    title = %item.title,
                    "alert sent"
                );
                report.delivered += 1;
                counter!("deals_notified_total").increment(1);
            }
            Ok(Delivery::DryRun) => {
                report.dry_run += 1;
                counter!("deals_dry_run_total").increment(1);
            }
            Err(e) => {
                warn!(target: "notify", error = ?e, sink = ctx.notifier.name(), title = %item.title, "alert delivery failed");
                report.delivery_failures += 1;
                counter!("deals_notify_errors_total").increment(1);
            }
        }
    }

    report
}

/// Run every source once, in order. Never fails: problems end up in the report.
pub async fn run_once(sources: &[SourcePipeline], ctx: &RunContext<'_>) -> RunReport {
    ensure_metrics_described();

    let mut report = RunReport::default();
    for p in sources {
        report.sources.push(run_source(p, ctx).await);
    }

    if let Err(e) = ctx.seen.flush() {
        warn!(target: "pipeline", error = ?e, store = ctx.seen.name(), "seen store flush failed");
    }
    gauge!("deals_last_run_ts").set(ctx.now.timestamp() as f64);

    info!(
        target: "pipeline",
        sources = report.sources.len(),
        relevant = report.relevant(),
        delivered = report.delivered(),
        failed_sources = ?report.failed_sources(),
        "run finished"
    );
    report
}
