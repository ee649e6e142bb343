// tests/pipeline_isolation.rs
mod common;

use std::sync::Arc;

use common::{fixture_now, item, FailingProvider, RecordingNotifier, StaticProvider};
use deal_watch::analyze::KeywordClassifier;
use deal_watch::ingest::freshness::FreshnessWindow;
use deal_watch::notify::DiscordNotifier;
use deal_watch::seen::WindowOnlyStore;
use deal_watch::{run_once, RelevanceClassifier, RunContext, SourcePipeline};

fn keywords() -> Arc<dyn RelevanceClassifier> {
    Arc::new(KeywordClassifier::new(["glitch", "restock"]))
}

#[tokio::test]
async fn failing_source_does_not_stop_the_next() {
    let notifier = RecordingNotifier::default();
    let seen = WindowOnlyStore;
    let ctx = RunContext {
        freshness: FreshnessWindow::new(5.0),
        now: fixture_now(),
        notifier: &notifier,
        seen: &seen,
    };

    let sources = vec![
        SourcePipeline::new(Box::new(FailingProvider), keywords()),
        SourcePipeline::new(
            Box::new(StaticProvider {
                name: "static",
                items: vec![
                    item("Price glitch on Alien 4K", "https://x.test/1", Some(1)),
                    item("Steelbook restock at Target", "https://x.test/2", Some(3)),
                ],
            }),
            keywords(),
        ),
    ];

    let report = run_once(&sources, &ctx).await;

    assert_eq!(notifier.contents().len(), 2);
    assert_eq!(report.sources.len(), 2);
    assert_eq!(report.failed_sources(), vec!["broken"]);
    assert_eq!(report.sources[0].fetched, 0);
    assert!(report.sources[0]
        .fetch_error
        .as_deref()
        .is_some_and(|e| e.contains("connection refused")));
    assert_eq!(report.sources[1].delivered, 2);
}

#[tokio::test]
async fn delivery_failure_is_logged_and_run_continues() {
    let notifier = RecordingNotifier::failing();
    let seen = WindowOnlyStore;
    let ctx = RunContext {
        freshness: FreshnessWindow::new(5.0),
        now: fixture_now(),
        notifier: &notifier,
        seen: &seen,
    };
    let sources = vec![SourcePipeline::new(
        Box::new(StaticProvider {
            name: "static",
            items: vec![
                item("glitch one", "https://x.test/1", Some(1)),
                item("glitch two", "https://x.test/2", Some(2)),
            ],
        }),
        keywords(),
    )];

    let report = run_once(&sources, &ctx).await;

    // one attempt each, no retries
    assert_eq!(notifier.contents().len(), 2);
    assert_eq!(report.delivered(), 0);
    assert_eq!(report.relevant(), 2);
    assert_eq!(report.sources[0].delivery_failures, 2);
    assert!(report.failed_sources().is_empty());
}

#[tokio::test]
async fn all_sources_failing_is_still_a_completed_run() {
    let notifier = RecordingNotifier::default();
    let seen = WindowOnlyStore;
    let ctx = RunContext {
        freshness: FreshnessWindow::new(5.0),
        now: fixture_now(),
        notifier: &notifier,
        seen: &seen,
    };
    let sources = vec![
        SourcePipeline::new(Box::new(FailingProvider), keywords()),
        SourcePipeline::new(Box::new(FailingProvider), keywords()),
    ];

    let report = run_once(&sources, &ctx).await;
    assert!(notifier.contents().is_empty());
    assert_eq!(report.failed_sources().len(), 2);
}

#[tokio::test]
async fn dry_run_is_not_counted_as_delivered() {
    let notifier = DiscordNotifier::new(None);
    let seen = WindowOnlyStore;
    let ctx = RunContext {
        freshness: FreshnessWindow::new(5.0),
        now: fixture_now(),
        notifier: &notifier,
        seen: &seen,
    };
    let sources = vec![SourcePipeline::new(
        Box::new(StaticProvider {
            name: "static",
            items: vec![item("glitch on Heat 4K", "https://x.test/1", Some(1))],
        }),
        keywords(),
    )];

    let report = run_once(&sources, &ctx).await;
    assert_eq!(report.relevant(), 1);
    assert_eq!(report.delivered(), 0);
    assert_eq!(report.sources[0].dry_run, 1);
    assert_eq!(report.sources[0].delivery_failures, 0);
}
