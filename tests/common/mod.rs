// tests/common/mod.rs
// Shared fakes for integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use deal_watch::analyze::ai_adapter::{AiClient, BoxFuture};
use deal_watch::{Delivery, Item, NotificationPayload, Notifier, SourceKind, SourceProvider};

/// 2025-11-28T14:00:00Z, the "now" the fixtures are written against.
pub fn fixture_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 11, 28, 14, 0, 0).unwrap()
}

pub fn item(title: &str, link: &str, age_minutes: Option<i64>) -> Item {
    Item {
        source: "r/Steelbooks".to_string(),
        kind: SourceKind::SearchApi,
        title: title.to_string(),
        link: link.to_string(),
        observed_at: age_minutes.map(|m| fixture_now() - ChronoDuration::minutes(m)),
        context: Some("Steelbooks".to_string()),
    }
}

/// Returns a fixed batch.
pub struct StaticProvider {
    pub name: &'static str,
    pub items: Vec<Item>,
}

#[async_trait]
impl SourceProvider for StaticProvider {
    async fn fetch_latest(&self) -> Result<Vec<Item>> {
        Ok(self.items.clone())
    }
    fn name(&self) -> &str {
        self.name
    }
}

/// Always fails, like an unreachable upstream.
pub struct FailingProvider;

#[async_trait]
impl SourceProvider for FailingProvider {
    async fn fetch_latest(&self) -> Result<Vec<Item>> {
        Err(anyhow!("connection refused"))
    }
    fn name(&self) -> &str {
        "broken"
    }
}

/// Captures payloads; optionally fails every send.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<NotificationPayload>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn contents(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|p| p.content.clone())
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, payload: &NotificationPayload) -> Result<Delivery> {
        self.sent.lock().unwrap().push(payload.clone());
        if self.fail {
            return Err(anyhow!("webhook returned 500"));
        }
        Ok(Delivery::Posted)
    }
    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Oracle fake that counts calls and replays one answer.
pub struct CountingOracle {
    pub calls: Arc<AtomicUsize>,
    pub answer: std::result::Result<&'static str, &'static str>,
}

impl CountingOracle {
    pub fn new(answer: std::result::Result<&'static str, &'static str>) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            answer,
        }
    }
}

impl AiClient for CountingOracle {
    fn complete<'a>(&'a self, _prompt: &'a str) -> BoxFuture<'a, Result<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let out = self.answer.map(str::to_string).map_err(|e| anyhow!(e));
        Box::pin(async move { out })
    }
    fn provider_name(&self) -> &'static str {
        "counting"
    }
}

/// Spawn `router` on an ephemeral local port; returns its base URL.
pub async fn serve(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}
