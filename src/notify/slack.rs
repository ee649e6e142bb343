use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

use super::{Delivery, NotificationPayload, Notifier};

pub struct SlackNotifier {
    webhook_url: Option<String>,
    client: Client,
    timeout: Duration,
}

impl SlackNotifier {
    pub fn new(webhook_url: Option<String>) -> Self {
        Self {
            webhook_url: webhook_url.filter(|w| !w.trim().is_empty()),
            client: Client::new(),
            timeout: Duration::from_secs(5),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

#[async_trait::async_trait]
impl Notifier for SlackNotifier {
    async fn send(&self, payload: &NotificationPayload) -> Result<Delivery> {
        let Some(url) = &self.webhook_url else {
            tracing::info!(target: "notify", sink = "slack", content = %payload.content, "dry run: alert not posted");
            return Ok(Delivery::DryRun);
        };

        let body = serde_json::json!({ "text": payload.content });

        self.client
            .post(url)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .context("slack post")?
            .error_for_status()
            .context("slack non-2xx")?;
        Ok(Delivery::Posted)
    }

    fn name(&self) -> &'static str {
        "slack"
    }
}
