use super::{Delivery, NotificationPayload, Notifier};
use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

/// Discord webhook sink. No webhook configured = dry run (alert logged, not posted).
#[derive(Clone)]
pub struct DiscordNotifier {
    webhook: Option<String>,
    client: Client,
    timeout: Duration,
}

impl DiscordNotifier {
    pub fn new(webhook: Option<String>) -> Self {
        Self {
            webhook: webhook.filter(|w| !w.trim().is_empty()),
            client: Client::new(),
            timeout: Duration::from_secs(5),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn is_configured(&self) -> bool {
        self.webhook.is_some()
    }
}

#[async_trait::async_trait]
impl Notifier for DiscordNotifier {
    async fn send(&self, payload: &NotificationPayload) -> Result<Delivery> {
        let Some(url) = &self.webhook else {
            tracing::info!(target: "notify", sink = "discord", content = %payload.content, "dry run: alert not posted");
            return Ok(Delivery::DryRun);
        };

        // Single attempt; the run moves on whatever happens.
        self.client
            .post(url)
            .timeout(self.timeout)
            .json(payload)
            .send()
            .await
            .context("discord post")?
            .error_for_status()
            .context("discord non-2xx")?;
        Ok(Delivery::Posted)
    }

    fn name(&self) -> &'static str {
        "discord"
    }
}
