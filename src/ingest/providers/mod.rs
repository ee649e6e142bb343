// src/ingest/providers/mod.rs
pub mod rss;
pub mod search_api;

use anyhow::{Context, Result};
use std::time::Duration;

/// Shared HTTP client for feed fetches. The user agent doubles as the client
/// identifier that search APIs require.
pub fn build_http_client(user_agent: &str, timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .connect_timeout(Duration::from_secs(4))
        .timeout(timeout)
        .build()
        .context("building feed http client")
}
