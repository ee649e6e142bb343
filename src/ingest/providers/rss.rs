// src/ingest/providers/rss.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::histogram;
use quick_xml::de::from_str;
use serde::Deserialize;

use crate::ingest::normalize_text;
use crate::ingest::types::{Item, SourceKind, SourceProvider};

pub const DEFAULT_RSS_LIMIT: usize = 5;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
}

/// RFC 2822 (`pubDate`) first, RFC 3339 as a fallback. Unparseable → `None`;
/// never substitute "now".
pub(crate) fn parse_pub_date(ts: &str) -> Option<DateTime<Utc>> {
    let ts = ts.trim();
    if ts.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc2822(ts)
        .or_else(|_| DateTime::parse_from_rfc3339(ts))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

pub struct RssProvider {
    name: String,
    limit: usize,
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http {
        url: String,
        client: reqwest::Client,
    },
}

impl RssProvider {
    pub fn from_url(name: impl Into<String>, url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            name: name.into(),
            limit: DEFAULT_RSS_LIMIT,
            mode: Mode::Http {
                url: url.into(),
                client,
            },
        }
    }

    pub fn from_fixture_str(name: impl Into<String>, xml: &str) -> Self {
        Self {
            name: name.into(),
            limit: DEFAULT_RSS_LIMIT,
            mode: Mode::Fixture(xml.to_string()),
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn parse_entries(&self, xml: &str) -> Result<Vec<Item>> {
        let t0 = std::time::Instant::now();
        let xml_clean = scrub_html_entities_for_xml(xml);
        let rss: Rss = from_str(&xml_clean).context("parsing rss xml")?;

        let mut out = Vec::with_capacity(rss.channel.item.len().min(self.limit));
        for entry in rss.channel.item.into_iter().take(self.limit) {
            let title = normalize_text(entry.title.as_deref().unwrap_or_default());
            let link = entry.link.map(|l| l.trim().to_string()).unwrap_or_default();
            if title.is_empty() || link.is_empty() {
                continue;
            }

            out.push(Item {
                source: self.name.clone(),
                kind: SourceKind::Rss,
                title,
                link,
                observed_at: entry.pub_date.as_deref().and_then(parse_pub_date),
                context: None,
            });
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("deals_parse_ms").record(ms);
        Ok(out)
    }
}

#[async_trait]
impl SourceProvider for RssProvider {
    async fn fetch_latest(&self) -> Result<Vec<Item>> {
        let items = match &self.mode {
            Mode::Fixture(s) => self.parse_entries(s)?,
            Mode::Http { url, client } => {
                let body = client
                    .get(url.as_str())
                    .send()
                    .await
                    .with_context(|| format!("{} http get()", self.name))?
                    .error_for_status()
                    .with_context(|| format!("{} non-2xx", self.name))?
                    .text()
                    .await
                    .with_context(|| format!("{} http .text()", self.name))?;
                self.parse_entries(&body)?
            }
        };
        Ok(items)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Entities that are legal in HTML but not in XML; quick-xml rejects them.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&trade;", "(TM)")
        .replace("&reg;", "(R)")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn pub_date_formats() {
        let expected = Utc.with_ymd_and_hms(2025, 11, 28, 14, 3, 0).unwrap();
        assert_eq!(parse_pub_date("Fri, 28 Nov 2025 09:03:00 -0500"), Some(expected));
        assert_eq!(parse_pub_date("2025-11-28T14:03:00Z"), Some(expected));
        assert_eq!(parse_pub_date("yesterday-ish"), None);
        assert_eq!(parse_pub_date("  "), None);
    }

    #[test]
    fn empty_channel_yields_no_items() {
        let xml = r#"<rss version="2.0"><channel><title>x</title></channel></rss>"#;
        let p = RssProvider::from_fixture_str("Slickdeals", xml);
        assert!(p.parse_entries(xml).unwrap().is_empty());
    }

    #[test]
    fn limit_bounds_entries_considered() {
        let mut xml = String::from(r#"<rss version="2.0"><channel>"#);
        for i in 0..8 {
            xml.push_str(&format!(
                "<item><title>Deal {i}</title><link>https://d.test/{i}</link></item>"
            ));
        }
        xml.push_str("</channel></rss>");
        let p = RssProvider::from_fixture_str("Slickdeals", &xml).with_limit(3);
        let items = p.parse_entries(&xml).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[2].title, "Deal 2");
        assert!(items.iter().all(|i| i.observed_at.is_none()));
    }
}
