// src/notify/mod.rs
pub mod discord;
pub mod slack;

use anyhow::Result;
use serde::Serialize;

use crate::ingest::types::Item;

pub use discord::DiscordNotifier;
pub use slack::SlackNotifier;

/// Rendered alert, serialized as-is for Discord (`{"content": ...}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationPayload {
    pub content: String,
}

/// What happened to a payload that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Accepted by the webhook.
    Posted,
    /// No webhook configured; the alert was written to the log instead.
    DryRun,
}

/// Best-effort sink for one payload. Implementations do a single attempt;
/// the caller logs errors and moves on.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, payload: &NotificationPayload) -> Result<Delivery>;
    fn name(&self) -> &'static str;
}

/// Pure: same `(item, verified)` always renders the same bytes.
pub fn format_alert(item: &Item, verified: bool) -> NotificationPayload {
    let p = item.kind.presentation();
    let symbol = if verified { p.verified_symbol } else { p.symbol };
    NotificationPayload {
        content: format!(
            "{symbol} **{headline}** ({source})\n**{title}**\n[View Link]({link})",
            headline = p.headline,
            source = item.source,
            title = item.title,
            link = item.link,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::types::SourceKind;

    fn item(kind: SourceKind) -> Item {
        Item {
            source: "r/Steelbooks".into(),
            kind,
            title: "Alien OOP steelbook".into(),
            link: "https://www.reddit.com/r/Steelbooks/comments/x1/".into(),
            observed_at: None,
            context: Some("Steelbooks".into()),
        }
    }

    #[test]
    fn verified_switches_symbol_only() {
        let a = format_alert(&item(SourceKind::SearchApi), false);
        let b = format_alert(&item(SourceKind::SearchApi), true);
        assert!(a.content.starts_with("\u{1F4B0} **PROFIT OPPORTUNITY**"));
        assert!(b.content.starts_with("\u{1F916} **PROFIT OPPORTUNITY**"));
        let tail = |s: &str| s.split_once(' ').map(|(_, t)| t.to_string());
        assert_eq!(tail(&a.content), tail(&b.content));
    }

    #[test]
    fn rss_kind_has_its_own_presentation() {
        let p = format_alert(&item(SourceKind::Rss), false);
        assert!(p.content.contains("**DEAL ALERT**"));
        assert!(p.content.ends_with("[View Link](https://www.reddit.com/r/Steelbooks/comments/x1/)"));
    }

    #[test]
    fn payload_serializes_as_discord_body() {
        let p = NotificationPayload {
            content: "hi".into(),
        };
        assert_eq!(serde_json::to_string(&p).unwrap(), r#"{"content":"hi"}"#);
    }
}
