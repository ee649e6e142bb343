// src/analyze/oracle.rs
//! Oracle-backed relevance: ask an LLM one yes/no question per title.
//!
//! Contract:
//! - exactly one outbound call per item, no retries;
//! - an answer containing `YES` (any case) accepts and marks the item verified;
//! - a standalone `NO` rejects;
//! - errors, timeouts, missing credentials and anything else go through
//!   the configured [`ErrorPolicy`] (fail-open by default).

use std::collections::BTreeMap;

use async_trait::async_trait;
use metrics::counter;
use tracing::{info, warn};

use super::ai_adapter::DynAiClient;
use super::{ClassificationDecision, ErrorPolicy, RelevanceClassifier};
use crate::ingest::types::Item;

/// Extra facts about an item handed to the prompt (`source`, `community`, ...).
pub type OracleContext = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Yes,
    No,
    Unparseable,
}

/// Case-insensitive: any `YES` substring wins, then a `NO` token, else unparseable.
pub fn parse_verdict(text: &str) -> Verdict {
    let upper = text.trim().to_uppercase();
    if upper.contains("YES") {
        return Verdict::Yes;
    }
    if upper
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|tok| tok == "NO")
    {
        return Verdict::No;
    }
    Verdict::Unparseable
}

pub fn context_for(item: &Item) -> OracleContext {
    let mut ctx = OracleContext::new();
    ctx.insert("source".to_string(), item.source.clone());
    if let Some(c) = &item.context {
        ctx.insert("community".to_string(), c.clone());
    }
    ctx
}

pub fn build_prompt(title: &str, context: &OracleContext) -> String {
    let origin = match context.get("community") {
        Some(c) => format!("r/{c}"),
        None => context
            .get("source")
            .cloned()
            .unwrap_or_else(|| "a deals feed".to_string()),
    };

    let mut extra = String::new();
    for (k, v) in context {
        if k != "community" && k != "source" {
            extra.push_str(&format!("{k}: {v}\n"));
        }
    }

    format!(
        r#"You are a collector-market arbitrage expert screening deal posts.
Post title from {origin}: "{title}"
{extra}
Decide whether this title describes a specific, high-value purchasing opportunity
that could be bought and resold at a clear profit.

Answer YES when it is:
1. A price mistake or glitch (e.g. 90% off).
2. A restock of a collectible edition such as a steelbook.
3. Out of print (OOP) or a limited edition.
4. Likely to clear a margin above $20.

Answer NO when it is:
1. A routine sale (e.g. "Buy 2 Get 1 Free", "$5 off").
2. A common title with no collector value.
3. A question, discussion or show-off post.

Reply with exactly one word: YES or NO."#
    )
}

pub struct OracleClassifier {
    client: DynAiClient,
    on_error: ErrorPolicy,
}

impl OracleClassifier {
    pub fn new(client: DynAiClient, on_error: ErrorPolicy) -> Self {
        Self { client, on_error }
    }

    /// Narrow form: title + context in, yes/no out.
    pub async fn classify_title(&self, title: &str, context: &OracleContext) -> bool {
        self.decide(title, context).await.relevant
    }

    pub async fn decide(&self, title: &str, context: &OracleContext) -> ClassificationDecision {
        let prompt = build_prompt(title, context);
        let provider = self.client.provider_name();

        let raw = match self.client.complete(&prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(target: "classify", error = ?e, provider, %title, "oracle call failed");
                counter!("deals_classifier_errors_total", "kind" => "call").increment(1);
                return self.on_error.resolve("oracle unavailable");
            }
        };

        let verdict = parse_verdict(&raw);
        info!(target: "classify", provider, %title, answer = %raw.trim(), ?verdict, "oracle verdict");
        match verdict {
            Verdict::Yes => ClassificationDecision::accept(true, "oracle: YES"),
            Verdict::No => ClassificationDecision::reject("oracle: NO"),
            Verdict::Unparseable => {
                counter!("deals_classifier_errors_total", "kind" => "unparseable").increment(1);
                self.on_error.resolve("unparseable oracle answer")
            }
        }
    }
}

#[async_trait]
impl RelevanceClassifier for OracleClassifier {
    async fn classify(&self, item: &Item) -> ClassificationDecision {
        self.decide(&item.title, &context_for(item)).await
    }

    fn name(&self) -> &'static str {
        "oracle"
    }
}
