// src/analyze/keywords.rs
//! Keyword-trigger classifier: substring match against a fixed trigger list.

use async_trait::async_trait;

use super::{ClassificationDecision, RelevanceClassifier};
use crate::ingest::types::Item;

/// Default triggers for feeds without an oracle (price mistakes only).
pub const DEFAULT_TRIGGERS: &[&str] = &["glitch", "price error", "mistake"];

#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    // stored lower-cased
    triggers: Vec<String>,
}

impl KeywordClassifier {
    /// Empty and whitespace-only triggers are dropped; duplicates collapse.
    pub fn new<I, S>(triggers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for t in triggers {
            let t = t.as_ref().trim().to_lowercase();
            if !t.is_empty() && !out.contains(&t) {
                out.push(t);
            }
        }
        Self { triggers: out }
    }

    pub fn triggers(&self) -> &[String] {
        &self.triggers
    }

    /// First trigger contained in the title, if any.
    pub fn matched_trigger(&self, title: &str) -> Option<&str> {
        let lower = title.to_lowercase();
        self.triggers
            .iter()
            .find(|t| lower.contains(t.as_str()))
            .map(|t| t.as_str())
    }

    pub fn is_relevant(&self, title: &str) -> bool {
        self.matched_trigger(title).is_some()
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_TRIGGERS.iter().copied())
    }
}

#[async_trait]
impl RelevanceClassifier for KeywordClassifier {
    async fn classify(&self, item: &Item) -> ClassificationDecision {
        match self.matched_trigger(&item.title) {
            Some(t) => ClassificationDecision::accept(false, format!("keyword:{t}")),
            None => ClassificationDecision::reject("no trigger matched"),
        }
    }

    fn name(&self) -> &'static str {
        "keyword"
    }
}
