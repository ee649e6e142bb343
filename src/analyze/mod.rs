// src/analyze/mod.rs
//! Relevance classification: is a fresh item worth an alert?
//!
//! Two strategies share one trait and are chosen per source:
//! - [`keywords::KeywordClassifier`]: deterministic trigger-word match.
//! - [`oracle::OracleClassifier`]: one yes/no question to an LLM, with an
//!   explicit [`ErrorPolicy`] for when the answer cannot be obtained.

pub mod ai_adapter;
pub mod keywords;
pub mod oracle;

use async_trait::async_trait;
use std::str::FromStr;

use crate::ingest::types::Item;

pub use crate::analyze::keywords::KeywordClassifier;
pub use crate::analyze::oracle::OracleClassifier;

/// Outcome for a single item. Consumed immediately by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationDecision {
    pub relevant: bool,
    /// True only when the oracle itself said yes.
    pub verified: bool,
    pub rationale: String,
}

impl ClassificationDecision {
    pub fn accept(verified: bool, rationale: impl Into<String>) -> Self {
        Self {
            relevant: true,
            verified,
            rationale: rationale.into(),
        }
    }

    pub fn reject(rationale: impl Into<String>) -> Self {
        Self {
            relevant: false,
            verified: false,
            rationale: rationale.into(),
        }
    }
}

#[async_trait]
pub trait RelevanceClassifier: Send + Sync {
    async fn classify(&self, item: &Item) -> ClassificationDecision;
    /// Strategy name for logs/metrics.
    fn name(&self) -> &'static str;
}

/// What to do when the oracle cannot give a usable verdict
/// (error, timeout, missing credentials, unparseable answer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Fail-open: alert anyway rather than silently drop a real deal.
    #[default]
    Accept,
    Reject,
}

impl ErrorPolicy {
    pub fn resolve(self, reason: &str) -> ClassificationDecision {
        match self {
            ErrorPolicy::Accept => ClassificationDecision::accept(false, format!("fail-open: {reason}")),
            ErrorPolicy::Reject => ClassificationDecision::reject(format!("fail-closed: {reason}")),
        }
    }
}

impl FromStr for ErrorPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accept" | "open" | "fail-open" => Ok(ErrorPolicy::Accept),
            "reject" | "closed" | "fail-closed" => Ok(ErrorPolicy::Reject),
            other => anyhow::bail!("unknown classifier error policy: {other}"),
        }
    }
}
