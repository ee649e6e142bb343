// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod analyze;
pub mod bootstrap;
pub mod config;
pub mod guard;
pub mod ingest;
pub mod notify;
pub mod pipeline;
pub mod seen;
pub mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::analyze::{ClassificationDecision, ErrorPolicy, RelevanceClassifier};
pub use crate::config::AppConfig;
pub use crate::ingest::types::{Item, SourceKind, SourceProvider};
pub use crate::notify::{format_alert, Delivery, NotificationPayload, Notifier};
pub use crate::pipeline::{run_once, RunContext, RunReport, SourcePipeline};
pub use crate::seen::SeenItemStore;
