// src/ingest/freshness.rs
//! Freshness window: the stateless stand-in for "have we alerted on this yet".
//!
//! The binary is expected to run every `window_minutes`, so each posting falls
//! into exactly one run's window. Items without a timestamp are dropped
//! (fail-closed) because they would otherwise be re-alerted on every run.

use chrono::{DateTime, Duration as ChronoDuration, Utc};

use crate::ingest::types::Item;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreshnessWindow {
    pub window_minutes: f64,
    /// How far in the future a timestamp may lie. `None` accepts any
    /// future-dated item.
    pub future_tolerance: Option<ChronoDuration>,
}

impl FreshnessWindow {
    pub fn new(window_minutes: f64) -> Self {
        Self {
            window_minutes,
            future_tolerance: None,
        }
    }

    pub fn with_future_tolerance(mut self, tolerance: ChronoDuration) -> Self {
        self.future_tolerance = Some(tolerance);
        self
    }

    /// Age of `observed_at` relative to `now`, in fractional minutes.
    pub fn age_minutes(observed_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
        now.signed_duration_since(observed_at).num_milliseconds() as f64 / 60_000.0
    }

    pub fn is_fresh(&self, observed_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        let Some(ts) = observed_at else {
            return false;
        };
        let age = Self::age_minutes(ts, now);
        if age > self.window_minutes {
            return false;
        }
        match self.future_tolerance {
            Some(tol) if age < 0.0 => now.signed_duration_since(ts) >= -tol,
            _ => true,
        }
    }

    /// Keep fresh items, preserving upstream order.
    pub fn retain(&self, items: Vec<Item>, now: DateTime<Utc>) -> Vec<Item> {
        items
            .into_iter()
            .filter(|it| {
                let keep = self.is_fresh(it.observed_at, now);
                if !keep {
                    tracing::debug!(
                        target: "ingest",
                        source = %it.source,
                        title = %it.title,
                        has_ts = it.observed_at.is_some(),
                        "stale or undated item skipped"
                    );
                }
                keep
            })
            .collect()
    }
}

/// Plain form: `[now - window, now]` plus any future-dated items.
pub fn filter_fresh(items: Vec<Item>, window_minutes: f64, now: DateTime<Utc>) -> Vec<Item> {
    FreshnessWindow::new(window_minutes).retain(items, now)
}
