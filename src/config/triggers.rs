// src/config/triggers.rs
//! Keyword trigger list for the keyword classifier.
//!
//! Resolution order, first hit wins:
//! 1. `KEYWORD_TRIGGERS` (comma-separated, inline)
//! 2. `TRIGGERS_PATH` (must exist)
//! 3. `config/triggers.toml`, then `config/triggers.json`
//! 4. built-in [`DEFAULT_TRIGGERS`]

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use super::{non_empty, Lookup};
use crate::analyze::keywords::DEFAULT_TRIGGERS;

const CONFIG_DIR_CANDIDATES: &[&str] = &["config/triggers.toml", "config/triggers.json"];

/// File format, picked from the extension only; content is never sniffed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TriggerFormat {
    /// `triggers = ["glitch", "price error"]`
    Toml,
    /// `["glitch", "price error"]`
    Json,
    /// One trigger per line, `#` starts a comment.
    Lines,
}

#[derive(Deserialize)]
struct TriggerTable {
    triggers: Vec<String>,
}

impl TriggerFormat {
    fn for_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("toml") => TriggerFormat::Toml,
            Some("json") => TriggerFormat::Json,
            _ => TriggerFormat::Lines,
        }
    }

    fn parse(self, s: &str) -> Result<Vec<String>> {
        let raw = match self {
            TriggerFormat::Toml => toml::from_str::<TriggerTable>(s)?.triggers,
            TriggerFormat::Json => serde_json::from_str::<Vec<String>>(s)?,
            TriggerFormat::Lines => s
                .lines()
                .map(|l| l.split('#').next().unwrap_or_default().to_string())
                .collect(),
        };
        let cleaned = clean_list(raw);
        if cleaned.is_empty() {
            bail!("trigger list is empty");
        }
        Ok(cleaned)
    }
}

pub fn load_triggers_from(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading triggers from {}", path.display()))?;
    TriggerFormat::for_path(path)
        .parse(&content)
        .with_context(|| format!("parsing triggers in {}", path.display()))
}

pub fn load_triggers(lookup: Lookup<'_>) -> Result<Vec<String>> {
    if let Some(inline) = non_empty(lookup, "KEYWORD_TRIGGERS") {
        return Ok(clean_list(inline.split(',').map(str::to_string).collect()));
    }
    if let Some(p) = non_empty(lookup, "TRIGGERS_PATH") {
        let path = Path::new(&p);
        if !path.exists() {
            bail!("TRIGGERS_PATH points to non-existent path {p}");
        }
        return load_triggers_from(path);
    }
    match CONFIG_DIR_CANDIDATES.iter().map(Path::new).find(|p| p.exists()) {
        Some(path) => load_triggers_from(path),
        None => Ok(DEFAULT_TRIGGERS.iter().map(|s| s.to_string()).collect()),
    }
}

/// Trim, lower-case, drop empties and duplicates; first occurrence keeps its slot.
fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for it in items {
        let t = it.trim().to_lowercase();
        if !t.is_empty() && !out.contains(&t) {
            out.push(t);
        }
    }
    out
}
