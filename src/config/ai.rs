// src/config/ai.rs
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use super::{non_empty, parse_or, Lookup};

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_enabled() -> bool {
    true
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OracleConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// "gemini" | "openai" (case-insensitive)
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    /// "ENV" means: read from GEMINI_API_KEY / OPENAI_API_KEY (by provider)
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// `Some("mock")` swaps in a deterministic mock oracle.
    #[serde(default)]
    pub test_mode: Option<String>,
}

// Hand-written so the key never reaches a log line.
impl std::fmt::Debug for OracleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleConfig")
            .field("enabled", &self.enabled)
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("key_len", &self.api_key.len())
            .field("timeout_secs", &self.timeout_secs)
            .field("test_mode", &self.test_mode)
            .finish()
    }
}

fn key_var(provider: &str) -> Result<&'static str> {
    match provider {
        "gemini" => Ok("GEMINI_API_KEY"),
        "openai" => Ok("OPENAI_API_KEY"),
        other => bail!("Unsupported oracle provider: {other}"),
    }
}

impl OracleConfig {
    /// `ORACLE_CONFIG_PATH` (JSON file) if set, else plain env vars.
    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Self> {
        if let Some(path) = non_empty(lookup, "ORACLE_CONFIG_PATH") {
            return Self::load_from_file(path, lookup);
        }

        let provider = non_empty(lookup, "ORACLE_PROVIDER")
            .unwrap_or_else(default_provider)
            .to_lowercase();
        let api_key = non_empty(lookup, key_var(&provider)?).unwrap_or_default();

        Ok(Self {
            enabled: parse_or(lookup, "ORACLE_ENABLED", true)?,
            provider,
            model: non_empty(lookup, "ORACLE_MODEL"),
            api_key,
            timeout_secs: parse_or(lookup, "ORACLE_TIMEOUT_SECS", default_timeout_secs())?,
            test_mode: non_empty(lookup, "AI_TEST_MODE"),
        })
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P, lookup: Lookup<'_>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading oracle config from {}", path.display()))?;
        let mut cfg: OracleConfig = serde_json::from_str(&data)
            .with_context(|| format!("parsing oracle config {}", path.display()))?;

        // Normalize provider
        cfg.provider = cfg.provider.to_lowercase();
        let var = key_var(&cfg.provider)?;

        // Resolve api key if "ENV"; a missing variable just disables the oracle.
        if cfg.api_key.trim().eq_ignore_ascii_case("env") {
            cfg.api_key = non_empty(lookup, var).unwrap_or_default();
        }
        if cfg.test_mode.is_none() {
            cfg.test_mode = non_empty(lookup, "AI_TEST_MODE");
        }

        Ok(cfg)
    }

    pub fn has_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}
