// src/config/mod.rs
//! Runtime configuration. Everything comes from the environment (optionally
//! seeded from `.env`), read through a lookup function so tests can inject
//! values without touching the process env.

pub mod ai;
pub mod app;
pub mod triggers;

use anyhow::{anyhow, Result};
use std::str::FromStr;

pub use app::AppConfig;

/// Key → value source (normally `std::env::var`).
pub type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

pub fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Non-empty, trimmed value for `key`.
pub(crate) fn non_empty(lookup: Lookup<'_>, key: &str) -> Option<String> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse `key` if set; unset or blank yields `default`, garbage is an error.
pub(crate) fn parse_or<T>(lookup: Lookup<'_>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty(lookup, key) {
        None => Ok(default),
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow!("invalid value for {key}={raw:?}: {e}")),
    }
}

pub(crate) fn parse_opt<T>(lookup: Lookup<'_>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty(lookup, key) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow!("invalid value for {key}={raw:?}: {e}")),
    }
}

/// `1`, `true`, `yes`, `on` (any case) are true; everything else false.
pub(crate) fn flag(lookup: Lookup<'_>, key: &str) -> bool {
    non_empty(lookup, key).is_some_and(|v| {
        matches!(
            v.to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}
