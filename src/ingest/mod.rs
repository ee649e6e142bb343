// src/ingest/mod.rs
pub mod freshness;
pub mod providers;
pub mod types;

use crate::ingest::types::Item;
use std::collections::HashSet;

/// Titles longer than this are cut; nothing useful for classification lives past it.
pub const MAX_TITLE_CHARS: usize = 300;

/// Normalize a title: strip tags, decode entities, fold quotes, collapse whitespace.
///
/// Tags are stripped from the raw text only. Escaped brackets (`&lt;GLITCH&gt;`)
/// are title text and must survive into the classifier.
pub fn normalize_text(s: &str) -> String {
    // 1) Strip HTML tags
    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[a-z][^>]*>").unwrap());
    let stripped = re_tags.replace_all(s, "");

    // 2) HTML entity decode (search APIs hand out `&amp;` in titles)
    let mut out = html_escape::decode_html_entities(&stripped).to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out = out.trim().to_string();

    // 5) Length cap
    if out.chars().count() > MAX_TITLE_CHARS {
        out = out.chars().take(MAX_TITLE_CHARS).collect();
    }

    out
}

/// Drop repeats within one batch: same link, or same case-folded title
/// (one deal cross-posted to several communities). First occurrence wins.
/// Returns (kept, dropped_count).
pub fn collapse_duplicates(items: Vec<Item>) -> (Vec<Item>, usize) {
    let mut seen_links: HashSet<String> = HashSet::new();
    let mut seen_titles: HashSet<String> = HashSet::new();
    let mut keep = Vec::with_capacity(items.len());
    let mut dropped = 0usize;

    for it in items {
        let title_key = it.title.to_lowercase();
        if seen_links.contains(&it.link) || seen_titles.contains(&title_key) {
            dropped += 1;
            continue;
        }
        seen_links.insert(it.link.clone());
        seen_titles.insert(title_key);
        keep.push(it);
    }

    (keep, dropped)
}
