// tests/classifier_keywords.rs
mod common;

use common::item;
use deal_watch::analyze::KeywordClassifier;
use deal_watch::RelevanceClassifier;

#[test]
fn trigger_match_is_case_insensitive() {
    let k = KeywordClassifier::new(["glitch", "restock"]);
    assert!(k.is_relevant("STEELBOOK glitch sale"));
    assert!(k.is_relevant("Steelbook GLITCH sale"));
    assert!(!k.is_relevant("weekly roundup"));
}

#[test]
fn same_title_same_answer() {
    let k = KeywordClassifier::new(["glitch"]);
    for _ in 0..3 {
        assert!(k.is_relevant("STEELBOOK glitch sale"));
        assert!(!k.is_relevant("weekly roundup"));
    }
}

#[tokio::test]
async fn keyword_accepts_are_never_verified() {
    let k = KeywordClassifier::new(["restock"]);
    let d = k
        .classify(&item("OOP Steelbook restock", "https://x.test/1", Some(1)))
        .await;
    assert!(d.relevant);
    assert!(!d.verified);
    assert_eq!(d.rationale, "keyword:restock");

    let d = k
        .classify(&item("Look what I bought", "https://x.test/2", Some(1)))
        .await;
    assert!(!d.relevant);
}
