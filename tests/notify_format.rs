// tests/notify_format.rs
mod common;

use deal_watch::{format_alert, Item, SourceKind};

#[test]
fn search_api_alert_layout() {
    let it = common::item(
        "OOP Steelbook restock at Target, 70% off",
        "https://www.reddit.com/r/Steelbooks/comments/1p8a1b/",
        Some(2),
    );
    let p = format_alert(&it, false);
    assert_eq!(
        p.content,
        "\u{1F4B0} **PROFIT OPPORTUNITY** (r/Steelbooks)\n\
         **OOP Steelbook restock at Target, 70% off**\n\
         [View Link](https://www.reddit.com/r/Steelbooks/comments/1p8a1b/)"
    );
}

#[test]
fn verified_alert_uses_robot_symbol() {
    let it = common::item("Misprice on 4K box", "https://x.test/a", Some(1));
    let p = format_alert(&it, true);
    assert!(p.content.starts_with("\u{1F916} **PROFIT OPPORTUNITY** (r/Steelbooks)\n"));
}

#[test]
fn rss_alert_uses_label_and_feed_name() {
    let it = Item {
        source: "Slickdeals".into(),
        kind: SourceKind::Rss,
        title: "Walmart price error: Dune 4K Steelbook $4.99".into(),
        link: "https://slickdeals.net/f/19000001".into(),
        observed_at: None,
        context: None,
    };
    let p = format_alert(&it, false);
    assert_eq!(
        p.content,
        "\u{1F3F7}\u{FE0F} **DEAL ALERT** (Slickdeals)\n\
         **Walmart price error: Dune 4K Steelbook $4.99**\n\
         [View Link](https://slickdeals.net/f/19000001)"
    );
}

#[test]
fn formatting_is_deterministic() {
    let it = common::item("Glitch: $3 steelbook", "https://x.test/b", Some(0));
    for verified in [false, true] {
        assert_eq!(format_alert(&it, verified), format_alert(&it, verified));
    }
}

#[test]
fn title_and_link_are_carried_verbatim() {
    let it = common::item("[US] *Glitch* 4K_box (50% off)", "https://x.test/c?q=a_b&z=1", Some(0));
    let p = format_alert(&it, false);
    assert!(p.content.contains("**[US] *Glitch* 4K_box (50% off)**"));
    assert!(p.content.ends_with("[View Link](https://x.test/c?q=a_b&z=1)"));
}
