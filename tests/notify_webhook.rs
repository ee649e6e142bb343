// tests/notify_webhook.rs
mod common;

use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use deal_watch::notify::{DiscordNotifier, SlackNotifier};
use deal_watch::{format_alert, Delivery, NotificationPayload, Notifier};
use serde_json::Value;

fn capture_router(captured: Arc<Mutex<Vec<Value>>>) -> Router {
    Router::new().route(
        "/hook",
        post(move |Json(body): Json<Value>| {
            let captured = captured.clone();
            async move {
                captured.lock().unwrap().push(body);
                StatusCode::NO_CONTENT
            }
        }),
    )
}

#[tokio::test]
async fn discord_posts_content_field() {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let base = common::serve(capture_router(captured.clone())).await;

    let item = common::item("OOP Alien steelbook", "https://x.test/1", Some(1));
    let payload = format_alert(&item, true);
    let notifier = DiscordNotifier::new(Some(format!("{base}/hook")));
    assert!(notifier.is_configured());
    assert_eq!(notifier.send(&payload).await.unwrap(), Delivery::Posted);

    let got = captured.lock().unwrap().clone();
    assert_eq!(got.len(), 1);
    assert_eq!(got[0]["content"], Value::String(payload.content.clone()));
}

#[tokio::test]
async fn slack_posts_text_field() {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let base = common::serve(capture_router(captured.clone())).await;

    let payload = NotificationPayload {
        content: "\u{1F3F7}\u{FE0F} **DEAL ALERT** (Slickdeals)".into(),
    };
    SlackNotifier::new(Some(format!("{base}/hook")))
        .send(&payload)
        .await
        .expect("delivered");

    let got = captured.lock().unwrap().clone();
    assert_eq!(got[0]["text"], Value::String(payload.content));
    assert!(got[0].get("content").is_none());
}

#[tokio::test]
async fn missing_webhook_is_a_dry_run() {
    let payload = NotificationPayload {
        content: "anything".into(),
    };
    let discord = DiscordNotifier::new(None);
    assert!(!discord.is_configured());
    assert_eq!(discord.send(&payload).await.unwrap(), Delivery::DryRun);
    // blank counts as unset
    assert!(!DiscordNotifier::new(Some("  ".into())).is_configured());
    assert_eq!(SlackNotifier::new(None).send(&payload).await.unwrap(), Delivery::DryRun);
}

#[tokio::test]
async fn non_2xx_surfaces_as_error() {
    let app = Router::new().route("/hook", post(|| async { StatusCode::INTERNAL_SERVER_ERROR }));
    let base = common::serve(app).await;

    let payload = NotificationPayload {
        content: "x".into(),
    };
    let err = DiscordNotifier::new(Some(format!("{base}/hook")))
        .with_timeout(2)
        .send(&payload)
        .await;
    assert!(err.is_err());
}
