//! Integration tests for Slice 5 - HTTP API
//!
//! Tests the overlay endpoints. The router is cloned per request; clones share
//! one engine.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use goalring::core::{create_router, GoalEngine, MemoryStore};
use goalring::types::{ArcPreset, EventType, GoalConfig};
use serde_json::Value;
use tower::ServiceExt;

fn create_test_router() -> Router {
    let config = GoalConfig {
        event_type: EventType::Donation,
        starting_value: 10.0,
        shape: ArcPreset::Semicircle,
        label_prefix: "$".to_string(),
        ..Default::default()
    };
    create_router(GoalEngine::new(config, Arc::new(MemoryStore::new())))
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

async fn post_event(app: &Router, body: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/event")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_router();
    let (status, json) = get_json(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_initial_state() {
    let app = create_test_router();
    let (status, json) = get_json(&app, "/state").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["current"], 10.0);
    assert_eq!(json["target"], 100.0);
    assert_eq!(json["percent"], 10);
    assert_eq!(json["update_count"], 0);
}

#[tokio::test]
async fn test_tip_event_updates_state() {
    let app = create_test_router();

    let (status, json) =
        post_event(&app, r#"{"kind": "tip-latest", "payload": {"amount": 15}}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["handled"], true);
    assert_eq!(json["kind"], "tip-latest");
    assert_eq!(json["output"]["current"], 25.0);

    let (_, state) = get_json(&app, "/state").await;
    assert_eq!(state["current"], 25.0);
    assert_eq!(state["update_count"], 1);
}

#[tokio::test]
async fn test_unhandled_event() {
    let app = create_test_router();

    let (status, json) = post_event(&app, r#"{"kind": "subscriber-latest"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["handled"], false);
    assert!(json.get("output").is_none());
}

#[tokio::test]
async fn test_chat_command_event() {
    let app = create_test_router();

    let body = r#"{"kind": "message", "payload": {"data": {
        "nick": "mod_one", "channel": "streamer", "text": "!setgoal 400",
        "tags": {"mod": "1"}
    }}}"#;
    let (_, json) = post_event(&app, body).await;
    assert_eq!(json["handled"], true);

    let (_, state) = get_json(&app, "/state").await;
    assert_eq!(state["target"], 400.0);
}

#[tokio::test]
async fn test_malformed_event_rejected() {
    let app = create_test_router();

    let (status, json) = post_event(&app, "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], 400);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_frame_endpoint() {
    let app = create_test_router();
    post_event(&app, r#"{"kind": "tip-latest", "payload": {"amount": 40}}"#).await;

    let (status, frame) = get_json(&app, "/frame").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(frame["preset"], "semicircle");
    assert_eq!(frame["fraction"], 0.5);
    assert_eq!(frame["labels"]["current"], "$50");
    assert_eq!(frame["labels"]["percent"], "50%");
    assert!(frame["path"].as_str().unwrap().starts_with("M "));
}
