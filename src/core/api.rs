//! HTTP + WebSocket API for the overlay
//!
//! Endpoints:
//! - GET /health - Health check
//! - GET /state - Current progress numbers
//! - GET /frame - Render frame for the configured shape
//! - POST /event - Host event `{kind, payload}`
//! - WS /ws - Live updates (engine output + render frame)

use axum::{
    extract::{State, WebSocketUpgrade, ws::{Message, WebSocket}},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};

use crate::core::{GoalEngine, RenderFrame};
use crate::error::ApiError;
use crate::types::{ArcPreset, GoalPhase, InboundEvent, ProgressOutput, RawEvent};

/// App state. The mutex serializes events: one is fully applied before the next.
pub struct AppState {
    pub engine: Mutex<GoalEngine>,
    pub preset: ArcPreset,
    pub label_prefix: String,
}

/// Live update message
#[derive(Debug, Clone, Serialize)]
pub struct LiveUpdate {
    pub output: ProgressOutput,
    pub frame: RenderFrame,
}

/// Progress numbers
#[derive(Debug, Serialize)]
pub struct StateResponse {
    pub current: f64,
    pub target: f64,
    pub phase: GoalPhase,
    pub fraction: f64,
    pub percent: i64,
    pub update_count: u64,
}

/// Result of posting an event
#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub handled: bool,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<ProgressOutput>,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Create the API router around an engine
pub fn create_router(engine: GoalEngine) -> Router {
    let preset = engine.config().shape;
    let label_prefix = engine.config().label_prefix.clone();
    let state = Arc::new(AppState {
        engine: Mutex::new(engine),
        preset,
        label_prefix,
    });

    Router::new()
        .route("/health", get(health))
        .route("/state", get(get_state))
        .route("/frame", get(get_frame))
        .route("/event", post(post_event))
        .route("/ws", get(websocket_handler))
        .with_state(state)
}

/// Health check endpoint
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
    })
}

/// Current numbers
async fn get_state(State(state): State<Arc<AppState>>) -> Json<StateResponse> {
    let engine = state.engine.lock().await;
    let progress = engine.state();
    Json(StateResponse {
        current: progress.current,
        target: progress.target,
        phase: engine.phase(),
        fraction: progress.fraction(),
        percent: progress.percent(),
        update_count: engine.update_count(),
    })
}

/// Render frame for the current state
async fn get_frame(State(state): State<Arc<AppState>>) -> Json<RenderFrame> {
    let engine = state.engine.lock().await;
    let output = engine.current_output();
    Json(RenderFrame::from_output(state.preset, &output, &state.label_prefix))
}

/// Apply one host event
async fn post_event(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Json<EventResponse>, ApiError> {
    let raw: RawEvent =
        serde_json::from_str(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let event = InboundEvent::decode(&raw);

    let mut engine = state.engine.lock().await;
    let output = engine.handle_event(&event);
    if output.is_none() {
        tracing::debug!(kind = %raw.kind, "event not handled");
    }

    Ok(Json(EventResponse {
        handled: output.is_some(),
        kind: raw.kind,
        output,
    }))
}

/// WebSocket handler for live updates
async fn websocket_handler(
    State(state): State<Arc<AppState>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let rx = state.engine.lock().await.subscribe();
    let preset = state.preset;
    let prefix = state.label_prefix.clone();

    ws.on_upgrade(move |socket| async move {
        handle_websocket(socket, rx, preset, prefix).await;
    })
}

/// Push updates until either side goes away
async fn handle_websocket(
    socket: WebSocket,
    mut rx: broadcast::Receiver<ProgressOutput>,
    preset: ArcPreset,
    prefix: String,
) {
    let (mut sender, mut receiver) = socket.split();

    let mut send_task = tokio::spawn(async move {
        loop {
            let output = match rx.recv().await {
                Ok(output) => output,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "live update subscriber lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };
            let update = LiveUpdate {
                frame: RenderFrame::from_output(preset, &output, &prefix),
                output,
            };
            let json = serde_json::to_string(&update).unwrap_or_default();
            if sender.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            if matches!(message, Message::Close(_)) {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }
}

/// Run the API server
pub async fn run_server(addr: &str, engine: GoalEngine) -> Result<(), Box<dyn std::error::Error>> {
    let router = create_router(engine);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "goal overlay API listening");
    println!("🎯 Goalring API running on {}", addr);
    println!("  GET  /health - Health check");
    println!("  GET  /state  - Progress numbers");
    println!("  GET  /frame  - Render frame");
    println!("  POST /event  - Host event {{kind, payload}}");
    println!("  WS   /ws     - Live updates");
    axum::serve(listener, router).await?;
    Ok(())
}
