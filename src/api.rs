//! REST API Server for the advice client
//!
//! Exposes the chat, dashboard and insights surfaces over HTTP, plus a
//! server-sent event stream of store snapshots.

use axum::{
    extract::State,
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::{Stream, StreamExt};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::chat::{ChatSession, SendOutcome};
use crate::dashboard::DashboardView;
use crate::insights::{InsightsGenerator, InsightsOutcome};
use crate::state::SharedStore;

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatRequest {
    pub message: String,
}

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub store: SharedStore,
    pub chat: Arc<ChatSession>,
    pub insights: Arc<InsightsGenerator>,
}

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Chat Endpoints
/// =============================

async fn list_messages(State(state): State<ApiState>) -> Json<ApiResponse> {
    let store = state.store.lock().await;
    Json(ApiResponse::success(store.current_log()))
}

async fn chat_handler(
    State(state): State<ApiState>,
    Json(req): Json<ChatRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    let outcome = state.chat.send_message(&req.message).await;
    info!(?outcome, "Chat message handled");

    if outcome == SendOutcome::Ignored {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("Message must not be empty".into())),
        );
    }

    let label = match outcome {
        SendOutcome::Answered => "answered",
        _ => "failed",
    };

    let snapshot = state.store.lock().await.snapshot();
    (
        StatusCode::OK,
        Json(ApiResponse::success(serde_json::json!({
            "outcome": label,
            "snapshot": snapshot,
        }))),
    )
}

async fn clear_chat(State(state): State<ApiState>) -> Json<ApiResponse> {
    state.chat.clear_chat().await;
    let snapshot = state.store.lock().await.snapshot();
    Json(ApiResponse::success(snapshot))
}

/// =============================
/// Dashboard & Insights
/// =============================

async fn dashboard(State(state): State<ApiState>) -> Json<ApiResponse> {
    let snapshot = state.store.lock().await.snapshot();
    Json(ApiResponse::success(DashboardView::from_snapshot(&snapshot)))
}

async fn insights(State(state): State<ApiState>) -> (StatusCode, Json<ApiResponse>) {
    match state.insights.generate().await {
        InsightsOutcome::NoConversation => (
            StatusCode::CONFLICT,
            Json(ApiResponse::error("No conversation to summarize".into())),
        ),
        InsightsOutcome::Busy => (
            StatusCode::TOO_MANY_REQUESTS,
            Json(ApiResponse::error("Insights are already being generated".into())),
        ),
        InsightsOutcome::Generated { html } => (
            StatusCode::OK,
            Json(ApiResponse::success(serde_json::json!({ "html": html }))),
        ),
        InsightsOutcome::Failed { html } => (
            StatusCode::BAD_GATEWAY,
            Json(ApiResponse::success(serde_json::json!({ "html": html }))),
        ),
    }
}

/// =============================
/// Snapshot Stream
/// =============================

async fn events(
    State(state): State<ApiState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let subscription = state.store.lock().await.subscribe();
    info!(subscriber_id = %subscription.id(), "Snapshot stream opened");

    let stream = subscription.into_stream().map(|snapshot| {
        let event = Event::default()
            .event("snapshot")
            .json_data(snapshot.as_ref())
            .unwrap_or_else(|_| Event::default().event("error"));
        Ok(event)
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

/// =============================
/// Router
/// =============================

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/messages", get(list_messages))
        .route("/api/chat", post(chat_handler).delete(clear_chat))
        .route("/api/dashboard", get(dashboard))
        .route("/api/insights", post(insights))
        .route("/api/events", get(events))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    state: ApiState,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}
