//! Router and request handlers

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use newsdesk_core::MessageContent;
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{ApiError, AppState};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/thread", get(create_thread).post(create_thread))
        .route("/message", post(send_message))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadResponse {
    pub session_id: String,
    /// Same value as `session_id`, for older clients
    pub thread_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRequest {
    pub message: String,
    pub thread_id: String,
}

/// Content arrays of every message in the thread, in vendor order
#[derive(Debug, Serialize, Deserialize)]
pub struct MessagesResponse {
    pub messages: Vec<Vec<MessageContent>>,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn create_thread(State(state): State<AppState>) -> Result<Json<ThreadResponse>, ApiError> {
    let id = state.conversations.create_session().await?;
    Ok(Json(ThreadResponse {
        session_id: id.clone(),
        thread_id: id,
    }))
}

async fn send_message(
    State(state): State<AppState>,
    body: Result<Json<MessageRequest>, JsonRejection>,
) -> Result<Json<MessagesResponse>, ApiError> {
    let Json(request) = body?;
    info!(thread_id = %request.thread_id, "Message received");

    let messages = state
        .conversations
        .send_message(&request.thread_id, &request.message)
        .await?;

    Ok(Json(MessagesResponse {
        messages: messages.into_iter().map(|m| m.content).collect(),
    }))
}
