//! `/api` handlers: chat turns, transcripts, and session listing.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use helpdesk_core::error::Error;
use helpdesk_core::message::{Role, Session, SessionId, StoredMessage};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::SharedState;

/// Body returned for every handled failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub const UNAVAILABLE_MESSAGE: &str =
    "The assistant is temporarily unavailable. Please try again later.";
pub const INTERNAL_ERROR_MESSAGE: &str =
    "An internal server error occurred. Please try again later.";

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Map a pipeline error to a client-safe response.
///
/// Internal messages are logged and never returned.
fn map_error(e: Error) -> ApiError {
    match e {
        Error::InvalidInput(message) => api_error(StatusCode::BAD_REQUEST, message),
        Error::Unavailable(inner) => {
            warn!(error = %inner, "No provider could answer");
            api_error(StatusCode::SERVICE_UNAVAILABLE, UNAVAILABLE_MESSAGE)
        }
        other => {
            error!(error = %other, "Request failed");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub session_id: String,
    pub reply: String,
}

/// POST /api/chat
pub async fn chat_handler(
    State(state): State<SharedState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        let status = match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        };
        api_error(
            status,
            format!("Invalid request body: {}", rejection.body_text()),
        )
    })?;

    let session_id = request
        .session_id
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            api_error(
                StatusCode::BAD_REQUEST,
                "sessionId is required and must be a string",
            )
        })?;
    let message = request
        .message
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| {
            api_error(
                StatusCode::BAD_REQUEST,
                "message is required and must be a non-empty string",
            )
        })?;

    let session = SessionId::from(session_id);
    let reply = state
        .assistant
        .handle_turn(&session, &message)
        .await
        .map_err(map_error)?;

    Ok(Json(ChatResponse {
        session_id: session.0,
        reply,
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageView {
    pub id: i64,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<StoredMessage> for MessageView {
    fn from(m: StoredMessage) -> Self {
        Self {
            id: m.id,
            role: m.role,
            content: m.content,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub session_id: String,
    pub messages: Vec<MessageView>,
}

/// GET /api/chat/{sessionId}
pub async fn history_handler(
    State(state): State<SharedState>,
    Path(session_id): Path<String>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let session = SessionId::from(session_id);
    let messages = state
        .assistant
        .history(&session)
        .await
        .map_err(map_error)?;

    Ok(Json(HistoryResponse {
        session_id: session.0,
        messages: messages.into_iter().map(MessageView::from).collect(),
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionsResponse {
    pub sessions: Vec<Session>,
}

/// GET /api/sessions
pub async fn sessions_handler(
    State(state): State<SharedState>,
) -> Result<Json<SessionsResponse>, ApiError> {
    let sessions = state.assistant.sessions().await.map_err(map_error)?;
    Ok(Json(SessionsResponse { sessions }))
}
