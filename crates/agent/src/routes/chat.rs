//! Chat endpoint.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use parts_assist_core::{AgentResponse, ConversationTurn};
use serde::Deserialize;
use tracing::{Span, field, instrument, warn};

use crate::error::AppError;
use crate::state::AppState;

/// Longest message accepted, in characters.
pub const MAX_MESSAGE_CHARS: usize = 2_000;

/// Body of `POST /chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Prior turns, oldest first. Only the most recent few are used.
    #[serde(default, alias = "conversationHistory")]
    pub conversation_history: Vec<ConversationTurn>,
}

/// Answer one chat message.
///
/// Malformed bodies are answered with the same JSON error shape as every
/// other failure.
#[instrument(skip_all, fields(message_len = field::Empty, history_len = field::Empty))]
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<AgentResponse>, AppError> {
    let Json(request) = payload?;
    let span = Span::current();
    span.record("message_len", request.message.len());
    span.record("history_len", request.conversation_history.len());

    let message = request.message.trim();
    if message.is_empty() {
        return Err(AppError::BadRequest("message must not be empty".to_string()));
    }
    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(AppError::BadRequest(format!(
            "message must be at most {MAX_MESSAGE_CHARS} characters"
        )));
    }

    let limit = state.config().request_timeout;
    let handled = tokio::time::timeout(
        limit,
        state
            .orchestrator()
            .handle(message, &request.conversation_history),
    )
    .await;

    match handled {
        Ok(Ok(response)) => Ok(Json(response)),
        Ok(Err(e)) => Err(AppError::ClassifierUnavailable(e)),
        Err(_) => {
            warn!(timeout_secs = limit.as_secs(), "Chat request timed out");
            Err(AppError::Timeout(limit.as_secs()))
        }
    }
}
