use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use relay_llm::{Message, Role};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

pub const MAX_QUERY_CHARS: usize = 2000;
pub const DEFAULT_CONVERSATION_ID: &str = "default";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub success: bool,
    pub answer: String,
    pub conversation_id: String,
    pub processing_time_ms: u64,
    pub model: String,
    pub provider: String,
    pub timestamp: String,
}

/// Reject blank queries and queries longer than `MAX_QUERY_CHARS`
pub fn validate_query(query: &str) -> ApiResult<()> {
    if query.trim().is_empty() {
        return Err(ApiError::empty_query());
    }
    if query.chars().count() > MAX_QUERY_CHARS {
        return Err(ApiError::query_too_long(MAX_QUERY_CHARS));
    }
    Ok(())
}

/// Relay one user turn upstream and record both sides of the exchange
///
/// On upstream failure the user turn stays in the thread without a reply.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult<Json<ChatResponse>> {
    let start = Instant::now();

    let Json(req) = payload.map_err(|rejection| ApiError::invalid_body(&rejection))?;
    validate_query(&req.query)?;

    let conversation_id = req
        .conversation_id
        .unwrap_or_else(|| DEFAULT_CONVERSATION_ID.to_string());

    tracing::info!(conversation_id = %conversation_id, query = %req.query, "New chat request");

    // 1. Record the user turn
    state.store.append(&conversation_id, Role::User, req.query);

    // 2. Prepare the outbound prompt
    let messages: Vec<Message> = state
        .store
        .build_prompt(&conversation_id)
        .into_iter()
        .map(Message::from)
        .collect();

    // 3. Relay
    let reply = state
        .relay
        .send(&messages, &state.chat_options())
        .await
        .map_err(|e| {
            if e.is_timeout() {
                tracing::warn!(conversation_id = %conversation_id, "Upstream did not answer in time");
            }
            ApiError::Upstream {
                message: e.to_string(),
                processing_time_ms: elapsed_ms(start),
            }
        })?;

    if reply.is_low_confidence() {
        tracing::warn!(conversation_id = %conversation_id, "Reply taken from raw upstream payload");
    }
    let preview: String = reply.content.chars().take(100).collect();
    tracing::info!(conversation_id = %conversation_id, reply = %preview, "Upstream replied");

    // 4. Record the assistant turn
    state
        .store
        .append(&conversation_id, Role::Assistant, reply.content.clone());

    Ok(Json(ChatResponse {
        success: true,
        answer: reply.content,
        conversation_id,
        processing_time_ms: elapsed_ms(start),
        model: state.config.upstream.model.clone(),
        provider: state.config.upstream.provider.clone(),
        timestamp: crate::timestamp(),
    }))
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
