use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct ClearResponse {
    pub cleared: usize,
    pub message: String,
    pub timestamp: String,
}

/// Drop every conversation thread
pub async fn clear_conversations(State(state): State<Arc<AppState>>) -> Json<ClearResponse> {
    let cleared = state.store.clear_all();
    tracing::info!(cleared, "Cleared all conversations");

    Json(ClearResponse {
        cleared,
        message: format!("Cleared {} conversations", cleared),
        timestamp: crate::timestamp(),
    })
}
