use axum::{extract::State, Json};
use relay_llm::RelayError;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::state::AppState;

/// Best-effort passthrough of the upstream model list
///
/// Always answers 200; failures fall back to naming the configured model.
pub async fn list_models(State(state): State<Arc<AppState>>) -> Json<Value> {
    let upstream = &state.config.upstream;

    let body = match state.relay.list_models().await {
        Ok(data) => {
            let listed = ["data", "models"]
                .iter()
                .find_map(|key| data.get(*key).filter(|v| !v.is_null()).cloned());
            let models = listed.unwrap_or(data);

            json!({
                "success": true,
                "models": models,
                "source": upstream.provider,
            })
        }
        Err(RelayError::Upstream { status, .. }) => {
            tracing::warn!(status, "Upstream refused model listing");
            json!({
                "success": false,
                "message": "Unable to fetch the model list",
                "fallback_model": upstream.model,
                "suggestion": "Using the configured default model",
            })
        }
        Err(e) => {
            tracing::warn!("Model listing failed: {}", e);
            json!({
                "success": false,
                "model": upstream.model,
                "message": "Using the preconfigured model",
                "error": e.to_string(),
            })
        }
    };

    Json(body)
}
