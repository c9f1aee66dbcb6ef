use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::state::AppState;

const USAGE_TIPS: [&str; 4] = [
    "1. Make sure UPSTREAM_API_KEY is configured",
    "2. Confirm the upstream endpoint and model name",
    "3. Check the usage quota of the upstream account",
    "4. See the server logs if something goes wrong",
];

#[derive(Debug, Serialize, Deserialize)]
pub struct BannerResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub connected_to: String,
    pub model: String,
    pub endpoints: Endpoints,
    pub instructions: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Endpoints {
    pub chat: String,
    pub status: String,
    pub models: String,
    pub clear: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub server: ServerStatus,
    pub upstream: UpstreamStatus,
    pub conversations: ConversationStatus,
    pub usage_tips: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServerStatus {
    pub status: String,
    pub uptime_secs: f64,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpstreamStatus {
    pub api_configured: bool,
    pub base_url: String,
    pub model: String,
    pub key_set: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationStatus {
    pub active: usize,
    pub max_history: usize,
}

/// Service banner with the endpoint list
pub async fn banner(State(state): State<Arc<AppState>>) -> Json<BannerResponse> {
    let upstream = &state.config.upstream;

    Json(BannerResponse {
        status: "running".to_string(),
        service: "Chat relay server".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        connected_to: upstream.provider.clone(),
        model: upstream.model.clone(),
        endpoints: Endpoints {
            chat: "POST /chat".to_string(),
            status: "GET /status".to_string(),
            models: "GET /models".to_string(),
            clear: "DELETE /conversations".to_string(),
        },
        instructions: "See /status for details".to_string(),
    })
}

pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let config = &state.config;
    let key_set = !config.api_key.is_empty();

    Json(StatusResponse {
        server: ServerStatus {
            status: "active".to_string(),
            uptime_secs: state.uptime_secs(),
            port: config.server.port,
        },
        upstream: UpstreamStatus {
            api_configured: key_set,
            base_url: config.upstream.base_url.clone(),
            model: config.upstream.model.clone(),
            key_set: if key_set { "set" } else { "not set" }.to_string(),
        },
        conversations: ConversationStatus {
            active: state.store.size(),
            max_history: state.store.max_history(),
        },
        usage_tips: USAGE_TIPS.iter().map(|tip| tip.to_string()).collect(),
    })
}
