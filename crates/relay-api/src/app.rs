use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    config::Config,
    handlers::chat,
    middleware::logging,
    routes::{conversations, models, service},
    state::AppState,
};

/// Upper bound for a whole request; the relay call itself times out sooner
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub fn build_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Service
        .route("/", get(service::banner))
        .route("/status", get(service::status))
        // Chat
        .route("/chat", post(chat::chat))
        // Upstream models
        .route("/models", get(models::list_models))
        // Conversations
        .route("/conversations", delete(conversations::clear_conversations));

    api_routes
        .layer(middleware::from_fn(logging::log_request))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(build_cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    if config.cors.enabled {
        let mut cors = CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers(Any);

        if config.cors.origins.iter().any(|o| o == "*") {
            cors = cors.allow_origin(Any);
        } else {
            let origins: Vec<axum::http::HeaderValue> = config
                .cors
                .origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();
            cors = cors.allow_origin(origins);
        }

        cors
    } else {
        CorsLayer::permissive()
    }
}
