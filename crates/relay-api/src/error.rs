use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rand::seq::IndexedRandom;
use serde_json::json;
use thiserror::Error;

/// In-universe apologies returned when the upstream call fails
pub const APOLOGIES: [&str; 3] = [
    "The Empire's connection to the academic networks is currently experiencing turbulence. Please try again.",
    "Wanlon-Ciraduro's consultation with the university archives encountered a temporary disruption.",
    "The Babel Tower's data conduit to HKBU requires recalibration. Your query has been preserved.",
];

pub const TROUBLESHOOTING: [&str; 4] = [
    "Check that UPSTREAM_API_KEY is correct",
    "Confirm the upstream base URL is reachable",
    "Verify the account has API access and remaining quota",
    "See the server logs for the detailed error",
];

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{error}")]
    Validation { error: String, suggestion: String },

    /// Any relay failure; always surfaces as a 500 regardless of the upstream status
    #[error("{message}")]
    Upstream {
        message: String,
        processing_time_ms: u64,
    },
}

impl ApiError {
    pub fn empty_query() -> Self {
        Self::Validation {
            error: "Query must not be empty".to_string(),
            suggestion: "Please enter the question you want to ask".to_string(),
        }
    }

    /// Body that is not a JSON object with a string `query`
    pub fn invalid_body(rejection: &JsonRejection) -> Self {
        Self::Validation {
            error: rejection.body_text(),
            suggestion: r#"Send a JSON body such as {"query": "Hello", "conversation_id": "abc"}"#
                .to_string(),
        }
    }

    pub fn query_too_long(max_chars: usize) -> Self {
        Self::Validation {
            error: "Query is too long".to_string(),
            suggestion: format!("Please shorten the question to {} characters or fewer", max_chars),
        }
    }
}

/// Uniform pick from `APOLOGIES`
pub fn pick_apology() -> &'static str {
    APOLOGIES
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(APOLOGIES[0])
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation { error, suggestion } => {
                tracing::warn!("Rejected chat request: {}", error);
                let body = Json(json!({
                    "error": error,
                    "suggestion": suggestion,
                }));
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            ApiError::Upstream {
                message,
                processing_time_ms,
            } => {
                tracing::error!(processing_time_ms, "Chat request failed: {}", message);
                let body = Json(json!({
                    "success": false,
                    "answer": pick_apology(),
                    "error": message,
                    "processing_time_ms": processing_time_ms,
                    "timestamp": crate::timestamp(),
                    "troubleshooting": TROUBLESHOOTING,
                }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
