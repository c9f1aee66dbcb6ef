// OpenAI-compatible chat-completions client

use crate::error::{RelayError, Result};
use crate::openai::extract::extract_reply;
use crate::traits::{ChatClient, ChatOptions, Reply};
use crate::types::Message;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const RELAY_USER_AGENT: &str = concat!("chat-relay/", env!("CARGO_PKG_VERSION"));

/// Relay client (HTTP direct, no SDK)
///
/// Issues exactly one request per call; failures are returned, never retried.
#[derive(Debug, Clone)]
pub struct RelayClient {
    http_client: reqwest::Client,
    base_url: String,
    model: String,
}

impl RelayClient {
    pub fn builder() -> RelayClientBuilder {
        RelayClientBuilder::default()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn chat_endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    fn models_endpoint(&self) -> String {
        format!("{}/v1/models", self.base_url)
    }

    /// Build chat completion request payload
    fn build_chat_request(&self, messages: &[Message], options: &ChatOptions) -> Value {
        serde_json::json!({
            "model": self.model,
            "messages": messages,
            "temperature": options.effective_temperature(),
            "max_tokens": options.effective_max_tokens(),
            "stream": false,
        })
    }

    /// Turn a non-2xx response into `RelayError::Upstream`
    async fn upstream_error(response: reqwest::Response) -> RelayError {
        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();

        // JSON bodies are re-serialized compactly, anything else is kept verbatim
        let body = match serde_json::from_str::<Value>(&text) {
            Ok(json) => json.to_string(),
            Err(_) => text,
        };

        RelayError::Upstream { status, body }
    }
}

#[async_trait]
impl ChatClient for RelayClient {
    async fn send(&self, messages: &[Message], options: &ChatOptions) -> Result<Reply> {
        let endpoint = self.chat_endpoint();
        let payload = self.build_chat_request(messages, options);

        tracing::info!(endpoint = %endpoint, message_count = messages.len(), "Sending chat completion request");

        let response = self
            .http_client
            .post(&endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Upstream call failed: {}", e);
                RelayError::Transport(e)
            })?;

        tracing::info!(status = %response.status(), "Upstream responded");

        if !response.status().is_success() {
            let err = Self::upstream_error(response).await;
            tracing::error!("Upstream call failed: {}", err);
            return Err(err);
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| RelayError::Decode(e.to_string()))?;

        if let Some(obj) = data.as_object() {
            let keys: Vec<&str> = obj.keys().map(String::as_str).collect();
            tracing::debug!(?keys, "Upstream response structure");
        }

        let reply = extract_reply(&data);
        if let Some(usage) = reply.usage {
            tracing::info!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Token usage"
            );
        }

        Ok(reply)
    }

    async fn list_models(&self) -> Result<Value> {
        let response = self
            .http_client
            .get(self.models_endpoint())
            .send()
            .await
            .map_err(RelayError::Transport)?;

        if !response.status().is_success() {
            return Err(Self::upstream_error(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| RelayError::Decode(e.to_string()))
    }
}

/// Builder for RelayClient
#[derive(Default)]
pub struct RelayClientBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout: Option<Duration>,
}

impl RelayClientBuilder {
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Base URL without the `/v1/...` suffix, e.g. "https://genai.hkbu.edu.hk/api"
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<RelayClient> {
        let api_key = self.api_key.ok_or(RelayError::MissingSetting("API key"))?;
        let base_url = self.base_url.ok_or(RelayError::MissingSetting("Base URL"))?;
        let model = self.model.ok_or(RelayError::MissingSetting("Model"))?;

        let base_url = base_url.trim_end_matches('/').to_string();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(RELAY_USER_AGENT));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|_| RelayError::InvalidApiKey)?,
        );

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()
            .map_err(RelayError::Client)?;

        Ok(RelayClient {
            http_client,
            base_url,
            model,
        })
    }
}
