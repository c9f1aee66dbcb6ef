use crate::error::Result;
use crate::types::Message;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 500;

/// Outbound chat-completion seam
///
/// `RelayClient` talks to a real endpoint; tests substitute their own implementation.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Single non-streaming completion. Never retries.
    async fn send(&self, messages: &[Message], options: &ChatOptions) -> Result<Reply>;

    /// Raw model listing as returned by the remote
    async fn list_models(&self) -> Result<serde_json::Value>;
}

/// Per-call overrides; unset fields fall back to the defaults
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChatOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl ChatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    pub fn effective_temperature(&self) -> f32 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    pub fn effective_max_tokens(&self) -> u32 {
        self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
    }
}

/// Which response shape the reply text was taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplySource {
    /// `choices[0].message.content`
    Choices,
    /// top-level `result`
    Result,
    /// top-level `response`
    Response,
    /// whole payload stringified
    RawPayload,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub content: String,
    pub source: ReplySource,
    pub usage: Option<TokenUsage>,
}

impl Reply {
    /// The payload matched no known shape; content is the serialized body
    pub fn is_low_confidence(&self) -> bool {
        self.source == ReplySource::RawPayload
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}
