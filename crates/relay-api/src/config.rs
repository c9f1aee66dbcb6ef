use config::{builder::DefaultState, Config as ConfigLoader, ConfigBuilder, ConfigError, Environment, File};
use relay_llm::ChatOptions;
use relay_store::ConversationStore;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Secret read from the environment only, never from files
pub const API_KEY_ENV: &str = "UPSTREAM_API_KEY";
pub const BASE_URL_ENV: &str = "UPSTREAM_BASE_URL";
pub const MODEL_ENV: &str = "UPSTREAM_MODEL";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub upstream: UpstreamConfig,
    pub conversations: ConversationsConfig,
    pub logging: LoggingConfig,

    // Secrets (from ENV only)
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub enabled: bool,
    pub origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL without `/v1/...`
    pub base_url: String,
    pub model: String,
    /// Label reported back to clients
    pub provider: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl UpstreamConfig {
    pub fn chat_options(&self) -> ChatOptions {
        ChatOptions::new()
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConversationsConfig {
    pub max_history: usize,
    pub sweep_interval_hours: u64,
    pub max_age_hours: u32,
    /// Overrides the built-in persona
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Persona read from a file; `system_prompt` wins when both are set
    #[serde(default)]
    pub system_prompt_file: Option<PathBuf>,
}

impl ConversationsConfig {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_hours.saturating_mul(60 * 60))
    }

    /// Store with the configured history cap and persona
    pub fn build_store(&self) -> std::io::Result<ConversationStore> {
        let mut builder = ConversationStore::builder().max_history(self.max_history);

        if let Some(prompt) = &self.system_prompt {
            builder = builder.system_prompt(prompt.clone());
        } else if let Some(path) = &self.system_prompt_file {
            builder = builder.system_prompt_file(path)?;
        }

        Ok(builder.build())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Config {
    /// Load configuration from defaults, TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. built-in defaults
    /// 2. config/default.toml
    /// 3. config/{ENV}.toml (if ENV is set)
    /// 4. RELAY__SECTION__KEY environment variables
    /// 5. UPSTREAM_BASE_URL / UPSTREAM_MODEL
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("RELAY")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors.origins"),
            )
            .set_override_option("upstream.base_url", non_blank_env(BASE_URL_ENV))?
            .set_override_option("upstream.model", non_blank_env(MODEL_ENV))?;

        let mut cfg: Config = builder.build()?.try_deserialize()?;

        cfg.api_key = require_api_key(std::env::var(API_KEY_ENV).ok())?;

        Ok(cfg)
    }

    /// Built-in defaults only, with the given key (useful for testing)
    pub fn with_api_key(api_key: impl Into<String>) -> Result<Self, ConfigError> {
        let mut cfg: Config = Self::defaults()?.build()?.try_deserialize()?;
        cfg.api_key = require_api_key(Some(api_key.into()))?;
        Ok(cfg)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        ConfigLoader::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000_i64)?
            .set_default("cors.enabled", false)?
            .set_default("cors.origins", Vec::<String>::new())?
            .set_default("upstream.base_url", "https://genai.hkbu.edu.hk/api")?
            .set_default("upstream.model", "deepseek-r1")?
            .set_default("upstream.provider", "HKBU GenAI Platform")?
            .set_default("upstream.temperature", 0.7_f64)?
            .set_default("upstream.max_tokens", 500_i64)?
            .set_default("upstream.timeout_secs", 30_i64)?
            .set_default("conversations.max_history", 8_i64)?
            .set_default("conversations.sweep_interval_hours", 6_i64)?
            .set_default("conversations.max_age_hours", 6_i64)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")
    }
}

fn non_blank_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn require_api_key(value: Option<String>) -> Result<String, ConfigError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            ConfigError::Message(format!(
                "{} environment variable is required (add it to .env or export it)",
                API_KEY_ENV
            ))
        })
}
