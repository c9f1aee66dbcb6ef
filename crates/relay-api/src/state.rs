use std::sync::Arc;
use std::time::Instant;

use relay_llm::{ChatClient, ChatOptions};
use relay_store::ConversationStore;

use crate::config::Config;

/// Shared application state passed to all handlers
///
/// The store is owned here rather than living in a global; the sweeper
/// holds a second `Arc` to the same store.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<ConversationStore>,
    pub relay: Arc<dyn ChatClient>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: Config, store: Arc<ConversationStore>, relay: Arc<dyn ChatClient>) -> Self {
        Self {
            config: Arc::new(config),
            store,
            relay,
            started_at: Instant::now(),
        }
    }

    pub fn chat_options(&self) -> ChatOptions {
        self.config.upstream.chat_options()
    }

    pub fn uptime_secs(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }
}
