use std::path::Path;

use crate::store::{ConversationStore, DEFAULT_MAX_HISTORY};
use crate::templates::DEFAULT_SYSTEM_PROMPT;

pub struct ConversationStoreBuilder {
    max_history: usize,
    system_prompt: String,
}

impl ConversationStoreBuilder {
    pub fn new() -> Self {
        Self {
            max_history: DEFAULT_MAX_HISTORY,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Threads are trimmed once they exceed `2 * max_history` messages
    pub fn max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn system_prompt_file(mut self, path: impl AsRef<Path>) -> std::io::Result<Self> {
        self.system_prompt = std::fs::read_to_string(path)?;
        Ok(self)
    }

    pub fn build(self) -> ConversationStore {
        ConversationStore::with_settings(self.max_history, self.system_prompt)
    }
}

impl Default for ConversationStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}
