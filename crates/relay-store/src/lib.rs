pub mod models;
pub mod store;
pub mod builder;
pub mod templates;

pub use models::{ConversationThread, StoredMessage, ThreadHandle};
pub use store::{ConversationStore, DEFAULT_MAX_HISTORY};
pub use builder::ConversationStoreBuilder;
pub use templates::DEFAULT_SYSTEM_PROMPT;
