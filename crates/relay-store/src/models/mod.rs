pub mod message;
pub mod thread;

pub use message::StoredMessage;
pub use thread::{ConversationThread, ThreadHandle};
