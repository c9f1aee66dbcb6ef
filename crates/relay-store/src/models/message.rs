use chrono::{DateTime, Utc};
use relay_llm::{Message, Role};
use serde::{Deserialize, Serialize};

/// A message as kept in a conversation thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl StoredMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn is_system(&self) -> bool {
        self.role == Role::System
    }
}

impl From<&StoredMessage> for Message {
    fn from(msg: &StoredMessage) -> Self {
        Message::new(msg.role, msg.content.clone())
    }
}

impl From<StoredMessage> for Message {
    fn from(msg: StoredMessage) -> Self {
        Message::new(msg.role, msg.content)
    }
}
