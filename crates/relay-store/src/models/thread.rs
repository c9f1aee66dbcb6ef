use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use relay_llm::Role;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::message::StoredMessage;

/// Shared handle to a registered thread; clones point at the same thread
pub type ThreadHandle = Arc<Mutex<ConversationThread>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationThread {
    pub id: String,
    pub messages: Vec<StoredMessage>,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
}

impl ConversationThread {
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            messages: Vec::new(),
            created_at: now,
            last_active_at: now,
        }
    }

    /// Append and bump `last_active_at`
    pub fn push(&mut self, role: Role, content: impl Into<String>) {
        let message = StoredMessage::new(role, content);
        self.last_active_at = message.timestamp;
        self.messages.push(message);
    }

    /// Once the thread holds more than `2 * max_history` messages, keep the
    /// first one plus the most recent `2 * max_history - 1`.
    ///
    /// Returns how many messages were dropped.
    pub fn trim(&mut self, max_history: usize) -> usize {
        let cap = max_history * 2;
        if cap == 0 || self.messages.len() <= cap {
            return 0;
        }

        let dropped = self.messages.len() - cap;
        // messages[0] stays, the oldest ones after it go
        self.messages.drain(1..=dropped);
        dropped
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(n: usize) -> ConversationThread {
        let mut thread = ConversationThread::new("t");
        for i in 0..n {
            let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
            thread.push(role, format!("m{i}"));
        }
        thread
    }

    #[test]
    fn test_trim_noop_at_cap() {
        let mut thread = filled(16);
        assert_eq!(thread.trim(8), 0);
        assert_eq!(thread.len(), 16);
    }

    #[test]
    fn test_trim_keeps_first_and_tail() {
        let mut thread = filled(17);
        assert_eq!(thread.trim(8), 1);

        assert_eq!(thread.len(), 16);
        assert_eq!(thread.messages[0].content, "m0");
        assert_eq!(thread.messages[1].content, "m2");
        assert_eq!(thread.messages[15].content, "m16");
    }

    #[test]
    fn test_trim_from_far_over_cap() {
        let mut thread = filled(30);
        assert_eq!(thread.trim(2), 26);

        let contents: Vec<&str> = thread.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["m0", "m27", "m28", "m29"]);
    }

    #[test]
    fn test_push_updates_last_active() {
        let mut thread = ConversationThread::new("t");
        let before = thread.last_active_at;
        thread.push(Role::User, "hi");

        assert!(thread.last_active_at >= before);
        assert_eq!(thread.last_active_at, thread.messages[0].timestamp);
    }
}
