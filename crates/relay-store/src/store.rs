use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use relay_llm::Role;
use std::collections::HashMap;
use std::sync::Arc;

use crate::builder::ConversationStoreBuilder;
use crate::models::{ConversationThread, StoredMessage, ThreadHandle};

pub const DEFAULT_MAX_HISTORY: usize = 8;

/// In-memory conversation threads keyed by client-supplied id
///
/// All operations are synchronous and never fail. Lock order is always
/// map first, then thread; callers holding a `ThreadHandle` lock must not
/// call back into the store.
pub struct ConversationStore {
    threads: Mutex<HashMap<String, ThreadHandle>>,
    max_history: usize,
    system_prompt: String,
}

impl ConversationStore {
    pub fn new() -> Self {
        ConversationStoreBuilder::new().build()
    }

    pub fn builder() -> ConversationStoreBuilder {
        ConversationStoreBuilder::new()
    }

    pub(crate) fn with_settings(max_history: usize, system_prompt: String) -> Self {
        Self {
            threads: Mutex::new(HashMap::new()),
            max_history,
            system_prompt,
        }
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Existing thread for `id`, or a freshly registered empty one
    pub fn get_or_create(&self, id: &str) -> ThreadHandle {
        let mut threads = self.threads.lock();
        Self::entry(&mut threads, id)
    }

    /// Thread for `id` without creating it
    pub fn get(&self, id: &str) -> Option<ThreadHandle> {
        self.threads.lock().get(id).cloned()
    }

    /// Record a message and return the thread's (post-trim) history
    pub fn append(&self, id: &str, role: Role, content: impl Into<String>) -> Vec<StoredMessage> {
        // Map lock is held for the whole append so a concurrent sweep cannot
        // drop the thread between lookup and write.
        let mut threads = self.threads.lock();
        let handle = Self::entry(&mut threads, id);
        let mut thread = handle.lock();

        thread.push(role, content);
        let dropped = thread.trim(self.max_history);
        if dropped > 0 {
            tracing::debug!(conversation_id = %id, dropped, "Trimmed conversation history");
        }

        thread.messages.clone()
    }

    /// Messages to send upstream, always led by a system message.
    ///
    /// A synthesized persona is prepended when the thread does not start with
    /// one; it is never written back into the thread.
    pub fn build_prompt(&self, id: &str) -> Vec<StoredMessage> {
        let handle = self.get_or_create(id);
        let mut messages = handle.lock().messages.clone();

        if !messages.first().is_some_and(StoredMessage::is_system) {
            messages.insert(0, StoredMessage::new(Role::System, self.system_prompt.clone()));
        }

        messages
    }

    /// Drop every thread idle for more than `max_age_hours`
    ///
    /// A threshold reaching past the representable date range removes nothing.
    pub fn sweep(&self, max_age_hours: u32) -> usize {
        match Utc::now().checked_sub_signed(Duration::hours(i64::from(max_age_hours))) {
            Some(cutoff) => self.sweep_inactive_since(cutoff),
            None => 0,
        }
    }

    /// Drop every thread whose `last_active_at` is strictly before `cutoff`
    pub fn sweep_inactive_since(&self, cutoff: DateTime<Utc>) -> usize {
        let mut threads = self.threads.lock();
        let before = threads.len();
        threads.retain(|_, thread| thread.lock().last_active_at >= cutoff);
        let removed = before - threads.len();

        if removed > 0 {
            tracing::info!(removed, remaining = threads.len(), "Swept idle conversations");
        }

        removed
    }

    /// Remove every thread, returning how many there were
    pub fn clear_all(&self) -> usize {
        let mut threads = self.threads.lock();
        let count = threads.len();
        threads.clear();
        count
    }

    pub fn size(&self) -> usize {
        self.threads.lock().len()
    }

    fn entry(threads: &mut HashMap<String, ThreadHandle>, id: &str) -> ThreadHandle {
        threads
            .entry(id.to_string())
            .or_insert_with(|| {
                tracing::debug!(conversation_id = %id, "Creating conversation thread");
                Arc::new(Mutex::new(ConversationThread::new(id)))
            })
            .clone()
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::DEFAULT_SYSTEM_PROMPT;

    fn role_for(i: usize) -> Role {
        if i % 2 == 0 {
            Role::User
        } else {
            Role::Assistant
        }
    }

    #[test]
    fn test_get_or_create_is_idempotent() {
        let store = ConversationStore::new();
        let a = store.get_or_create("abc");
        let b = store.get_or_create("abc");

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(store.size(), 1);
    }

    #[test]
    fn test_new_thread_is_empty() {
        let store = ConversationStore::new();
        let handle = store.get_or_create("fresh");
        let thread = handle.lock();

        assert!(thread.is_empty());
        assert_eq!(thread.id, "fresh");
        assert_eq!(thread.created_at, thread.last_active_at);
    }

    #[test]
    fn test_get_does_not_create() {
        let store = ConversationStore::new();
        assert!(store.get("missing").is_none());
        assert_eq!(store.size(), 0);
    }

    #[test]
    fn test_append_creates_thread_and_returns_history() {
        let store = ConversationStore::new();
        store.append("c1", Role::User, "Hello");
        let history = store.append("c1", Role::Assistant, "Hi");

        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[1].content, "Hi");
        assert_eq!(store.size(), 1);
    }

    #[test]
    fn test_append_never_exceeds_cap() {
        let store = ConversationStore::new();
        let cap = 2 * store.max_history();

        for i in 0..50 {
            let history = store.append("long", role_for(i), format!("m{i}"));
            assert!(history.len() <= cap);

            if i < cap {
                // untrimmed: everything retained verbatim
                assert_eq!(history.len(), i + 1);
                assert_eq!(history[i].content, format!("m{i}"));
            } else {
                assert_eq!(history.len(), cap);
                assert_eq!(history[0].content, "m0");
                assert_eq!(history[cap - 1].content, format!("m{i}"));
            }
        }
    }

    #[test]
    fn test_trim_preserves_leading_system_message() {
        let store = ConversationStore::builder().max_history(2).build();
        store.append("s", Role::System, "persona");
        for i in 0..10 {
            store.append("s", role_for(i), format!("m{i}"));
        }

        let history = store.get("s").unwrap().lock().messages.clone();
        let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["persona", "m7", "m8", "m9"]);
    }

    #[test]
    fn test_build_prompt_synthesizes_system() {
        let store = ConversationStore::new();
        store.append("p", Role::User, "Hello");

        let prompt = store.build_prompt("p");
        assert_eq!(prompt.len(), 2);
        assert_eq!(prompt[0].role, Role::System);
        assert_eq!(prompt[0].content, DEFAULT_SYSTEM_PROMPT);
        assert_eq!(prompt[1].content, "Hello");

        // not written back
        let stored = store.get("p").unwrap().lock().messages.clone();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].role, Role::User);
    }

    #[test]
    fn test_build_prompt_on_empty_thread() {
        let store = ConversationStore::builder().system_prompt("be terse").build();

        let prompt = store.build_prompt("empty");
        assert_eq!(prompt.len(), 1);
        assert_eq!(prompt[0].role, Role::System);
        assert_eq!(prompt[0].content, "be terse");
    }

    #[test]
    fn test_build_prompt_keeps_stored_system() {
        let store = ConversationStore::new();
        store.append("sys", Role::System, "custom persona");
        store.append("sys", Role::User, "Hello");

        let prompt = store.build_prompt("sys");
        assert_eq!(prompt.len(), 2);
        assert_eq!(prompt[0].content, "custom persona");
    }

    #[test]
    fn test_sweep_removes_only_stale_threads() {
        let store = ConversationStore::new();
        store.append("stale", Role::User, "old");
        store.append("fresh", Role::User, "new");

        let stale_at = Utc::now() - Duration::hours(7);
        store.get("stale").unwrap().lock().last_active_at = stale_at;
        let fresh_before = store.get("fresh").unwrap().lock().clone();

        assert_eq!(store.sweep(6), 1);
        assert!(store.get("stale").is_none());

        let fresh_after = store.get("fresh").unwrap().lock().clone();
        assert_eq!(fresh_after.messages, fresh_before.messages);
        assert_eq!(fresh_after.last_active_at, fresh_before.last_active_at);

        // idempotent
        assert_eq!(store.sweep(6), 0);
        assert_eq!(store.size(), 1);
    }

    #[test]
    fn test_sweep_with_huge_threshold_removes_nothing() {
        let store = ConversationStore::new();
        store.append("a", Role::User, "x");
        store.get("a").unwrap().lock().last_active_at = Utc::now() - Duration::days(365);

        assert_eq!(store.sweep(u32::MAX), 0);
        assert_eq!(store.size(), 1);
    }

    #[test]
    fn test_sweep_cutoff_is_strict() {
        let store = ConversationStore::new();
        let cutoff = Utc::now() - Duration::hours(1);

        store.get_or_create("at").lock().last_active_at = cutoff;
        store.get_or_create("before").lock().last_active_at = cutoff - Duration::seconds(1);

        assert_eq!(store.sweep_inactive_since(cutoff), 1);
        assert!(store.get("at").is_some());
        assert!(store.get("before").is_none());
    }

    #[test]
    fn test_clear_all() {
        let store = ConversationStore::new();
        for id in ["a", "b", "c"] {
            store.append(id, Role::User, "x");
        }

        assert_eq!(store.clear_all(), 3);
        assert_eq!(store.size(), 0);
        assert_eq!(store.clear_all(), 0);
    }

    #[test]
    fn test_concurrent_appends() {
        let store = ConversationStore::new();

        std::thread::scope(|s| {
            for t in 0..4 {
                let store = &store;
                s.spawn(move || {
                    for i in 0..100 {
                        store.append(&format!("t{}", i % 8), role_for(t), "x");
                    }
                });
            }
        });

        assert_eq!(store.size(), 8);
        for i in 0..8 {
            let len = store.get(&format!("t{i}")).unwrap().lock().len();
            assert_eq!(len, 2 * DEFAULT_MAX_HISTORY);
        }
    }
}
