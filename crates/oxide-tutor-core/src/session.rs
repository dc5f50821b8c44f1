//! Per-chat session state
//!
//! A session is nothing more than the system prompt a chat selected. Chats
//! without an entry behave as if the default mode was selected.

use crate::modes::DEFAULT_MODE;
use async_trait::async_trait;
use moka::future::Cache;
use tracing::debug;

/// Telegram chat identifier
pub type ChatKey = i64;

/// Interface for session stores
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Active system prompt, falling back to the default mode's prompt
    async fn get(&self, chat: ChatKey) -> String;
    /// Stored system prompt, if the chat ever selected one
    async fn get_raw(&self, chat: ChatKey) -> Option<String>;
    /// Overwrite the chat's system prompt
    async fn set(&self, chat: ChatKey, prompt: String);
}

/// In-memory session store
///
/// Unbounded unless a capacity is given; entries are never expired by time.
#[derive(Clone)]
pub struct InMemorySessionStore {
    prompts: Cache<ChatKey, String>,
}

impl InMemorySessionStore {
    /// Creates a store, optionally bounded to `max_entries` chats.
    #[must_use]
    pub fn new(max_entries: Option<u64>) -> Self {
        let builder = Cache::<ChatKey, String>::builder();
        let prompts = match max_entries {
            Some(capacity) => builder.max_capacity(capacity).build(),
            None => builder.build(),
        };
        Self { prompts }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, chat: ChatKey) -> String {
        self.prompts
            .get(&chat)
            .await
            .unwrap_or_else(|| DEFAULT_MODE.prompt().to_string())
    }

    async fn get_raw(&self, chat: ChatKey) -> Option<String> {
        self.prompts.get(&chat).await
    }

    async fn set(&self, chat: ChatKey, prompt: String) {
        debug!(chat_id = chat, "Session prompt updated");
        self.prompts.insert(chat, prompt).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modes::Mode;

    #[tokio::test]
    async fn unknown_chat_gets_default_prompt() {
        let store = InMemorySessionStore::default();
        assert_eq!(store.get(42).await, Mode::Teacher.prompt());
        assert!(store.get_raw(42).await.is_none());
    }

    #[tokio::test]
    async fn set_overwrites_per_chat() {
        let store = InMemorySessionStore::new(None);
        store.set(1, Mode::Grammar.prompt().to_string()).await;
        store.set(1, Mode::Examiner.prompt().to_string()).await;
        store.set(2, Mode::Companion.prompt().to_string()).await;

        assert_eq!(store.get(1).await, Mode::Examiner.prompt());
        assert_eq!(store.get(2).await, Mode::Companion.prompt());
        assert_eq!(
            store.get_raw(1).await.as_deref(),
            Some(Mode::Examiner.prompt())
        );
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = InMemorySessionStore::new(Some(100));
        let handle = store.clone();
        handle.set(7, "custom".to_string()).await;
        assert_eq!(store.get(7).await, "custom");
    }
}
