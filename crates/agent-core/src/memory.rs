//! Shared conversational memory

use crate::AgentMessage;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Append-only transcript shared by every agent of a team
///
/// Cloning a `SharedMemory` yields another handle to the same transcript.
#[derive(Debug, Clone, Default)]
pub struct SharedMemory {
    entries: Arc<RwLock<Vec<AgentMessage>>>,
}

impl SharedMemory {
    /// Create an empty memory
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message
    pub async fn push(&self, message: AgentMessage) {
        let mut entries = self.entries.write().await;
        debug!(
            source = %message.source,
            kind = %message.kind,
            position = entries.len(),
            "Appending message to shared memory"
        );
        entries.push(message);
    }

    /// Copy of all messages in insertion order
    pub async fn snapshot(&self) -> Vec<AgentMessage> {
        self.entries.read().await.clone()
    }

    /// Most recent message, if any
    pub async fn last(&self) -> Option<AgentMessage> {
        self.entries.read().await.last().cloned()
    }

    /// Number of stored messages
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether no message has been stored yet
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Forget all messages
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_clones_share_entries() {
        let memory = SharedMemory::new();
        let handle = memory.clone();

        memory.push(AgentMessage::text("user", "analyze tesla")).await;
        handle.push(AgentMessage::text("Search_Agent", "TSLA")).await;

        assert_eq!(memory.len().await, 2);
        let snapshot = handle.snapshot().await;
        assert_eq!(snapshot[0].source, "user");
        assert_eq!(snapshot[1].content_text(), "TSLA");
        assert_eq!(memory.last().await.unwrap().source, "Search_Agent");
    }

    #[tokio::test]
    async fn test_clear() {
        let memory = SharedMemory::new();
        memory.push(AgentMessage::text("user", "x")).await;
        memory.clear().await;
        assert!(memory.is_empty().await);
        assert!(memory.last().await.is_none());
    }
}
