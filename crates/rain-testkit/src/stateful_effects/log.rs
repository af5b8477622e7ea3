//! In-memory host log

use async_lock::RwLock;
use async_trait::async_trait;
use rain_core::effects::{EntryLogEffects, LogError};
use rain_core::{EntryHash, LogEntry};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Default)]
struct LogState {
    entries: HashMap<EntryHash, LogEntry>,
    failure: Option<String>,
    stalled: bool,
}

/// Host log holding entries by hash
#[derive(Debug, Clone, Default)]
pub struct MockEntryLog {
    state: Arc<RwLock<LogState>>,
}

impl MockEntryLog {
    /// Empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `entry` under its hash and hand it back
    pub async fn append(&self, entry: LogEntry) -> LogEntry {
        self.state
            .write()
            .await
            .entries
            .insert(entry.hash.clone(), entry.clone());
        entry
    }

    /// Fail every fetch with `message`
    pub async fn fail_with(&self, message: &str) {
        self.state.write().await.failure = Some(message.to_string());
    }

    /// Leave every fetch pending forever
    pub async fn stall(&self) {
        self.state.write().await.stalled = true;
    }

    /// Number of stored entries
    pub async fn entry_count(&self) -> usize {
        self.state.read().await.entries.len()
    }
}

#[async_trait]
impl EntryLogEffects for MockEntryLog {
    async fn get_entry(&self, hash: &EntryHash) -> Result<LogEntry, LogError> {
        if self.state.read().await.stalled {
            futures::future::pending::<()>().await;
        }
        let state = self.state.read().await;
        if let Some(message) = &state.failure {
            return Err(LogError::Unavailable {
                message: message.clone(),
            });
        }
        state
            .entries
            .get(hash)
            .cloned()
            .ok_or_else(|| LogError::NotFound { hash: hash.clone() })
    }
}
