//! Host log interface

use crate::entry::LogEntry;
use crate::errors::RainError;
use crate::identifiers::EntryHash;
use async_trait::async_trait;

/// Failure to fetch a log entry
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LogError {
    /// No entry with this hash exists
    #[error("entry {hash} not found")]
    NotFound {
        /// Hash that was looked up
        hash: EntryHash,
    },

    /// The log or its replication layer failed
    #[error("log unavailable: {message}")]
    Unavailable {
        /// Failure description
        message: String,
    },
}

impl From<LogError> for RainError {
    fn from(err: LogError) -> Self {
        RainError::log_unavailable(err.to_string())
    }
}

/// Read access to entries of the host log
#[async_trait]
pub trait EntryLogEffects: Send + Sync {
    /// Entry with `hash`
    async fn get_entry(&self, hash: &EntryHash) -> Result<LogEntry, LogError>;
}
