//! Log entry builder
//!
//! Entries get a content hash over author, payload and a process-wide
//! sequence number, so two otherwise identical entries stay distinct.

use rain_core::{
    EntryHash, EntryPayload, IdentityId, IdentitySignatures, LogEntry, LogIdentity, Operation,
};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Builder for [`LogEntry`] values
#[derive(Debug, Clone)]
pub struct EntryBuilder {
    author: IdentityId,
    op: Operation,
    value: serde_json::Value,
    hash: Option<EntryHash>,
}

impl EntryBuilder {
    /// `ADD` entry by `author` with a placeholder value
    pub fn add(author: impl Into<IdentityId>) -> Self {
        Self {
            author: author.into(),
            op: Operation::Add,
            value: json!({ "message": "hello" }),
            hash: None,
        }
    }

    /// `DEL` entry by `author` targeting `target`
    pub fn del(author: impl Into<IdentityId>, target: &EntryHash) -> Self {
        let payload = EntryPayload::del(target);
        Self {
            author: author.into(),
            op: payload.op,
            value: payload.value,
            hash: None,
        }
    }

    /// Entry with an arbitrary operation tag
    pub fn op(author: impl Into<IdentityId>, tag: &str) -> Self {
        Self {
            author: author.into(),
            op: Operation::from(tag),
            value: serde_json::Value::Null,
            hash: None,
        }
    }

    /// Replace the payload value
    pub fn value(mut self, value: serde_json::Value) -> Self {
        self.value = value;
        self
    }

    /// Use a fixed hash instead of the derived one
    pub fn hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(EntryHash::new(hash));
        self
    }

    /// Build the entry
    pub fn build(self) -> LogEntry {
        let hash = self.hash.unwrap_or_else(|| {
            let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
            let mut hasher = Sha256::new();
            hasher.update(self.author.as_str().as_bytes());
            hasher.update(self.op.as_str().as_bytes());
            hasher.update(self.value.to_string().as_bytes());
            hasher.update(seq.to_be_bytes());
            EntryHash::new(format!("zdpu{}", hex::encode(&hasher.finalize()[..16])))
        });
        let key = hex::encode(Sha256::digest(self.author.as_str().as_bytes()));
        LogEntry {
            hash,
            identity: LogIdentity {
                id: self.author,
                public_key: key.clone(),
                signatures: IdentitySignatures {
                    id: format!("sig-id-{}", &key[..8]),
                    public_key: format!("sig-key-{}", &key[..8]),
                },
            },
            payload: EntryPayload {
                op: self.op,
                value: self.value,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_entries_get_distinct_hashes() {
        let a = EntryBuilder::add("did:3:alice").build();
        let b = EntryBuilder::add("did:3:alice").build();
        assert_ne!(a.hash, b.hash);
        assert_eq!(a.author(), b.author());
    }

    #[test]
    fn test_del_targets_hash() {
        let target = EntryHash::new("zdpuTarget");
        let del = EntryBuilder::del("did:3:bob", &target).build();
        assert_eq!(del.payload.op, Operation::Del);
        assert_eq!(del.payload.delete_target(), Some(target));
    }
}
