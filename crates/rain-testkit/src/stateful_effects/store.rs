//! Content-addressed descriptor store held in memory

use async_lock::RwLock;
use async_trait::async_trait;
use crate::content::content_ref;
use rain_core::effects::{DescriptorStoreEffects, StoreError, StoredBlob};
use rain_core::{BlobCodec, DescriptorRef};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Default)]
struct StoreState {
    blobs: HashMap<DescriptorRef, StoredBlob>,
    failure: Option<String>,
    writes: usize,
}

/// Memory descriptor store for testing
#[derive(Debug, Clone, Default)]
pub struct MemoryDescriptorStore {
    state: Arc<RwLock<StoreState>>,
}

impl MemoryDescriptorStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Blob stored at `reference` (for assertions)
    pub async fn get(&self, reference: &DescriptorRef) -> Option<StoredBlob> {
        self.state.read().await.blobs.get(reference).cloned()
    }

    /// Store arbitrary bytes as if written with `codec`
    pub async fn put_raw(&self, codec: BlobCodec, bytes: Vec<u8>) -> DescriptorRef {
        let reference = content_ref(codec, &bytes);
        self.state
            .write()
            .await
            .blobs
            .insert(reference.clone(), StoredBlob { codec, bytes });
        reference
    }

    /// Fail every read and write with `message`
    pub async fn fail_with(&self, message: &str) {
        self.state.write().await.failure = Some(message.to_string());
    }

    /// Number of writes accepted
    pub async fn writes(&self) -> usize {
        self.state.read().await.writes
    }
}

#[async_trait]
impl DescriptorStoreEffects for MemoryDescriptorStore {
    async fn read(&self, reference: &DescriptorRef) -> Result<StoredBlob, StoreError> {
        let state = self.state.read().await;
        if let Some(message) = &state.failure {
            return Err(StoreError::Unavailable {
                message: message.clone(),
            });
        }
        state
            .blobs
            .get(reference)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                reference: reference.clone(),
            })
    }

    async fn write(&self, codec: BlobCodec, bytes: Vec<u8>) -> Result<DescriptorRef, StoreError> {
        if let Some(message) = &self.state.read().await.failure {
            return Err(StoreError::Unavailable {
                message: message.clone(),
            });
        }
        let reference = self.put_raw(codec, bytes).await;
        self.state.write().await.writes += 1;
        Ok(reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_identical_writes_share_a_reference() {
        let store = MemoryDescriptorStore::new();
        let a = store.write(BlobCodec::DagCbor, vec![1, 2, 3]).await.unwrap();
        let b = store.write(BlobCodec::DagCbor, vec![1, 2, 3]).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(store.writes().await, 2);
        assert_eq!(store.read(&a).await.unwrap().bytes, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_missing_reference_is_not_found() {
        let store = MemoryDescriptorStore::new();
        let err = store.read(&DescriptorRef::new("sha256-00")).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }
}
