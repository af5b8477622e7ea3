//! Content-addressed descriptor store interface

use crate::errors::RainError;
use crate::identifiers::DescriptorRef;
use crate::serialization::BlobCodec;
use async_trait::async_trait;

/// Failure of the descriptor store
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Nothing stored under this reference
    #[error("no blob at {reference}")]
    NotFound {
        /// Reference that was read
        reference: DescriptorRef,
    },

    /// Store backend failure
    #[error("descriptor store unavailable: {message}")]
    Unavailable {
        /// Failure description
        message: String,
    },
}

impl From<StoreError> for RainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { reference } => {
                RainError::descriptor_not_found(reference.to_string())
            }
            StoreError::Unavailable { .. } => {
                RainError::descriptor_store_unavailable(err.to_string())
            }
        }
    }
}

/// Blob read back from the store, with the codec it was written with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    /// Codec of `bytes`
    pub codec: BlobCodec,
    /// Encoded object
    pub bytes: Vec<u8>,
}

/// Content-addressed blob storage
#[async_trait]
pub trait DescriptorStoreEffects: Send + Sync {
    /// Read the blob at `reference`
    async fn read(&self, reference: &DescriptorRef) -> Result<StoredBlob, StoreError>;

    /// Write an encoded object; the returned reference addresses its content
    async fn write(&self, codec: BlobCodec, bytes: Vec<u8>) -> Result<DescriptorRef, StoreError>;
}
