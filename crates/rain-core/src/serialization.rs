//! Blob serialization for persisted controller state
//!
//! DAG-CBOR is the canonical encoding for descriptors; DAG-JSON is accepted
//! for stores that only speak JSON. The codec travels with the blob so a
//! reader never has to guess.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unified error type for serialization operations
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    /// DAG-CBOR encoding/decoding error
    #[error("DAG-CBOR error: {0}")]
    DagCbor(String),

    /// DAG-JSON encoding/decoding error
    #[error("DAG-JSON error: {0}")]
    DagJson(String),

    /// Unknown codec name
    #[error("Unknown codec: {0}")]
    UnknownCodec(String),
}

/// Standard Result type for serialization operations
pub type Result<T> = std::result::Result<T, SerializationError>;

impl From<SerializationError> for crate::RainError {
    fn from(err: SerializationError) -> Self {
        crate::RainError::serialization(err.to_string())
    }
}

/// Codec a blob was written with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlobCodec {
    /// DAG-CBOR
    #[default]
    DagCbor,
    /// DAG-JSON
    DagJson,
}

impl BlobCodec {
    /// Multicodec name
    pub fn name(self) -> &'static str {
        match self {
            Self::DagCbor => "dag-cbor",
            Self::DagJson => "dag-json",
        }
    }
}

impl fmt::Display for BlobCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BlobCodec {
    type Err = SerializationError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "dag-cbor" => Ok(Self::DagCbor),
            "dag-json" => Ok(Self::DagJson),
            other => Err(SerializationError::UnknownCodec(other.to_string())),
        }
    }
}

/// Serialize any serde-compatible type to DAG-CBOR bytes
pub fn to_vec<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_ipld_dagcbor::to_vec(value).map_err(|e| SerializationError::DagCbor(e.to_string()))
}

/// Deserialize DAG-CBOR bytes to any serde-compatible type
pub fn from_slice<T: for<'de> Deserialize<'de>>(bytes: &[u8]) -> Result<T> {
    serde_ipld_dagcbor::from_slice(bytes).map_err(|e| SerializationError::DagCbor(e.to_string()))
}

/// Encode `value` with `codec`
pub fn encode<T: Serialize>(codec: BlobCodec, value: &T) -> Result<Vec<u8>> {
    match codec {
        BlobCodec::DagCbor => to_vec(value),
        BlobCodec::DagJson => {
            serde_json::to_vec(value).map_err(|e| SerializationError::DagJson(e.to_string()))
        }
    }
}

/// Decode `bytes` written with `codec`
pub fn decode<T: for<'de> Deserialize<'de>>(codec: BlobCodec, bytes: &[u8]) -> Result<T> {
    match codec {
        BlobCodec::DagCbor => from_slice(bytes),
        BlobCodec::DagJson => {
            serde_json::from_slice(bytes).map_err(|e| SerializationError::DagJson(e.to_string()))
        }
    }
}
