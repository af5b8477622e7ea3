//! Log entry model consumed by the controller
//!
//! These types mirror what the host log hands to an access controller. The
//! controller only reads them.

use crate::identifiers::{EntryHash, IdentityId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operation tag carried in an entry payload
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operation {
    /// Append a new value
    Add,
    /// Retract the entry whose hash is the payload value
    Del,
    /// Any other tag; never authorized
    Other(String),
}

impl Operation {
    /// Wire tag for this operation
    pub fn as_str(&self) -> &str {
        match self {
            Self::Add => "ADD",
            Self::Del => "DEL",
            Self::Other(tag) => tag,
        }
    }
}

impl From<String> for Operation {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "ADD" => Self::Add,
            "DEL" => Self::Del,
            _ => Self::Other(tag),
        }
    }
}

impl From<&str> for Operation {
    fn from(tag: &str) -> Self {
        Self::from(tag.to_string())
    }
}

impl From<Operation> for String {
    fn from(op: Operation) -> Self {
        op.as_str().to_string()
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryPayload {
    /// Operation tag
    pub op: Operation,
    /// Appended value, or the target hash for `DEL`
    #[serde(default)]
    pub value: serde_json::Value,
}

impl EntryPayload {
    /// Payload appending `value`
    pub fn add(value: serde_json::Value) -> Self {
        Self {
            op: Operation::Add,
            value,
        }
    }

    /// Payload deleting the entry with `target` hash
    pub fn del(target: &EntryHash) -> Self {
        Self {
            op: Operation::Del,
            value: serde_json::Value::String(target.as_str().to_string()),
        }
    }

    /// Target hash of a `DEL` payload, if the value is a string
    pub fn delete_target(&self) -> Option<EntryHash> {
        self.value.as_str().map(EntryHash::new)
    }
}

/// Signatures attached to a log identity
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IdentitySignatures {
    /// Signature over the identity id
    pub id: String,
    /// Signature over the public key
    #[serde(rename = "publicKey")]
    pub public_key: String,
}

/// Author identity attached to a log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogIdentity {
    /// DID-like author identifier
    pub id: IdentityId,
    /// Public key material, hex encoded
    #[serde(rename = "publicKey")]
    pub public_key: String,
    /// Signatures binding the key to the id
    #[serde(default)]
    pub signatures: IdentitySignatures,
}

/// Entry as handed to the controller by the host log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Content hash of this entry
    pub hash: EntryHash,
    /// Author identity
    pub identity: LogIdentity,
    /// Operation and value
    pub payload: EntryPayload,
}

impl LogEntry {
    /// Author identifier
    pub fn author(&self) -> &IdentityId {
        &self.identity.id
    }
}
