//! Identifier types used across the Rain controller
//!
//! Log identities and chain addresses live in different namespaces: entries
//! are authored by an [`IdentityId`], the ledger indexes capabilities by
//! [`ChainAddress`]. Nothing here converts between the two; that is the
//! resolver's job.

use crate::errors::RainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// DID-like identifier that authors log entries
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityId(String);

impl IdentityId {
    /// Wrap an identifier string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IdentityId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for IdentityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Length of a chain address in bytes
pub const CHAIN_ADDRESS_LEN: usize = 20;

/// Syntactically valid chain address
///
/// Accepts 40 hex digits with or without a `0x` prefix, in any case.
/// Displays as lowercase `0x`-prefixed hex, so two spellings of the same
/// address compare equal.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChainAddress([u8; CHAIN_ADDRESS_LEN]);

impl ChainAddress {
    /// Build an address from raw bytes
    pub fn from_bytes(bytes: [u8; CHAIN_ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw address bytes
    pub fn as_bytes(&self) -> &[u8; CHAIN_ADDRESS_LEN] {
        &self.0
    }

    /// Parse an address, failing with [`RainError::InvalidAddress`]
    pub fn parse(raw: &str) -> Result<Self, RainError> {
        let trimmed = raw.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if digits.len() != CHAIN_ADDRESS_LEN * 2 {
            return Err(RainError::invalid_address(format!(
                "\"{raw}\" is not a valid chain address: expected 40 hex digits, got {}",
                digits.len()
            )));
        }

        let mut bytes = [0u8; CHAIN_ADDRESS_LEN];
        hex::decode_to_slice(digits, &mut bytes).map_err(|e| {
            RainError::invalid_address(format!("\"{raw}\" is not a valid chain address: {e}"))
        })?;
        Ok(Self(bytes))
    }

    /// Whether `raw` parses as a chain address
    pub fn is_valid(raw: &str) -> bool {
        Self::parse(raw).is_ok()
    }
}

impl fmt::Display for ChainAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for ChainAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChainAddress({self})")
    }
}

impl FromStr for ChainAddress {
    type Err = RainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ChainAddress {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ChainAddress {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Content hash of a log entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryHash(String);

impl EntryHash {
    /// Wrap an entry hash string
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    /// Borrow the hash string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Path prefix under which descriptor references may be addressed
pub const DESCRIPTOR_PATH_PREFIX: &str = "/ipfs/";

/// Content reference of a persisted controller descriptor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DescriptorRef(String);

impl DescriptorRef {
    /// Wrap a reference, stripping the `/ipfs/<ref>` path form if present
    pub fn new(reference: impl Into<String>) -> Self {
        let reference = reference.into();
        match reference.strip_prefix(DESCRIPTOR_PATH_PREFIX) {
            Some(rest) => Self(rest.split('/').next().unwrap_or_default().to_string()),
            None => Self(reference),
        }
    }

    /// Borrow the bare reference
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path form, `/ipfs/<ref>`
    pub fn to_path(&self) -> String {
        format!("{DESCRIPTOR_PATH_PREFIX}{}", self.0)
    }
}

impl fmt::Display for DescriptorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hash of a submitted ledger transaction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(String);

impl TxHash {
    /// Wrap a transaction hash
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    /// Borrow the hash string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
