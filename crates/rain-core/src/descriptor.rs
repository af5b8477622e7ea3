//! Controller descriptor and ledger interface description
//!
//! A descriptor names one ledger instance (address) and how to talk to it
//! (interface). It is what the controller persists and reloads.

use crate::errors::RainError;
use crate::identifiers::ChainAddress;
use serde::{Deserialize, Serialize};

/// Whether a ledger method reads state or submits a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    /// `view`/`pure` call; answered without a transaction
    Read,
    /// State-changing call; requires a signing binding
    Write,
}

/// Interface description of a ledger instance (a JSON ABI array)
///
/// Kept opaque apart from method lookup: the adapter only needs to know a
/// method exists and whether it reads or writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "serde_json::Value", into = "serde_json::Value")]
pub struct LedgerInterface(serde_json::Value);

impl LedgerInterface {
    /// Wrap an ABI value; it must be a JSON array
    pub fn from_value(value: serde_json::Value) -> Result<Self, RainError> {
        if !value.is_array() {
            return Err(RainError::invalid_configuration(
                "ledger interface must be a JSON array of ABI items",
            ));
        }
        Ok(Self(value))
    }

    /// Parse an ABI from its JSON text
    pub fn from_json_str(json: &str) -> Result<Self, RainError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// JSON text of the ABI
    pub fn to_json_string(&self) -> String {
        self.0.to_string()
    }

    /// Underlying ABI value
    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    fn items(&self) -> impl Iterator<Item = &serde_json::Value> {
        self.0.as_array().into_iter().flatten()
    }

    /// Kind of the function `name`, or `None` if the interface doesn't declare it
    pub fn method(&self, name: &str) -> Option<MethodKind> {
        self.items()
            .filter(|item| {
                // ABI items without a type default to functions
                item.get("type")
                    .and_then(|t| t.as_str())
                    .map_or(true, |t| t == "function")
            })
            .find(|item| item.get("name").and_then(|n| n.as_str()) == Some(name))
            .map(|item| {
                let mutability = item.get("stateMutability").and_then(|m| m.as_str());
                let constant = item.get("constant").and_then(|c| c.as_bool());
                match (mutability, constant) {
                    (Some("view" | "pure"), _) | (None, Some(true)) => MethodKind::Read,
                    _ => MethodKind::Write,
                }
            })
    }

    /// Names of all declared functions
    pub fn method_names(&self) -> Vec<&str> {
        self.items()
            .filter(|item| item.get("type").and_then(|t| t.as_str()).map_or(true, |t| t == "function"))
            .filter_map(|item| item.get("name").and_then(|n| n.as_str()))
            .collect()
    }
}

impl TryFrom<serde_json::Value> for LedgerInterface {
    type Error = RainError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl From<LedgerInterface> for serde_json::Value {
    fn from(interface: LedgerInterface) -> Self {
        interface.0
    }
}

/// Configuration of one controller instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerDescriptor {
    /// Address of the ledger instance
    pub ledger_address: ChainAddress,
    /// Interface of the ledger instance
    pub ledger_interface: LedgerInterface,
    /// Key used for confidential channel payloads, if any
    pub encryption_key_id: Option<String>,
}

impl ControllerDescriptor {
    /// Persisted form
    pub fn to_stored(&self) -> StoredDescriptor {
        StoredDescriptor {
            contract_address: self.ledger_address.to_string(),
            abi: self.ledger_interface.to_json_string(),
            encryption_key_id: self.encryption_key_id.clone(),
        }
    }

    /// Rebuild from the persisted form, failing with [`RainError::DescriptorCorrupt`]
    pub fn from_stored(stored: StoredDescriptor) -> Result<Self, RainError> {
        let ledger_address = ChainAddress::parse(&stored.contract_address)
            .map_err(|e| RainError::descriptor_corrupt(format!("contractAddress: {e}")))?;
        let ledger_interface = LedgerInterface::from_json_str(&stored.abi)
            .map_err(|e| RainError::descriptor_corrupt(format!("abi: {e}")))?;
        Ok(Self {
            ledger_address,
            ledger_interface,
            encryption_key_id: stored.encryption_key_id,
        })
    }
}

/// Wire form of a descriptor; the interface is stored as JSON text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredDescriptor {
    /// Ledger address as a string
    #[serde(rename = "contractAddress")]
    pub contract_address: String,
    /// Interface JSON text
    pub abi: String,
    /// Optional encryption key identifier
    #[serde(
        rename = "encryptionKeyId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub encryption_key_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn abi() -> LedgerInterface {
        LedgerInterface::from_value(json!([
            { "type": "function", "name": "isOwner", "stateMutability": "view" },
            { "type": "function", "name": "addMember", "stateMutability": "nonpayable" },
            { "name": "canAppend", "constant": true },
            { "type": "event", "name": "MemberAdded" }
        ]))
        .unwrap()
    }

    #[test]
    fn test_method_lookup() {
        let abi = abi();
        assert_eq!(abi.method("isOwner"), Some(MethodKind::Read));
        assert_eq!(abi.method("canAppend"), Some(MethodKind::Read));
        assert_eq!(abi.method("addMember"), Some(MethodKind::Write));
        assert_eq!(abi.method("MemberAdded"), None);
        assert_eq!(abi.method("isadmin"), None);
        assert_eq!(abi.method_names(), vec!["isOwner", "addMember", "canAppend"]);
    }

    #[test]
    fn test_interface_must_be_array() {
        assert!(LedgerInterface::from_value(json!({ "abi": [] })).is_err());
        assert!(LedgerInterface::from_json_str("not json").is_err());
    }

    #[test]
    fn test_stored_form_rejects_corruption() {
        let descriptor = ControllerDescriptor {
            ledger_address: ChainAddress::from_bytes([7; 20]),
            ledger_interface: abi(),
            encryption_key_id: None,
        };
        let stored = descriptor.to_stored();
        assert_eq!(ControllerDescriptor::from_stored(stored.clone()).unwrap(), descriptor);

        let bad_abi = StoredDescriptor {
            abi: "{".into(),
            ..stored.clone()
        };
        assert!(matches!(
            ControllerDescriptor::from_stored(bad_abi),
            Err(RainError::DescriptorCorrupt { .. })
        ));

        let bad_addr = StoredDescriptor {
            contract_address: "0x1".into(),
            ..stored
        };
        assert!(matches!(
            ControllerDescriptor::from_stored(bad_addr),
            Err(RainError::DescriptorCorrupt { .. })
        ));
    }
}
