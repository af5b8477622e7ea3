//! Identity configuration as published by the identity service

use serde::{Deserialize, Serialize};

/// Link type naming an externally owned chain account
pub const ETHEREUM_EOA_LINK: &str = "ethereum-eoa";

/// One account linked to an identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityLink {
    /// Link type, e.g. [`ETHEREUM_EOA_LINK`]
    #[serde(rename = "type")]
    pub link_type: String,
    /// Raw linked address; not validated here
    pub address: String,
}

impl IdentityLink {
    /// Link of type [`ETHEREUM_EOA_LINK`]
    pub fn ethereum_eoa(address: impl Into<String>) -> Self {
        Self {
            link_type: ETHEREUM_EOA_LINK.to_string(),
            address: address.into(),
        }
    }
}

/// Linked-account configuration of an identity
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Linked accounts, in publication order
    #[serde(default)]
    pub links: Vec<IdentityLink>,
}

impl IdentityConfig {
    /// Primary chain account: the first `ethereum-eoa` link, if any
    ///
    /// Identities may link several accounts; only the first is consulted.
    pub fn primary_eoa(&self) -> Option<&str> {
        self.links
            .iter()
            .find(|link| link.link_type == ETHEREUM_EOA_LINK)
            .map(|link| link.address.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_eoa_takes_first_matching_link() {
        let config: IdentityConfig = serde_json::from_value(serde_json::json!({
            "links": [
                { "type": "twitter", "address": "@alice" },
                { "type": "ethereum-eoa", "address": "0x01" },
                { "type": "ethereum-eoa", "address": "0x02" }
            ]
        }))
        .unwrap();
        assert_eq!(config.primary_eoa(), Some("0x01"));
    }

    #[test]
    fn test_no_eoa_link_is_none() {
        let config = IdentityConfig {
            links: vec![IdentityLink {
                link_type: "github".into(),
                address: "alice".into(),
            }],
        };
        assert_eq!(config.primary_eoa(), None);
        assert_eq!(IdentityConfig::default().primary_eoa(), None);
    }
}
