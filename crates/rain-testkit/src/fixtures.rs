//! Reusable fixtures: addresses, the community interface, tracing setup

use rain_core::{ChainAddress, LedgerInterface};
use serde_json::json;
use std::sync::Once;

/// Address whose last byte is `n` and all other bytes zero
pub fn test_address(n: u8) -> ChainAddress {
    let mut bytes = [0u8; 20];
    bytes[19] = n;
    ChainAddress::from_bytes(bytes)
}

fn view(name: &str) -> serde_json::Value {
    json!({
        "type": "function",
        "name": name,
        "stateMutability": "view",
        "inputs": [{ "name": "account", "type": "address" }],
        "outputs": [{ "name": "", "type": "bool" }]
    })
}

fn mutation(name: &str) -> serde_json::Value {
    json!({
        "type": "function",
        "name": name,
        "stateMutability": "nonpayable",
        "inputs": [{ "name": "account", "type": "address" }],
        "outputs": []
    })
}

/// Interface of the community ledger contract
pub fn community_interface() -> LedgerInterface {
    let mut items: Vec<serde_json::Value> = ["canAppend", "isOwner", "isAdmin", "isModerator", "isMember"]
        .into_iter()
        .map(view)
        .collect();
    items.extend(
        [
            "addMember",
            "removeMember",
            "addModerator",
            "removeModerator",
            "addAdmin",
            "removeAdmin",
            "transferOwnership",
        ]
        .into_iter()
        .map(mutation),
    );
    items.push(json!({
        "type": "event",
        "name": "OwnershipTransferred",
        "inputs": [
            { "name": "previousOwner", "type": "address", "indexed": true },
            { "name": "newOwner", "type": "address", "indexed": true }
        ]
    }));
    LedgerInterface::from_value(serde_json::Value::Array(items)).unwrap()
}

static TRACING: Once = Once::new();

/// Install a test-writer subscriber filtered by `RUST_LOG`; idempotent
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
