//! Ledger transaction options and receipts

use crate::identifiers::{ChainAddress, TxHash};
use serde::{Deserialize, Serialize};

/// Caller-supplied submission options, passed through to the ledger binding
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransactionOptions {
    /// Sending account; the binding's default signer when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<ChainAddress>,
    /// Gas limit override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<u64>,
    /// Native value attached to the call, in the chain's smallest unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<u128>,
}

impl TransactionOptions {
    /// Options sending from `from`
    pub fn from_account(from: ChainAddress) -> Self {
        Self {
            from: Some(from),
            ..Self::default()
        }
    }

    /// Set the gas limit
    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }
}

/// Settled transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    /// Hash of the settled transaction
    pub tx_hash: TxHash,
    /// Block the transaction was included in
    pub block_number: u64,
    /// False when the ledger reverted the call
    pub success: bool,
}
