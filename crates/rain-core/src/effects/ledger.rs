//! Ledger effect interface
//!
//! One binding per chain connection. A binding may or may not hold a signer:
//! read-only RPC bindings answer queries and refuse transactions, wallet
//! bindings do both. Method names are passed through verbatim.

use crate::errors::RainError;
use crate::identifiers::{ChainAddress, TxHash};
use crate::transaction::{TransactionOptions, TransactionReceipt};
use async_trait::async_trait;

/// Failure of a ledger call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// RPC transport or node failure
    #[error("RPC failure calling `{method}`: {message}")]
    Rpc {
        /// Method being called
        method: String,
        /// Node or transport message
        message: String,
    },

    /// The call exceeded its bound
    #[error("`{method}` timed out after {timeout_ms}ms")]
    Timeout {
        /// Method being called
        method: String,
        /// Bound that was exceeded
        timeout_ms: u64,
    },

    /// The binding has no signer
    #[error("binding cannot sign `{method}`")]
    ReadOnly {
        /// Mutation that was attempted
        method: String,
    },

    /// Receipt requested for a transaction the node doesn't know
    #[error("unknown transaction {tx}")]
    UnknownTransaction {
        /// Hash that was looked up
        tx: TxHash,
    },
}

impl From<LedgerError> for RainError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::ReadOnly { method } => RainError::read_only_binding(method),
            other => RainError::ledger_unavailable(other.to_string()),
        }
    }
}

/// Calls against a deployed ledger instance
#[async_trait]
pub trait LedgerEffects: Send + Sync {
    /// Call a read method taking one address and returning a boolean
    async fn call_view(
        &self,
        contract: &ChainAddress,
        method: &str,
        subject: &ChainAddress,
    ) -> Result<bool, LedgerError>;

    /// Submit a write method taking one address; returns once the node accepted it
    async fn send_transaction(
        &self,
        contract: &ChainAddress,
        method: &str,
        subject: &ChainAddress,
        options: &TransactionOptions,
    ) -> Result<TxHash, LedgerError>;

    /// Wait for a submitted transaction to settle
    async fn await_receipt(&self, tx: &TxHash) -> Result<TransactionReceipt, LedgerError>;

    /// Whether this binding holds a signer
    fn can_sign(&self) -> bool;
}
