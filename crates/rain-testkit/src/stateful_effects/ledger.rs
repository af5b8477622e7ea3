//! Stateful community ledger mock
//!
//! Simulates the community contract in memory: role sets, an owner slot and
//! receipts for submitted transactions. Mutations apply when submitted and
//! settle immediately. Every call that reaches the binding is recorded.

use async_lock::RwLock;
use async_trait::async_trait;
use rain_core::effects::{LedgerEffects, LedgerError};
use rain_core::{ChainAddress, TransactionOptions, TransactionReceipt, TxHash};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::trace;

/// A view call that reached the binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewCall {
    /// Ledger instance called
    pub contract: ChainAddress,
    /// Method name as passed by the caller
    pub method: String,
    /// Address argument
    pub subject: ChainAddress,
}

/// A transaction that reached the binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedTransaction {
    /// Ledger instance called
    pub contract: ChainAddress,
    /// Method name as passed by the caller
    pub method: String,
    /// Address argument
    pub subject: ChainAddress,
    /// Options as passed by the caller
    pub options: TransactionOptions,
    /// Hash handed back
    pub tx_hash: TxHash,
}

#[derive(Debug, Default)]
struct LedgerState {
    owner: Option<ChainAddress>,
    admins: HashSet<ChainAddress>,
    moderators: HashSet<ChainAddress>,
    members: HashSet<ChainAddress>,
    open: bool,
    calls: Vec<ViewCall>,
    transactions: Vec<SubmittedTransaction>,
    receipts: HashMap<TxHash, TransactionReceipt>,
    failing: HashMap<String, String>,
    stalled: HashSet<String>,
    block: u64,
}

impl LedgerState {
    fn can_append(&self, address: &ChainAddress) -> bool {
        self.open
            || self.owner.as_ref() == Some(address)
            || self.admins.contains(address)
            || self.moderators.contains(address)
            || self.members.contains(address)
    }

    fn view(&self, method: &str, subject: &ChainAddress) -> Option<bool> {
        Some(match method {
            "canAppend" => self.can_append(subject),
            "isOwner" => self.owner.as_ref() == Some(subject),
            "isAdmin" => self.admins.contains(subject),
            "isModerator" => self.moderators.contains(subject),
            "isMember" => self.members.contains(subject),
            _ => return None,
        })
    }

    /// Apply a mutation; `false` means the contract reverted it
    fn apply(&mut self, method: &str, subject: ChainAddress) -> bool {
        // Adding a present role or removing an absent one is a no-op, not a revert
        match method {
            "addMember" => {
                self.members.insert(subject);
            }
            "removeMember" => {
                self.members.remove(&subject);
            }
            "addModerator" => {
                self.moderators.insert(subject);
            }
            "removeModerator" => {
                self.moderators.remove(&subject);
            }
            "addAdmin" => {
                self.admins.insert(subject);
            }
            "removeAdmin" => {
                self.admins.remove(&subject);
            }
            "transferOwnership" => self.owner = Some(subject),
            _ => return false,
        }
        true
    }

    fn injected_failure(&self, method: &str) -> Option<LedgerError> {
        self.failing.get(method).map(|message| LedgerError::Rpc {
            method: method.to_string(),
            message: message.clone(),
        })
    }
}

/// In-memory community ledger
#[derive(Debug, Clone)]
pub struct MockLedger {
    state: Arc<RwLock<LedgerState>>,
    can_sign: bool,
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLedger {
    /// Empty ledger behind a signing binding
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(LedgerState::default())),
            can_sign: true,
        }
    }

    /// Empty ledger behind a read-only binding
    pub fn read_only() -> Self {
        Self {
            can_sign: false,
            ..Self::new()
        }
    }

    /// Another binding onto the same ledger state, without a signer
    pub fn read_only_view(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            can_sign: false,
        }
    }

    /// Make `address` the owner
    pub async fn set_owner(&self, address: ChainAddress) {
        self.state.write().await.owner = Some(address);
    }

    /// Current owner
    pub async fn owner(&self) -> Option<ChainAddress> {
        self.state.read().await.owner
    }

    /// Record or clear admin status
    pub async fn set_admin(&self, address: ChainAddress, admin: bool) {
        let mut state = self.state.write().await;
        if admin {
            state.admins.insert(address);
        } else {
            state.admins.remove(&address);
        }
    }

    /// Record or clear moderator status
    pub async fn set_moderator(&self, address: ChainAddress, moderator: bool) {
        let mut state = self.state.write().await;
        if moderator {
            state.moderators.insert(address);
        } else {
            state.moderators.remove(&address);
        }
    }

    /// Record or clear membership
    pub async fn set_member(&self, address: ChainAddress, member: bool) {
        let mut state = self.state.write().await;
        if member {
            state.members.insert(address);
        } else {
            state.members.remove(&address);
        }
    }

    /// Let every address append
    pub async fn set_open(&self, open: bool) {
        self.state.write().await.open = open;
    }

    /// What `canAppend` would answer for `address` right now
    pub async fn can_append_now(&self, address: &ChainAddress) -> bool {
        self.state.read().await.can_append(address)
    }

    /// Fail every call to `method` with an RPC error
    pub async fn fail_method(&self, method: &str, message: &str) {
        self.state
            .write()
            .await
            .failing
            .insert(method.to_string(), message.to_string());
    }

    /// Never answer calls to `method`
    pub async fn stall_method(&self, method: &str) {
        self.state.write().await.stalled.insert(method.to_string());
    }

    /// Clear injected failures and stalls
    pub async fn heal(&self) {
        let mut state = self.state.write().await;
        state.failing.clear();
        state.stalled.clear();
    }

    /// View calls received so far
    pub async fn calls(&self) -> Vec<ViewCall> {
        self.state.read().await.calls.clone()
    }

    /// Transactions received so far
    pub async fn transactions(&self) -> Vec<SubmittedTransaction> {
        self.state.read().await.transactions.clone()
    }

    /// Drop recorded calls and transactions, keeping ledger state
    pub async fn clear_history(&self) {
        let mut state = self.state.write().await;
        state.calls.clear();
        state.transactions.clear();
    }

    async fn stall_if_requested(&self, method: &str) {
        let stalled = self.state.read().await.stalled.contains(method);
        if stalled {
            futures::future::pending::<()>().await;
        }
    }
}

#[async_trait]
impl LedgerEffects for MockLedger {
    async fn call_view(
        &self,
        contract: &ChainAddress,
        method: &str,
        subject: &ChainAddress,
    ) -> Result<bool, LedgerError> {
        self.state.write().await.calls.push(ViewCall {
            contract: *contract,
            method: method.to_string(),
            subject: *subject,
        });
        self.stall_if_requested(method).await;

        let state = self.state.read().await;
        if let Some(err) = state.injected_failure(method) {
            return Err(err);
        }
        state.view(method, subject).ok_or_else(|| LedgerError::Rpc {
            method: method.to_string(),
            message: "execution reverted: unknown selector".to_string(),
        })
    }

    async fn send_transaction(
        &self,
        contract: &ChainAddress,
        method: &str,
        subject: &ChainAddress,
        options: &TransactionOptions,
    ) -> Result<TxHash, LedgerError> {
        if !self.can_sign {
            return Err(LedgerError::ReadOnly {
                method: method.to_string(),
            });
        }
        self.stall_if_requested(method).await;

        let mut state = self.state.write().await;
        if let Some(err) = state.injected_failure(method) {
            return Err(err);
        }
        state.block += 1;
        let block_number = state.block;
        let tx_hash = TxHash::new(format!("0x{:064x}", state.transactions.len() + 1));
        let success = state.apply(method, *subject);
        trace!(method, %subject, tx = %tx_hash, success, "mock ledger mutation");

        state.transactions.push(SubmittedTransaction {
            contract: *contract,
            method: method.to_string(),
            subject: *subject,
            options: options.clone(),
            tx_hash: tx_hash.clone(),
        });
        state.receipts.insert(
            tx_hash.clone(),
            TransactionReceipt {
                tx_hash: tx_hash.clone(),
                block_number,
                success,
            },
        );
        Ok(tx_hash)
    }

    async fn await_receipt(&self, tx: &TxHash) -> Result<TransactionReceipt, LedgerError> {
        self.state
            .read()
            .await
            .receipts
            .get(tx)
            .cloned()
            .ok_or_else(|| LedgerError::UnknownTransaction { tx: tx.clone() })
    }

    fn can_sign(&self) -> bool {
        self.can_sign
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test_address;

    #[tokio::test]
    async fn test_mutations_apply_and_settle() {
        let ledger = MockLedger::new();
        let contract = test_address(0xc0);
        let bob = test_address(0xb0);

        let tx = ledger
            .send_transaction(&contract, "addModerator", &bob, &TransactionOptions::default())
            .await
            .unwrap();
        assert!(ledger.call_view(&contract, "isModerator", &bob).await.unwrap());
        assert!(ledger.await_receipt(&tx).await.unwrap().success);

        let unknown = TxHash::new("0xdead");
        assert!(matches!(
            ledger.await_receipt(&unknown).await,
            Err(LedgerError::UnknownTransaction { .. })
        ));
    }

    #[tokio::test]
    async fn test_read_only_view_shares_state() {
        let ledger = MockLedger::new();
        let view = ledger.read_only_view();
        ledger.set_owner(test_address(1)).await;

        assert_eq!(view.owner().await, Some(test_address(1)));
        assert!(!view.can_sign());
        let err = view
            .send_transaction(
                &test_address(0xc0),
                "addMember",
                &test_address(2),
                &TransactionOptions::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::ReadOnly { .. }));
    }
}
