//! Ledger client adapter
//!
//! Binds one ledger instance (address + interface) to an injected
//! [`LedgerEffects`] binding. This is the only ledger-facing surface the
//! decision engine and mutation dispatcher use. Whether writes are possible
//! is a property of the binding, not of this type.

use crate::deadline::bounded;
use rain_core::descriptor::MethodKind;
use rain_core::effects::{LedgerEffects, LedgerError};
use rain_core::{
    CapabilityKind, ChainAddress, ControllerDescriptor, LedgerInterface, RainError, RainResult,
    TransactionOptions, TransactionReceipt, TxHash,
};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Ledger method names. They must match the bound interface exactly.
pub mod methods {
    /// Whether an address may append entries
    pub const CAN_APPEND: &str = "canAppend";
    /// Whether an address owns the community
    pub const IS_OWNER: &str = "isOwner";
    /// Whether an address is an admin
    pub const IS_ADMIN: &str = "isAdmin";
    /// Whether an address is a moderator
    pub const IS_MODERATOR: &str = "isModerator";
    /// Hand ownership to another address
    pub const TRANSFER_OWNERSHIP: &str = "transferOwnership";
}

/// Methods a controller's interface must declare, with their kinds
pub fn required_methods() -> Vec<(&'static str, MethodKind)> {
    let mut required = vec![
        (methods::CAN_APPEND, MethodKind::Read),
        (methods::IS_OWNER, MethodKind::Read),
        (methods::IS_ADMIN, MethodKind::Read),
        (methods::IS_MODERATOR, MethodKind::Read),
        (methods::TRANSFER_OWNERSHIP, MethodKind::Write),
    ];
    for kind in CapabilityKind::ALL {
        required.push((kind.add_method(), MethodKind::Write));
        required.push((kind.remove_method(), MethodKind::Write));
    }
    required
}

/// Client bound to one ledger instance
#[derive(Clone)]
pub struct LedgerClient {
    address: ChainAddress,
    interface: LedgerInterface,
    binding: Arc<dyn LedgerEffects>,
    call_timeout: Duration,
}

impl LedgerClient {
    /// Bind `descriptor` through `binding`
    pub fn bind(
        descriptor: &ControllerDescriptor,
        binding: Arc<dyn LedgerEffects>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            address: descriptor.ledger_address,
            interface: descriptor.ledger_interface.clone(),
            binding,
            call_timeout,
        }
    }

    /// Address of the bound ledger instance
    pub fn address(&self) -> &ChainAddress {
        &self.address
    }

    /// Interface of the bound ledger instance
    pub fn interface(&self) -> &LedgerInterface {
        &self.interface
    }

    /// Whether the binding can submit mutations
    pub fn can_sign(&self) -> bool {
        self.binding.can_sign()
    }

    fn require(&self, method: &str, kind: MethodKind) -> RainResult<()> {
        match self.interface.method(method) {
            Some(declared) if declared == kind => Ok(()),
            _ => Err(RainError::interface_mismatch(method)),
        }
    }

    async fn view(&self, method: &'static str, subject: &ChainAddress) -> RainResult<bool> {
        self.require(method, MethodKind::Read)?;
        let answer = bounded(
            self.call_timeout,
            self.binding.call_view(&self.address, method, subject),
            |timeout_ms| LedgerError::Timeout {
                method: method.to_string(),
                timeout_ms,
            },
        )
        .await?;
        trace!(ledger = %self.address, method, %subject, answer, "ledger query");
        Ok(answer)
    }

    async fn submit(
        &self,
        method: &'static str,
        subject: &ChainAddress,
        options: &TransactionOptions,
    ) -> RainResult<TransactionHandle> {
        self.require(method, MethodKind::Write)?;
        if !self.binding.can_sign() {
            return Err(RainError::read_only_binding(method));
        }
        let tx_hash = bounded(
            self.call_timeout,
            self.binding
                .send_transaction(&self.address, method, subject, options),
            |timeout_ms| LedgerError::Timeout {
                method: method.to_string(),
                timeout_ms,
            },
        )
        .await?;
        debug!(ledger = %self.address, method, %subject, tx = %tx_hash, "ledger mutation submitted");
        Ok(TransactionHandle::Pending(PendingTransaction {
            tx_hash,
            method,
            binding: Arc::clone(&self.binding),
            call_timeout: self.call_timeout,
        }))
    }

    /// Whether `address` may append entries
    pub async fn query_can_append(&self, address: &ChainAddress) -> RainResult<bool> {
        self.view(methods::CAN_APPEND, address).await
    }

    /// Whether `address` owns the community
    pub async fn query_is_owner(&self, address: &ChainAddress) -> RainResult<bool> {
        self.view(methods::IS_OWNER, address).await
    }

    /// Whether `address` is an admin
    pub async fn query_is_admin(&self, address: &ChainAddress) -> RainResult<bool> {
        self.view(methods::IS_ADMIN, address).await
    }

    /// Whether `address` is a moderator
    pub async fn query_is_moderator(&self, address: &ChainAddress) -> RainResult<bool> {
        self.view(methods::IS_MODERATOR, address).await
    }

    /// Submit the add-call for `kind`
    pub async fn mutate_add_capability(
        &self,
        kind: CapabilityKind,
        address: &ChainAddress,
        options: &TransactionOptions,
    ) -> RainResult<TransactionHandle> {
        self.submit(kind.add_method(), address, options).await
    }

    /// Submit the remove-call for `kind`
    pub async fn mutate_remove_capability(
        &self,
        kind: CapabilityKind,
        address: &ChainAddress,
        options: &TransactionOptions,
    ) -> RainResult<TransactionHandle> {
        self.submit(kind.remove_method(), address, options).await
    }

    /// Submit an ownership transfer to `address`
    pub async fn mutate_transfer_ownership(
        &self,
        address: &ChainAddress,
        options: &TransactionOptions,
    ) -> RainResult<TransactionHandle> {
        self.submit(methods::TRANSFER_OWNERSHIP, address, options)
            .await
    }
}

impl fmt::Debug for LedgerClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedgerClient")
            .field("address", &self.address)
            .field("can_sign", &self.binding.can_sign())
            .field("call_timeout", &self.call_timeout)
            .finish_non_exhaustive()
    }
}

/// Submitted transaction that has not been observed to settle
pub struct PendingTransaction {
    tx_hash: TxHash,
    method: &'static str,
    binding: Arc<dyn LedgerEffects>,
    call_timeout: Duration,
}

impl PendingTransaction {
    /// Hash of the submitted transaction
    pub fn tx_hash(&self) -> &TxHash {
        &self.tx_hash
    }

    /// Ledger method that was submitted
    pub fn method(&self) -> &'static str {
        self.method
    }

    /// Wait for settlement, bounded by the client's call timeout
    pub async fn confirmed(self) -> RainResult<TransactionReceipt> {
        let limit = self.call_timeout;
        self.confirmed_within(limit).await
    }

    /// Wait for settlement, bounded by `limit`
    pub async fn confirmed_within(self, limit: Duration) -> RainResult<TransactionReceipt> {
        let receipt = bounded(
            limit,
            self.binding.await_receipt(&self.tx_hash),
            |timeout_ms| LedgerError::Timeout {
                method: self.method.to_string(),
                timeout_ms,
            },
        )
        .await?;
        if !receipt.success {
            warn!(tx = %self.tx_hash, method = self.method, "ledger reverted mutation");
        }
        Ok(receipt)
    }
}

impl fmt::Debug for PendingTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingTransaction")
            .field("tx_hash", &self.tx_hash)
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}

/// Handle to a submitted mutation
#[derive(Debug)]
pub enum TransactionHandle {
    /// Submitted, settlement not awaited
    Pending(PendingTransaction),
    /// Settled
    Confirmed(TransactionReceipt),
}

impl TransactionHandle {
    /// Hash of the underlying transaction
    pub fn tx_hash(&self) -> &TxHash {
        match self {
            Self::Pending(pending) => pending.tx_hash(),
            Self::Confirmed(receipt) => &receipt.tx_hash,
        }
    }

    /// Whether settlement is still outstanding
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    /// Settle the transaction, waiting if it is still pending
    pub async fn settle(self) -> RainResult<TransactionReceipt> {
        match self {
            Self::Pending(pending) => pending.confirmed().await,
            Self::Confirmed(receipt) => Ok(receipt),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rain_testkit::{community_interface, test_address, MockLedger};

    fn client(ledger: &MockLedger) -> LedgerClient {
        let descriptor = ControllerDescriptor {
            ledger_address: test_address(0xc0),
            ledger_interface: community_interface(),
            encryption_key_id: None,
        };
        LedgerClient::bind(&descriptor, Arc::new(ledger.clone()), Duration::from_millis(200))
    }

    #[tokio::test]
    async fn test_queries_use_exact_method_names() {
        let ledger = MockLedger::new();
        let admin = test_address(1);
        ledger.set_admin(admin, true).await;

        let client = client(&ledger);
        assert!(client.query_is_admin(&admin).await.unwrap());
        assert!(!client.query_is_owner(&admin).await.unwrap());

        let calls = ledger.calls().await;
        let names: Vec<&str> = calls.iter().map(|c| c.method.as_str()).collect();
        assert_eq!(names, vec!["isAdmin", "isOwner"]);
    }

    #[tokio::test]
    async fn test_rpc_failure_is_not_false() {
        let ledger = MockLedger::new();
        ledger.fail_method(methods::CAN_APPEND, "connection reset").await;

        let err = client(&ledger)
            .query_can_append(&test_address(1))
            .await
            .unwrap_err();
        assert_matches!(err, RainError::LedgerUnavailable { .. });
    }

    #[tokio::test]
    async fn test_stalled_call_times_out_as_unavailable() {
        let ledger = MockLedger::new();
        ledger.stall_method(methods::IS_OWNER).await;

        let err = client(&ledger)
            .query_is_owner(&test_address(1))
            .await
            .unwrap_err();
        assert_matches!(err, RainError::LedgerUnavailable { message } if message.contains("timed out"));
    }

    #[tokio::test]
    async fn test_recovered_ledger_answers_again() {
        let ledger = MockLedger::new();
        let client = client(&ledger);
        let alice = test_address(1);
        ledger.set_member(alice, true).await;
        ledger.fail_method(methods::CAN_APPEND, "connection reset").await;
        ledger.stall_method(methods::IS_OWNER).await;

        assert!(client.query_can_append(&alice).await.is_err());
        assert!(client.query_is_owner(&alice).await.is_err());

        // No internal retries: the caller asks again once the node is back
        ledger.heal().await;
        assert!(client.query_can_append(&alice).await.unwrap());
        assert!(!client.query_is_owner(&alice).await.unwrap());
    }

    #[tokio::test]
    async fn test_undeclared_method_is_interface_mismatch() {
        let ledger = MockLedger::new();
        let descriptor = ControllerDescriptor {
            ledger_address: test_address(0xc0),
            ledger_interface: LedgerInterface::from_value(serde_json::json!([
                { "type": "function", "name": "isOwner", "stateMutability": "view" }
            ]))
            .unwrap(),
            encryption_key_id: None,
        };
        let client =
            LedgerClient::bind(&descriptor, Arc::new(ledger.clone()), Duration::from_millis(200));

        let err = client.query_is_admin(&test_address(1)).await.unwrap_err();
        assert_matches!(err, RainError::InterfaceMismatch { method } if method == "isAdmin");
        assert!(ledger.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_read_only_binding_refuses_mutations() {
        let ledger = MockLedger::read_only();
        let err = client(&ledger)
            .mutate_add_capability(
                CapabilityKind::Member,
                &test_address(1),
                &TransactionOptions::default(),
            )
            .await
            .unwrap_err();
        assert_matches!(err, RainError::ReadOnlyBinding { method } if method == "addMember");
        assert!(ledger.transactions().await.is_empty());
    }

    #[tokio::test]
    async fn test_pending_handle_settles() {
        let ledger = MockLedger::new();
        let member = test_address(9);
        let handle = client(&ledger)
            .mutate_add_capability(CapabilityKind::Member, &member, &TransactionOptions::default())
            .await
            .unwrap();
        assert!(handle.is_pending());

        let tx = handle.tx_hash().clone();
        let receipt = handle.settle().await.unwrap();
        assert_eq!(receipt.tx_hash, tx);
        assert!(receipt.success);
        assert!(ledger.can_append_now(&member).await);
    }

    #[test]
    fn test_required_methods_cover_every_kind() {
        let names: Vec<&str> = required_methods().into_iter().map(|(n, _)| n).collect();
        for kind in CapabilityKind::ALL {
            assert!(names.contains(&kind.add_method()));
            assert!(names.contains(&kind.remove_method()));
        }
        assert_eq!(names.len(), 11);
    }
}
