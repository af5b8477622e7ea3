//! Capability decision engine
//!
//! Decides whether a log entry may be appended. `ADD` entries need the
//! ledger's append capability; `DEL` entries compare the deleter's tier with
//! the original author's:
//!
//! ```text
//! resolve acting address ── unresolved ──────────────────────────────► DENY
//!   │
//!   ├─ ADD ─► canAppend(acting) ∧ signature ───────────────────────► ALLOW | DENY
//!   │
//!   ├─ DEL ─► fetch target ─ self-delete ─► signature ──────────────► ALLOW | DENY
//!   │                      └ other author ─► target tier = OWNER ───► DENY
//!   │                                      └ acting > target ∧ sig ─► ALLOW | DENY
//!   │
//!   └─ other op ────────────────────────────────────────────────────► DENY
//! ```
//!
//! Remote failures are errors, never denials.

use crate::deadline::bounded;
use crate::ledger_client::LedgerClient;
use crate::resolver::{AddressResolution, IdentityResolver};
use rain_core::effects::{
    EntryLogEffects, IdentityProviderEffects, IdentityServiceError, LogError,
};
use rain_core::{CapabilityTier, ChainAddress, EntryHash, LogEntry, Operation, RainResult};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Why an entry was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// Acting identity has no valid linked chain address
    UnresolvedAuthor,
    /// Ledger does not grant the acting address append capability
    LedgerDenied,
    /// Identity signature did not verify
    InvalidSignature,
    /// `DEL` payload value is not an entry hash
    MalformedPayload,
    /// `DEL` target does not exist in the log
    UnknownTarget,
    /// `DEL` target was authored by the owner
    ProtectedTarget,
    /// Deleter does not outrank the target's author
    InsufficientTier {
        /// Deleter's tier
        acting: CapabilityTier,
        /// Target author's tier
        target: CapabilityTier,
    },
    /// Operation other than `ADD`/`DEL`
    UnsupportedOperation,
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnresolvedAuthor => f.write_str("author has no valid chain address"),
            Self::LedgerDenied => f.write_str("ledger does not grant append"),
            Self::InvalidSignature => f.write_str("identity signature invalid"),
            Self::MalformedPayload => f.write_str("delete payload is not an entry hash"),
            Self::UnknownTarget => f.write_str("delete target not found"),
            Self::ProtectedTarget => f.write_str("owner entries cannot be deleted by others"),
            Self::InsufficientTier { acting, target } => {
                write!(f, "{acting} does not outrank {target}")
            }
            Self::UnsupportedOperation => f.write_str("unsupported operation"),
        }
    }
}

/// Verdict for one entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// Entry may be appended
    Allow,
    /// Entry must be refused
    Deny(DenialReason),
}

impl AccessDecision {
    /// Whether the entry may be appended
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Denial reason, if denied
    pub fn reason(&self) -> Option<DenialReason> {
        match self {
            Self::Allow => None,
            Self::Deny(reason) => Some(*reason),
        }
    }

    fn from_signature(signature_valid: bool) -> Self {
        if signature_valid {
            Self::Allow
        } else {
            Self::Deny(DenialReason::InvalidSignature)
        }
    }
}

/// Stateless decision procedure over a bound ledger
#[derive(Clone)]
pub struct DecisionEngine {
    resolver: IdentityResolver,
    ledger: LedgerClient,
    log: Arc<dyn EntryLogEffects>,
    call_timeout: Duration,
}

impl DecisionEngine {
    /// Engine resolving through `resolver`, querying `ledger`, reading targets from `log`
    pub fn new(
        resolver: IdentityResolver,
        ledger: LedgerClient,
        log: Arc<dyn EntryLogEffects>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            resolver,
            ledger,
            log,
            call_timeout,
        }
    }

    /// Bound ledger client
    pub fn ledger(&self) -> &LedgerClient {
        &self.ledger
    }

    /// Identity resolver
    pub fn resolver(&self) -> &IdentityResolver {
        &self.resolver
    }

    /// Highest tier recorded for `address`
    ///
    /// Probes run concurrently but are read strictly owner, admin, moderator:
    /// the first `true` wins and lower probes are not consulted, so an address
    /// recorded as both admin and moderator is `Admin`. Membership is not
    /// probed; plain members rank as `None`.
    pub async fn greatest_capability(&self, address: &ChainAddress) -> RainResult<CapabilityTier> {
        let (owner, admin, moderator) = futures::join!(
            self.ledger.query_is_owner(address),
            self.ledger.query_is_admin(address),
            self.ledger.query_is_moderator(address),
        );

        let tier = if owner? {
            CapabilityTier::Owner
        } else if admin? {
            CapabilityTier::Admin
        } else if moderator? {
            CapabilityTier::Moderator
        } else {
            CapabilityTier::None
        };
        debug!(%address, %tier, "greatest capability");
        Ok(tier)
    }

    /// Decide whether `entry` may be appended
    pub async fn can_append(
        &self,
        entry: &LogEntry,
        identity_provider: &dyn IdentityProviderEffects,
    ) -> RainResult<AccessDecision> {
        let author = entry.author();
        let acting = match self.resolver.resolve_address(author).await? {
            AddressResolution::Resolved(address) => address,
            AddressResolution::Unlinked => {
                warn!(identity = %author, entry = %entry.hash, "author has no linked chain address");
                return Ok(AccessDecision::Deny(DenialReason::UnresolvedAuthor));
            }
            AddressResolution::Malformed { raw } => {
                warn!(identity = %author, entry = %entry.hash, "\"{raw}\" is not a valid chain address");
                return Ok(AccessDecision::Deny(DenialReason::UnresolvedAuthor));
            }
        };

        let decision = match &entry.payload.op {
            Operation::Add => self.decide_add(entry, &acting, identity_provider).await?,
            Operation::Del => self.decide_del(entry, &acting, identity_provider).await?,
            Operation::Other(tag) => {
                warn!(op = %tag, entry = %entry.hash, "unsupported log operation");
                AccessDecision::Deny(DenialReason::UnsupportedOperation)
            }
        };
        debug!(entry = %entry.hash, identity = %author, %acting, ?decision, "append decision");
        Ok(decision)
    }

    async fn decide_add(
        &self,
        entry: &LogEntry,
        acting: &ChainAddress,
        identity_provider: &dyn IdentityProviderEffects,
    ) -> RainResult<AccessDecision> {
        // Both conjuncts always run so the verdict's timing doesn't reveal which failed.
        let (granted, signature_valid) = futures::join!(
            self.ledger.query_can_append(acting),
            self.verify_signature(entry, identity_provider),
        );
        Ok(match (granted?, signature_valid?) {
            (false, _) => AccessDecision::Deny(DenialReason::LedgerDenied),
            (true, valid) => AccessDecision::from_signature(valid),
        })
    }

    async fn decide_del(
        &self,
        entry: &LogEntry,
        acting: &ChainAddress,
        identity_provider: &dyn IdentityProviderEffects,
    ) -> RainResult<AccessDecision> {
        let Some(target_hash) = entry.payload.delete_target() else {
            warn!(entry = %entry.hash, "delete payload value is not an entry hash");
            return Ok(AccessDecision::Deny(DenialReason::MalformedPayload));
        };

        let Some(target) = self.fetch_target(&target_hash).await? else {
            debug!(entry = %entry.hash, target = %target_hash, "delete target not found");
            return Ok(AccessDecision::Deny(DenialReason::UnknownTarget));
        };

        if target.author() == entry.author() {
            let signature_valid = self.verify_signature(entry, identity_provider).await?;
            return Ok(AccessDecision::from_signature(signature_valid));
        }

        let (target_tier, acting_tier) = futures::join!(
            self.author_tier(&target),
            self.greatest_capability(acting),
        );

        let target_tier = target_tier?;
        if target_tier.is_protected() {
            return Ok(AccessDecision::Deny(DenialReason::ProtectedTarget));
        }

        let acting_tier = acting_tier?;
        if acting_tier > target_tier {
            let signature_valid = self.verify_signature(entry, identity_provider).await?;
            Ok(AccessDecision::from_signature(signature_valid))
        } else {
            Ok(AccessDecision::Deny(DenialReason::InsufficientTier {
                acting: acting_tier,
                target: target_tier,
            }))
        }
    }

    /// Tier of `target`'s author; authors without a valid address rank `None`
    async fn author_tier(&self, target: &LogEntry) -> RainResult<CapabilityTier> {
        match self.resolver.resolve_address(target.author()).await?.address() {
            Some(address) => self.greatest_capability(&address).await,
            None => Ok(CapabilityTier::None),
        }
    }

    async fn verify_signature(
        &self,
        entry: &LogEntry,
        identity_provider: &dyn IdentityProviderEffects,
    ) -> RainResult<bool> {
        let verdict = bounded(
            self.call_timeout,
            identity_provider.verify_identity(&entry.identity),
            |timeout_ms| IdentityServiceError::VerificationTimeout {
                identity: entry.author().clone(),
                timeout_ms,
            },
        )
        .await?;
        Ok(verdict)
    }

    async fn fetch_target(&self, hash: &EntryHash) -> RainResult<Option<LogEntry>> {
        let fetched = bounded(self.call_timeout, self.log.get_entry(hash), |timeout_ms| {
            LogError::Unavailable {
                message: format!("fetching {hash} timed out after {timeout_ms}ms"),
            }
        })
        .await;
        match fetched {
            Ok(entry) => Ok(Some(entry)),
            Err(LogError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

impl fmt::Debug for DecisionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecisionEngine")
            .field("ledger", &self.ledger)
            .field("call_timeout", &self.call_timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rain_core::{ControllerDescriptor, RainError};
    use rain_testkit::{
        community_interface, test_address, EntryBuilder, MockEntryLog, MockIdentityDirectory,
        MockIdentityProvider, MockLedger,
    };

    struct Harness {
        ledger: MockLedger,
        directory: MockIdentityDirectory,
        log: MockEntryLog,
        provider: MockIdentityProvider,
        engine: DecisionEngine,
    }

    fn harness() -> Harness {
        let ledger = MockLedger::new();
        let directory = MockIdentityDirectory::new();
        let log = MockEntryLog::new();
        let timeout = Duration::from_millis(200);
        let descriptor = ControllerDescriptor {
            ledger_address: test_address(0xc0),
            ledger_interface: community_interface(),
            encryption_key_id: None,
        };
        let engine = DecisionEngine::new(
            IdentityResolver::new(Arc::new(directory.clone()), timeout),
            LedgerClient::bind(&descriptor, Arc::new(ledger.clone()), timeout),
            Arc::new(log.clone()),
            timeout,
        );
        Harness {
            ledger,
            directory,
            log,
            provider: MockIdentityProvider::accepting(),
            engine,
        }
    }

    #[tokio::test]
    async fn test_owner_wins_over_admin_and_moderator() {
        let h = harness();
        let addr = test_address(1);
        h.ledger.set_owner(addr).await;
        h.ledger.set_admin(addr, true).await;
        h.ledger.set_moderator(addr, true).await;
        assert_eq!(
            h.engine.greatest_capability(&addr).await.unwrap(),
            CapabilityTier::Owner
        );
    }

    #[tokio::test]
    async fn test_admin_wins_over_moderator() {
        let h = harness();
        let addr = test_address(2);
        h.ledger.set_admin(addr, true).await;
        h.ledger.set_moderator(addr, true).await;
        assert_eq!(
            h.engine.greatest_capability(&addr).await.unwrap(),
            CapabilityTier::Admin
        );
    }

    #[tokio::test]
    async fn test_members_rank_none() {
        let h = harness();
        let addr = test_address(3);
        h.ledger.set_member(addr, true).await;
        assert_eq!(
            h.engine.greatest_capability(&addr).await.unwrap(),
            CapabilityTier::None
        );
    }

    #[tokio::test]
    async fn test_lower_probe_failure_ignored_once_owner_answers() {
        let h = harness();
        let addr = test_address(4);
        h.ledger.set_owner(addr).await;
        h.ledger.fail_method("isModerator", "node restarting").await;
        assert_eq!(
            h.engine.greatest_capability(&addr).await.unwrap(),
            CapabilityTier::Owner
        );
    }

    #[tokio::test]
    async fn test_higher_probe_failure_propagates() {
        let h = harness();
        let addr = test_address(5);
        h.ledger.set_moderator(addr, true).await;
        h.ledger.fail_method("isAdmin", "node restarting").await;
        assert_matches!(
            h.engine.greatest_capability(&addr).await,
            Err(RainError::LedgerUnavailable { .. })
        );
    }

    #[tokio::test]
    async fn test_add_requires_ledger_and_signature() {
        let h = harness();
        let alice = test_address(0xa1);
        h.directory.link("did:3:alice", alice).await;
        let entry = EntryBuilder::add("did:3:alice").build();

        assert_eq!(
            h.engine.can_append(&entry, &h.provider).await.unwrap(),
            AccessDecision::Deny(DenialReason::LedgerDenied)
        );

        h.ledger.set_member(alice, true).await;
        assert_eq!(
            h.engine.can_append(&entry, &h.provider).await.unwrap(),
            AccessDecision::Allow
        );

        let rejecting = MockIdentityProvider::rejecting();
        assert_eq!(
            h.engine.can_append(&entry, &rejecting).await.unwrap(),
            AccessDecision::Deny(DenialReason::InvalidSignature)
        );
    }

    #[tokio::test]
    async fn test_add_verifies_signature_even_when_ledger_denies() {
        let h = harness();
        h.directory.link("did:3:alice", test_address(0xa1)).await;
        let entry = EntryBuilder::add("did:3:alice").build();

        h.engine.can_append(&entry, &h.provider).await.unwrap();
        assert_eq!(h.provider.verifications().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_operation_denied() {
        let h = harness();
        let alice = test_address(0xa1);
        h.directory.link("did:3:alice", alice).await;
        h.ledger.set_owner(alice).await;
        let entry = EntryBuilder::op("did:3:alice", "PUT").build();

        assert_eq!(
            h.engine.can_append(&entry, &h.provider).await.unwrap(),
            AccessDecision::Deny(DenialReason::UnsupportedOperation)
        );
    }

    #[tokio::test]
    async fn test_self_delete_needs_only_signature() {
        let h = harness();
        h.directory.link("did:3:carol", test_address(0xc1)).await;
        let original = h.log.append(EntryBuilder::add("did:3:carol").build()).await;
        let del = EntryBuilder::del("did:3:carol", &original.hash).build();

        assert_eq!(
            h.engine.can_append(&del, &h.provider).await.unwrap(),
            AccessDecision::Allow
        );
        assert!(h.ledger.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_delete_of_unknown_target_denied() {
        let h = harness();
        h.directory.link("did:3:carol", test_address(0xc1)).await;
        let del = EntryBuilder::del("did:3:carol", &EntryHash::new("zdpuMissing")).build();

        assert_eq!(
            h.engine.can_append(&del, &h.provider).await.unwrap(),
            AccessDecision::Deny(DenialReason::UnknownTarget)
        );
    }

    #[tokio::test]
    async fn test_delete_with_non_hash_value_denied() {
        let h = harness();
        h.directory.link("did:3:carol", test_address(0xc1)).await;
        let del = EntryBuilder::op("did:3:carol", "DEL")
            .value(serde_json::json!(42))
            .build();

        assert_eq!(
            h.engine.can_append(&del, &h.provider).await.unwrap(),
            AccessDecision::Deny(DenialReason::MalformedPayload)
        );
    }

    #[tokio::test]
    async fn test_log_failure_propagates() {
        let h = harness();
        h.directory.link("did:3:carol", test_address(0xc1)).await;
        h.log.fail_with("replication stalled").await;
        let del = EntryBuilder::del("did:3:carol", &EntryHash::new("zdpuX")).build();

        assert_matches!(
            h.engine.can_append(&del, &h.provider).await,
            Err(RainError::LogUnavailable { .. })
        );
    }

    #[tokio::test]
    async fn test_stalled_target_fetch_is_log_unavailable() {
        let h = harness();
        h.directory.link("did:3:carol", test_address(0xc1)).await;
        let original = h.log.append(EntryBuilder::add("did:3:carol").build()).await;
        h.log.stall().await;
        let del = EntryBuilder::del("did:3:carol", &original.hash).build();

        assert_matches!(
            h.engine.can_append(&del, &h.provider).await,
            Err(RainError::LogUnavailable { message }) if message.contains("200ms")
        );
    }

    #[tokio::test]
    async fn test_stalled_verification_is_unavailable() {
        let h = harness();
        let carol = test_address(0xc1);
        h.directory.link("did:3:carol", carol).await;
        h.ledger.set_member(carol, true).await;
        let original = h.log.append(EntryBuilder::add("did:3:carol").build()).await;
        h.provider.stall().await;

        let add = EntryBuilder::add("did:3:carol").build();
        let del = EntryBuilder::del("did:3:carol", &original.hash).build();
        for entry in [add, del] {
            assert_matches!(
                h.engine.can_append(&entry, &h.provider).await,
                Err(RainError::IdentityServiceUnavailable { message })
                    if message.contains("signature verification")
            );
        }
    }

    #[tokio::test]
    async fn test_unlinked_target_author_ranks_none() {
        let h = harness();
        let moderator = test_address(0xd1);
        h.directory.link("did:3:mod", moderator).await;
        h.ledger.set_moderator(moderator, true).await;
        let original = h.log.append(EntryBuilder::add("did:3:drifter").build()).await;
        let del = EntryBuilder::del("did:3:mod", &original.hash).build();

        assert_eq!(
            h.engine.can_append(&del, &h.provider).await.unwrap(),
            AccessDecision::Allow
        );
    }
}
