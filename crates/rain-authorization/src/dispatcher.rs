//! Capability mutation dispatcher
//!
//! Turns administrative intents into ledger mutations. Malformed requests
//! (unknown capability kind, target without a valid address) are answered
//! with [`MutationOutcome::Rejected`] rather than an error, and never reach
//! the ledger. Remote failures are still errors.

use crate::ledger_client::{LedgerClient, TransactionHandle};
use crate::resolver::{AddressResolution, IdentityResolver};
use rain_core::{
    CapabilityKind, ChainAddress, ConfirmationPolicy, IdentityId, RainError, RainResult,
    TransactionOptions,
};
use std::fmt;
use tracing::{debug, warn};

/// Why a mutation request was refused before dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Capability kind is not MEMBER, MODERATOR or ADMIN
    InvalidCapabilityKind {
        /// Kind as supplied
        kind: String,
    },
    /// Target identity has no linked chain address
    UnlinkedIdentity {
        /// Target identity
        identity: IdentityId,
    },
    /// Target identity links a malformed address
    InvalidAddress {
        /// Target identity
        identity: IdentityId,
        /// Address as published
        raw: String,
    },
}

impl Rejection {
    /// Equivalent error, for callers that prefer `?` over matching
    pub fn into_error(self) -> RainError {
        match self {
            Self::InvalidCapabilityKind { kind } => RainError::invalid_capability_kind(kind),
            Self::UnlinkedIdentity { identity } => {
                RainError::invalid_address(format!("{identity} has no linked chain address"))
            }
            Self::InvalidAddress { identity, raw } => RainError::invalid_address(format!(
                "\"{raw}\" linked from {identity} is not a valid chain address"
            )),
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCapabilityKind { kind } => write!(f, "\"{kind}\" is not a valid capability"),
            Self::UnlinkedIdentity { identity } => {
                write!(f, "{identity} has no linked chain address")
            }
            Self::InvalidAddress { raw, .. } => write!(f, "\"{raw}\" is not a valid chain address"),
        }
    }
}

/// Result of a mutation request that did not fail remotely
#[derive(Debug)]
pub enum MutationOutcome {
    /// Submitted to the ledger
    Dispatched(TransactionHandle),
    /// Refused before dispatch; no ledger call was made
    Rejected(Rejection),
}

impl MutationOutcome {
    /// Whether the mutation reached the ledger
    pub fn is_dispatched(&self) -> bool {
        matches!(self, Self::Dispatched(_))
    }

    /// Rejection, if refused
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Dispatched(_) => None,
            Self::Rejected(rejection) => Some(rejection),
        }
    }

    /// Transaction handle, or the rejection as a typed error
    pub fn into_result(self) -> RainResult<TransactionHandle> {
        match self {
            Self::Dispatched(handle) => Ok(handle),
            Self::Rejected(rejection) => Err(rejection.into_error()),
        }
    }
}

/// Validates and submits grant, revoke and ownership transfer requests
#[derive(Debug, Clone)]
pub struct MutationDispatcher {
    resolver: IdentityResolver,
    ledger: LedgerClient,
    policy: ConfirmationPolicy,
}

impl MutationDispatcher {
    /// Dispatcher submitting through `ledger` under `policy`
    pub fn new(resolver: IdentityResolver, ledger: LedgerClient, policy: ConfirmationPolicy) -> Self {
        Self {
            resolver,
            ledger,
            policy,
        }
    }

    /// Grant `capability` to `identity`
    pub async fn grant(
        &self,
        capability: &str,
        identity: &IdentityId,
        options: &TransactionOptions,
    ) -> RainResult<MutationOutcome> {
        let kind = match parse_kind(capability) {
            Ok(kind) => kind,
            Err(rejection) => return Ok(MutationOutcome::Rejected(rejection)),
        };
        let address = match self.target(identity).await? {
            Ok(address) => address,
            Err(rejection) => return Ok(MutationOutcome::Rejected(rejection)),
        };
        debug!(%kind, %identity, %address, "granting capability");
        let handle = self
            .ledger
            .mutate_add_capability(kind, &address, options)
            .await?;
        self.finish(handle).await
    }

    /// Revoke `capability` from `identity`
    pub async fn revoke(
        &self,
        capability: &str,
        identity: &IdentityId,
        options: &TransactionOptions,
    ) -> RainResult<MutationOutcome> {
        let kind = match parse_kind(capability) {
            Ok(kind) => kind,
            Err(rejection) => return Ok(MutationOutcome::Rejected(rejection)),
        };
        let address = match self.target(identity).await? {
            Ok(address) => address,
            Err(rejection) => return Ok(MutationOutcome::Rejected(rejection)),
        };
        debug!(%kind, %identity, %address, "revoking capability");
        let handle = self
            .ledger
            .mutate_remove_capability(kind, &address, options)
            .await?;
        self.finish(handle).await
    }

    /// Transfer ownership of the community to `identity`
    pub async fn transfer_ownership(
        &self,
        identity: &IdentityId,
        options: &TransactionOptions,
    ) -> RainResult<MutationOutcome> {
        let address = match self.target(identity).await? {
            Ok(address) => address,
            Err(rejection) => return Ok(MutationOutcome::Rejected(rejection)),
        };
        debug!(%identity, %address, "transferring ownership");
        let handle = self
            .ledger
            .mutate_transfer_ownership(&address, options)
            .await?;
        self.finish(handle).await
    }

    async fn target(&self, identity: &IdentityId) -> RainResult<Result<ChainAddress, Rejection>> {
        Ok(match self.resolver.resolve_address(identity).await? {
            AddressResolution::Resolved(address) => Ok(address),
            AddressResolution::Unlinked => {
                warn!(%identity, "mutation target has no linked chain address");
                Err(Rejection::UnlinkedIdentity {
                    identity: identity.clone(),
                })
            }
            AddressResolution::Malformed { raw } => {
                warn!(%identity, "\"{raw}\" is not a valid chain address");
                Err(Rejection::InvalidAddress {
                    identity: identity.clone(),
                    raw,
                })
            }
        })
    }

    async fn finish(&self, handle: TransactionHandle) -> RainResult<MutationOutcome> {
        let handle = match self.policy {
            ConfirmationPolicy::ReturnPending => handle,
            ConfirmationPolicy::AwaitConfirmation => {
                TransactionHandle::Confirmed(handle.settle().await?)
            }
        };
        Ok(MutationOutcome::Dispatched(handle))
    }
}

fn parse_kind(capability: &str) -> Result<CapabilityKind, Rejection> {
    capability.parse::<CapabilityKind>().map_err(|_| {
        warn!(capability, "\"{capability}\" is not a valid capability");
        Rejection::InvalidCapabilityKind {
            kind: capability.to_string(),
        }
    })
}
