//! Identity to chain address resolution
//!
//! The ledger knows addresses, the log knows identities. An identity is
//! backed by the first `ethereum-eoa` link in its published configuration.

use crate::deadline::bounded;
use rain_core::effects::{IdentityConfigEffects, IdentityServiceError};
use rain_core::{ChainAddress, IdentityId, RainError, RainResult};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Outcome of resolving an identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressResolution {
    /// Primary link parsed as a chain address
    Resolved(ChainAddress),
    /// No configuration, or no `ethereum-eoa` link in it
    Unlinked,
    /// A link exists but its address is not a valid chain address
    Malformed {
        /// The address exactly as published
        raw: String,
    },
}

impl AddressResolution {
    /// Resolved address, if any
    pub fn address(&self) -> Option<ChainAddress> {
        match self {
            Self::Resolved(address) => Some(*address),
            Self::Unlinked | Self::Malformed { .. } => None,
        }
    }

    /// Resolved address, or [`RainError::InvalidAddress`] naming `identity`
    pub fn require(self, identity: &IdentityId) -> RainResult<ChainAddress> {
        match self {
            Self::Resolved(address) => Ok(address),
            Self::Unlinked => Err(RainError::invalid_address(format!(
                "{identity} has no linked chain address"
            ))),
            Self::Malformed { raw } => Err(RainError::invalid_address(format!(
                "\"{raw}\" linked from {identity} is not a valid chain address"
            ))),
        }
    }
}

/// Resolves identities through the identity configuration service
#[derive(Clone)]
pub struct IdentityResolver {
    service: Arc<dyn IdentityConfigEffects>,
    call_timeout: Duration,
}

impl IdentityResolver {
    /// Resolver over `service`, bounding each lookup by `call_timeout`
    pub fn new(service: Arc<dyn IdentityConfigEffects>, call_timeout: Duration) -> Self {
        Self {
            service,
            call_timeout,
        }
    }

    /// Resolve `identity` to the address the ledger indexes it by
    ///
    /// A missing link is an outcome, not an error; only service failures are.
    pub async fn resolve_address(&self, identity: &IdentityId) -> RainResult<AddressResolution> {
        let config = bounded(
            self.call_timeout,
            self.service.get_config(identity),
            |timeout_ms| IdentityServiceError::Timeout {
                identity: identity.clone(),
                timeout_ms,
            },
        )
        .await?;

        let Some(raw) = config.as_ref().and_then(|c| c.primary_eoa()) else {
            debug!(%identity, "identity has no linked chain address");
            return Ok(AddressResolution::Unlinked);
        };

        Ok(match ChainAddress::parse(raw) {
            Ok(address) => AddressResolution::Resolved(address),
            Err(_) => AddressResolution::Malformed {
                raw: raw.to_string(),
            },
        })
    }
}

impl std::fmt::Debug for IdentityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityResolver")
            .field("call_timeout", &self.call_timeout)
            .finish_non_exhaustive()
    }
}
