//! Identity service and identity provider mocks

use async_lock::RwLock;
use async_trait::async_trait;
use rain_core::effects::{IdentityConfigEffects, IdentityProviderEffects, IdentityServiceError};
use rain_core::{ChainAddress, IdentityConfig, IdentityId, IdentityLink, LogIdentity};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

#[derive(Debug, Default)]
struct DirectoryState {
    configs: HashMap<IdentityId, IdentityConfig>,
    failure: Option<String>,
    stalled: bool,
    lookups: usize,
}

/// In-memory identity configuration service
#[derive(Debug, Clone, Default)]
pub struct MockIdentityDirectory {
    state: Arc<RwLock<DirectoryState>>,
}

impl MockIdentityDirectory {
    /// Directory with no published configurations
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `config` for `identity`, replacing any previous one
    pub async fn publish(&self, identity: &IdentityId, config: IdentityConfig) {
        self.state
            .write()
            .await
            .configs
            .insert(identity.clone(), config);
    }

    /// Publish a single `ethereum-eoa` link from `identity` to `address`
    pub async fn link(&self, identity: impl Into<IdentityId>, address: ChainAddress) {
        let config = IdentityConfig {
            links: vec![IdentityLink::ethereum_eoa(address.to_string())],
        };
        self.publish(&identity.into(), config).await;
    }

    /// Fail every lookup with `message`
    pub async fn fail_with(&self, message: &str) {
        self.state.write().await.failure = Some(message.to_string());
    }

    /// Leave every lookup pending forever
    pub async fn stall(&self) {
        self.state.write().await.stalled = true;
    }

    /// Number of lookups received
    pub async fn lookups(&self) -> usize {
        self.state.read().await.lookups
    }
}

#[async_trait]
impl IdentityConfigEffects for MockIdentityDirectory {
    async fn get_config(
        &self,
        identity: &IdentityId,
    ) -> Result<Option<IdentityConfig>, IdentityServiceError> {
        let stalled = {
            let mut state = self.state.write().await;
            state.lookups += 1;
            state.stalled
        };
        if stalled {
            futures::future::pending::<()>().await;
        }
        let state = self.state.read().await;
        if let Some(message) = &state.failure {
            return Err(IdentityServiceError::Unavailable {
                message: message.clone(),
            });
        }
        Ok(state.configs.get(identity).cloned())
    }
}

#[derive(Debug, Default)]
struct ProviderState {
    rejected: HashSet<IdentityId>,
    stalled: bool,
    verifications: usize,
}

/// Identity provider with scripted signature verdicts
#[derive(Debug, Clone)]
pub struct MockIdentityProvider {
    accept_by_default: bool,
    state: Arc<RwLock<ProviderState>>,
}

impl MockIdentityProvider {
    /// Provider that accepts every signature
    pub fn accepting() -> Self {
        Self {
            accept_by_default: true,
            state: Arc::new(RwLock::new(ProviderState::default())),
        }
    }

    /// Provider that rejects every signature
    pub fn rejecting() -> Self {
        Self {
            accept_by_default: false,
            ..Self::accepting()
        }
    }

    /// Provider whose verdict is `valid` for everyone
    pub fn with_verdict(valid: bool) -> Self {
        if valid {
            Self::accepting()
        } else {
            Self::rejecting()
        }
    }

    /// Reject signatures of `identity` regardless of the default
    pub async fn reject(&self, identity: impl Into<IdentityId>) {
        self.state.write().await.rejected.insert(identity.into());
    }

    /// Leave every verification pending forever
    pub async fn stall(&self) {
        self.state.write().await.stalled = true;
    }

    /// Number of verifications performed
    pub async fn verifications(&self) -> usize {
        self.state.read().await.verifications
    }
}

#[async_trait]
impl IdentityProviderEffects for MockIdentityProvider {
    async fn verify_identity(
        &self,
        identity: &LogIdentity,
    ) -> Result<bool, IdentityServiceError> {
        let (stalled, rejected) = {
            let mut state = self.state.write().await;
            state.verifications += 1;
            (state.stalled, state.rejected.contains(&identity.id))
        };
        if stalled {
            futures::future::pending::<()>().await;
        }
        Ok(self.accept_by_default && !rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test_address;

    #[tokio::test]
    async fn test_link_publishes_eoa() {
        let directory = MockIdentityDirectory::new();
        directory.link("did:3:alice", test_address(7)).await;

        let config = directory
            .get_config(&IdentityId::new("did:3:alice"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            config.primary_eoa(),
            Some(test_address(7).to_string().as_str())
        );
        assert_eq!(directory.lookups().await, 1);
    }

    #[tokio::test]
    async fn test_rejection_is_per_identity() {
        let provider = MockIdentityProvider::accepting();
        provider.reject("did:3:mallory").await;

        let mallory = crate::EntryBuilder::add("did:3:mallory").build().identity;
        let alice = crate::EntryBuilder::add("did:3:alice").build().identity;
        assert_eq!(provider.verify_identity(&mallory).await, Ok(false));
        assert_eq!(provider.verify_identity(&alice).await, Ok(true));
        assert_eq!(provider.verifications().await, 2);
    }
}
