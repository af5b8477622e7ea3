//! Identity service and identity provider interfaces

use crate::entry::LogIdentity;
use crate::errors::RainError;
use crate::identifiers::IdentityId;
use crate::identity::IdentityConfig;
use async_trait::async_trait;

/// Failure of the identity configuration service or identity provider
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityServiceError {
    /// Service could not be reached or answered with an error
    #[error("identity service unavailable: {message}")]
    Unavailable {
        /// Failure description
        message: String,
    },

    /// Lookup exceeded its bound
    #[error("identity lookup for {identity} timed out after {timeout_ms}ms")]
    Timeout {
        /// Identity being looked up
        identity: IdentityId,
        /// Bound that was exceeded
        timeout_ms: u64,
    },

    /// Signature verification exceeded its bound
    #[error("signature verification for {identity} timed out after {timeout_ms}ms")]
    VerificationTimeout {
        /// Identity being verified
        identity: IdentityId,
        /// Bound that was exceeded
        timeout_ms: u64,
    },
}

impl From<IdentityServiceError> for RainError {
    fn from(err: IdentityServiceError) -> Self {
        RainError::identity_service_unavailable(err.to_string())
    }
}

/// Published linked-account configuration of identities
#[async_trait]
pub trait IdentityConfigEffects: Send + Sync {
    /// Configuration of `identity`; `None` when nothing is published
    async fn get_config(
        &self,
        identity: &IdentityId,
    ) -> Result<Option<IdentityConfig>, IdentityServiceError>;
}

/// Signature verification for log identities
#[async_trait]
pub trait IdentityProviderEffects: Send + Sync {
    /// Whether the identity's signatures bind its key to its id
    ///
    /// `Ok(false)` is an invalid signature; `Err` means no verdict was reached.
    async fn verify_identity(&self, identity: &LogIdentity) -> Result<bool, IdentityServiceError>;
}
