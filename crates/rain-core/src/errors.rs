//! Unified error system for Rain
//!
//! One error type for every controller operation. Remote-call failures keep
//! their own variants so callers can tell "denied" apart from "undecidable";
//! a denial is never an error.

use serde::{Deserialize, Serialize};

/// Unified error type for all Rain operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum RainError {
    /// Malformed or unresolvable chain address
    #[error("Invalid address: {message}")]
    InvalidAddress {
        /// What was wrong with the address
        message: String,
    },

    /// Unknown grant/revoke capability kind
    #[error("Invalid capability kind: {kind}")]
    InvalidCapabilityKind {
        /// The kind as supplied by the caller
        kind: String,
    },

    /// Ledger query or mutation could not be completed
    #[error("Ledger unavailable: {message}")]
    LedgerUnavailable {
        /// Transport or RPC failure description
        message: String,
    },

    /// Log entry could not be fetched
    #[error("Log unavailable: {message}")]
    LogUnavailable {
        /// Failure description
        message: String,
    },

    /// Identity configuration service could not be reached
    #[error("Identity service unavailable: {message}")]
    IdentityServiceUnavailable {
        /// Failure description
        message: String,
    },

    /// Descriptor store read or write failed
    #[error("Descriptor store unavailable: {message}")]
    DescriptorStoreUnavailable {
        /// Failure description
        message: String,
    },

    /// No descriptor is stored under the reference
    #[error("Descriptor not found: {reference}")]
    DescriptorNotFound {
        /// Reference that was read
        reference: String,
    },

    /// Persisted controller descriptor could not be decoded
    #[error("Descriptor corrupt: {message}")]
    DescriptorCorrupt {
        /// Decode failure description
        message: String,
    },

    /// A required construction option is absent
    #[error("Missing configuration: {field}")]
    MissingConfiguration {
        /// Name of the missing option
        field: String,
    },

    /// A configuration value is present but unusable
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration {
        /// Validation failure description
        message: String,
    },

    /// The bound ledger interface does not declare a method the adapter needs
    #[error("Ledger interface does not declare `{method}`")]
    InterfaceMismatch {
        /// Missing method name
        method: String,
    },

    /// The ledger binding cannot sign transactions
    #[error("Ledger binding is read-only; cannot submit `{method}`")]
    ReadOnlyBinding {
        /// Mutation that was attempted
        method: String,
    },

    /// Controller used before `load()` completed
    #[error("Controller not loaded: {operation} requires a bound ledger client")]
    NotLoaded {
        /// Operation that was attempted
        operation: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message describing the serialization failure
        message: String,
    },
}

impl RainError {
    /// Create an invalid address error
    pub fn invalid_address(message: impl Into<String>) -> Self {
        Self::InvalidAddress {
            message: message.into(),
        }
    }

    /// Create an invalid capability kind error
    pub fn invalid_capability_kind(kind: impl Into<String>) -> Self {
        Self::InvalidCapabilityKind { kind: kind.into() }
    }

    /// Create a ledger unavailable error
    pub fn ledger_unavailable(message: impl Into<String>) -> Self {
        Self::LedgerUnavailable {
            message: message.into(),
        }
    }

    /// Create a log unavailable error
    pub fn log_unavailable(message: impl Into<String>) -> Self {
        Self::LogUnavailable {
            message: message.into(),
        }
    }

    /// Create an identity service unavailable error
    pub fn identity_service_unavailable(message: impl Into<String>) -> Self {
        Self::IdentityServiceUnavailable {
            message: message.into(),
        }
    }

    /// Create a descriptor store unavailable error
    pub fn descriptor_store_unavailable(message: impl Into<String>) -> Self {
        Self::DescriptorStoreUnavailable {
            message: message.into(),
        }
    }

    /// Create a descriptor corrupt error
    pub fn descriptor_corrupt(message: impl Into<String>) -> Self {
        Self::DescriptorCorrupt {
            message: message.into(),
        }
    }

    /// Create a missing configuration error
    pub fn missing_configuration(field: impl Into<String>) -> Self {
        Self::MissingConfiguration {
            field: field.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Create an interface mismatch error
    pub fn interface_mismatch(method: impl Into<String>) -> Self {
        Self::InterfaceMismatch {
            method: method.into(),
        }
    }

    /// Create a read-only binding error
    pub fn read_only_binding(method: impl Into<String>) -> Self {
        Self::ReadOnlyBinding {
            method: method.into(),
        }
    }

    /// Create a not-loaded error
    pub fn not_loaded(operation: impl Into<String>) -> Self {
        Self::NotLoaded {
            operation: operation.into(),
        }
    }

    /// Create a descriptor not found error
    pub fn descriptor_not_found(reference: impl Into<String>) -> Self {
        Self::DescriptorNotFound {
            reference: reference.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// True for failures of a remote collaborator, where the caller may retry.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::LedgerUnavailable { .. }
                | Self::LogUnavailable { .. }
                | Self::IdentityServiceUnavailable { .. }
                | Self::DescriptorStoreUnavailable { .. }
        )
    }
}

/// Standard Result type for Rain operations
pub type Result<T> = std::result::Result<T, RainError>;

impl From<serde_json::Error> for RainError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}
