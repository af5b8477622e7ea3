//! Rain Core - types and effect interfaces for ledger-backed log access control
//!
//! A shared log accepts or rejects entries based on roles recorded in an
//! external ledger. This crate holds everything that decision needs to talk
//! about, and nothing that performs it:
//!
//! - identifiers: [`IdentityId`] (log authors) and [`ChainAddress`] (ledger keys)
//! - [`CapabilityTier`] ordering and grantable [`CapabilityKind`]s
//! - the read-only [`LogEntry`] model handed over by the host log
//! - the persisted [`ControllerDescriptor`] and its [`LedgerInterface`]
//! - effect traits for the ledger, identity service, identity provider,
//!   host log and descriptor store
//! - the unified [`RainError`] and [`ControllerConfig`]

#![forbid(unsafe_code)]

/// Capability tiers and kinds
pub mod capability;

/// Controller configuration
pub mod config;

/// Controller descriptor and ledger interface
pub mod descriptor;

/// Pure effect interfaces (no implementations)
pub mod effects;

/// Log entry model
pub mod entry;

/// Unified error handling
pub mod errors;

/// Identity and address identifiers
pub mod identifiers;

/// Identity configuration
pub mod identity;

/// Blob codecs
pub mod serialization;

/// Transaction options and receipts
pub mod transaction;

pub use capability::{CapabilityKind, CapabilityTier};
pub use config::{ConfirmationPolicy, ControllerConfig};
pub use descriptor::{ControllerDescriptor, LedgerInterface, MethodKind, StoredDescriptor};
pub use effects::{
    DescriptorStoreEffects, EntryLogEffects, IdentityConfigEffects, IdentityProviderEffects,
    IdentityServiceError, LedgerEffects, LedgerError, LogError, StoreError, StoredBlob,
};
pub use entry::{EntryPayload, IdentitySignatures, LogEntry, LogIdentity, Operation};
pub use errors::{RainError, Result as RainResult};
pub use identifiers::{ChainAddress, DescriptorRef, EntryHash, IdentityId, TxHash};
pub use identity::{IdentityConfig, IdentityLink, ETHEREUM_EOA_LINK};
pub use serialization::{BlobCodec, SerializationError};
pub use transaction::{TransactionOptions, TransactionReceipt};
