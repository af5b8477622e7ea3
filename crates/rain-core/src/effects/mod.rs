//! Effect interfaces for the controller's external collaborators
//!
//! Pure trait definitions: this module defines **what** the controller needs
//! from the outside world; handlers (production bindings, or the stateful
//! mocks in `rain-testkit`) define **how**.
//!
//! Every method that crosses a process boundary is async and fallible with a
//! collaborator-specific error. Each error converts into the matching
//! `*Unavailable` variant of [`crate::RainError`], never into a denial.

pub mod identity;
pub mod ledger;
pub mod log;
pub mod store;

pub use identity::{IdentityConfigEffects, IdentityProviderEffects, IdentityServiceError};
pub use ledger::{LedgerEffects, LedgerError};
pub use log::{EntryLogEffects, LogError};
pub use store::{DescriptorStoreEffects, StoreError, StoredBlob};
