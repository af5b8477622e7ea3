//! Stateful mock effect handlers
//!
//! Each handler keeps its state behind `Arc<RwLock<_>>`, so clones share
//! state: a test keeps one clone for scripting and assertions and hands
//! another to the code under test.

pub mod identity;
pub mod ledger;
pub mod log;
pub mod store;

pub use identity::{MockIdentityDirectory, MockIdentityProvider};
pub use ledger::{MockLedger, SubmittedTransaction, ViewCall};
pub use log::MockEntryLog;
pub use store::MemoryDescriptorStore;
