//! Rain Authorization - ledger-backed access control for shared logs
//!
//! Decides whether a log entry may be appended by consulting capability
//! tiers recorded in a community ledger, and dispatches administrative
//! mutations (grant, revoke, ownership transfer) to that ledger.
//!
//! # Layout
//!
//! - [`resolver`]: identity to chain address
//! - [`ledger_client`]: the only surface that talks to the ledger
//! - [`decision`]: `ADD`/`DEL` authorization rules
//! - [`dispatcher`]: validated administrative mutations
//! - [`controller`]: host-facing controller, factory and persistence
//!
//! A denial is an [`AccessDecision`]; an undecidable check (ledger, log or
//! identity service unreachable) is a [`RainError`](rain_core::RainError).
//!
//! Remote calls are bounded with Tokio timers, so the async operations must
//! run inside a Tokio runtime with the time driver enabled.

#![forbid(unsafe_code)]

pub mod controller;
pub mod decision;
pub mod dispatcher;
pub mod ledger_client;
pub mod resolver;

mod deadline;

pub use controller::{
    AccessController, CommunityAccessController, ControllerHost, ControllerOptions,
    CONTROLLER_TYPE,
};
pub use decision::{AccessDecision, DecisionEngine, DenialReason};
pub use dispatcher::{MutationDispatcher, MutationOutcome, Rejection};
pub use ledger_client::{LedgerClient, PendingTransaction, TransactionHandle};
pub use resolver::{AddressResolution, IdentityResolver};
