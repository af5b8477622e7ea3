//! Rain Testing Infrastructure
//!
//! Stateful mocks for every effect interface the controller consumes, plus
//! fixtures and an entry builder.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! rain-testkit = { path = "../rain-testkit" }
//! ```
//!
//! ```rust,no_run
//! use rain_testkit::*;
//!
//! # async fn example() {
//! let ledger = MockLedger::new();
//! ledger.set_owner(test_address(1)).await;
//! let entry = EntryBuilder::add("did:3:alice").build();
//! # }
//! ```

pub mod builders;
pub mod content;
pub mod fixtures;
pub mod stateful_effects;

pub use builders::EntryBuilder;
pub use content::content_ref;
pub use fixtures::{community_interface, init_test_tracing, test_address};
pub use stateful_effects::*;
