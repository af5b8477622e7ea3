//! Shared harness for controller integration tests
//!
//! Wires a controller to fresh testkit mocks and keeps clones of each mock
//! for scripting ledger state and asserting on recorded calls.

#![allow(dead_code)]

use rain_authorization::{CommunityAccessController, ControllerHost, ControllerOptions};
use rain_core::{ChainAddress, ControllerConfig, IdentityId, LogEntry};
use rain_testkit::{
    community_interface, init_test_tracing, test_address, EntryBuilder, MemoryDescriptorStore,
    MockEntryLog, MockIdentityDirectory, MockLedger,
};
use std::sync::Arc;

/// Address of the community ledger instance used throughout
pub fn community_address() -> ChainAddress {
    test_address(0xc0)
}

pub struct Community {
    pub ledger: MockLedger,
    pub directory: MockIdentityDirectory,
    pub log: MockEntryLog,
    pub store: MemoryDescriptorStore,
}

impl Community {
    pub fn new() -> Self {
        init_test_tracing();
        Self {
            ledger: MockLedger::new(),
            directory: MockIdentityDirectory::new(),
            log: MockEntryLog::new(),
            store: MemoryDescriptorStore::new(),
        }
    }

    pub fn host(&self) -> ControllerHost {
        ControllerHost {
            descriptor_store: Arc::new(self.store.clone()),
            identity_service: Arc::new(self.directory.clone()),
            log: Arc::new(self.log.clone()),
        }
    }

    /// Options for the community ledger with `config`
    pub fn options(&self, config: ControllerConfig) -> ControllerOptions {
        ControllerOptions::new(Arc::new(self.ledger.clone()))
            .with_ledger(community_address(), community_interface())
            .with_config(config)
    }

    /// Controller bound to the community ledger with default configuration
    pub async fn controller(&self) -> CommunityAccessController {
        self.controller_with(ControllerConfig::default()).await
    }

    pub async fn controller_with(&self, config: ControllerConfig) -> CommunityAccessController {
        let mut controller =
            CommunityAccessController::create(self.host(), self.options(config)).unwrap();
        controller.load(None).await.unwrap();
        controller
    }

    /// Link `identity` to the address ending in `n` and return that address
    pub async fn member(&self, identity: &str, n: u8) -> ChainAddress {
        let address = test_address(n);
        self.directory.link(identity, address).await;
        address
    }

    /// Append an `ADD` entry by `identity` to the log
    pub async fn post(&self, identity: &str) -> LogEntry {
        self.log.append(EntryBuilder::add(identity).build()).await
    }
}

pub fn id(raw: &str) -> IdentityId {
    IdentityId::new(raw)
}
