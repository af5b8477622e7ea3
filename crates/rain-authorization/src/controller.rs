//! Community access controller
//!
//! Host-facing surface: construction, descriptor persistence, the append
//! check and the administrative mutations. Until [`load`] binds a ledger
//! client every ledger-dependent operation fails with `NotLoaded`.
//!
//! [`load`]: CommunityAccessController::load

use crate::deadline::bounded;
use crate::decision::{AccessDecision, DecisionEngine};
use crate::dispatcher::{MutationDispatcher, MutationOutcome};
use crate::ledger_client::{required_methods, LedgerClient};
use crate::resolver::IdentityResolver;
use async_trait::async_trait;
use rain_core::descriptor::MethodKind;
use rain_core::effects::{
    DescriptorStoreEffects, EntryLogEffects, IdentityConfigEffects, IdentityProviderEffects,
    LedgerEffects, StoreError,
};
use rain_core::serialization::{decode, encode};
use rain_core::{
    CapabilityTier, ChainAddress, ControllerConfig, ControllerDescriptor, DescriptorRef,
    IdentityId, LedgerInterface, LogEntry, RainError, RainResult, StoredDescriptor,
    TransactionOptions,
};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Type tag under which hosts register this controller
pub const CONTROLLER_TYPE: &str = "eth-contract/rain-community";

/// Services supplied by the host log
#[derive(Clone)]
pub struct ControllerHost {
    /// Content-addressed store for the descriptor
    pub descriptor_store: Arc<dyn DescriptorStoreEffects>,
    /// Identity configuration service
    pub identity_service: Arc<dyn IdentityConfigEffects>,
    /// The log being guarded, for `DEL` target lookups
    pub log: Arc<dyn EntryLogEffects>,
}

impl fmt::Debug for ControllerHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerHost").finish_non_exhaustive()
    }
}

/// Construction options
#[derive(Clone, Default)]
pub struct ControllerOptions {
    /// Ledger binding; required
    pub ledger_client: Option<Arc<dyn LedgerEffects>>,
    /// Interface of the ledger instance
    pub ledger_interface: Option<LedgerInterface>,
    /// Address of the ledger instance
    pub ledger_address: Option<ChainAddress>,
    /// Key identifier persisted alongside the descriptor
    pub encryption_key_id: Option<String>,
    /// Runtime configuration
    pub config: ControllerConfig,
}

impl ControllerOptions {
    /// Options binding through `ledger_client`
    pub fn new(ledger_client: Arc<dyn LedgerEffects>) -> Self {
        Self {
            ledger_client: Some(ledger_client),
            ..Self::default()
        }
    }

    /// Target ledger instance
    pub fn with_ledger(mut self, address: ChainAddress, interface: LedgerInterface) -> Self {
        self.ledger_address = Some(address);
        self.ledger_interface = Some(interface);
        self
    }

    /// Ledger interface only; the address comes from a loaded descriptor
    pub fn with_interface(mut self, interface: LedgerInterface) -> Self {
        self.ledger_interface = Some(interface);
        self
    }

    /// Persisted encryption key identifier
    pub fn with_encryption_key_id(mut self, key_id: impl Into<String>) -> Self {
        self.encryption_key_id = Some(key_id.into());
        self
    }

    /// Runtime configuration
    pub fn with_config(mut self, config: ControllerConfig) -> Self {
        self.config = config;
        self
    }
}

impl fmt::Debug for ControllerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerOptions")
            .field("has_ledger_client", &self.ledger_client.is_some())
            .field("ledger_address", &self.ledger_address)
            .field("encryption_key_id", &self.encryption_key_id)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
struct Bound {
    descriptor: ControllerDescriptor,
    engine: DecisionEngine,
    dispatcher: MutationDispatcher,
}

/// Access controller backed by a community ledger
pub struct CommunityAccessController {
    host: ControllerHost,
    binding: Arc<dyn LedgerEffects>,
    ledger_address: Option<ChainAddress>,
    ledger_interface: Option<LedgerInterface>,
    encryption_key_id: Option<String>,
    config: ControllerConfig,
    bound: Option<Bound>,
}

impl CommunityAccessController {
    /// Build a controller from host services and options
    ///
    /// Fails with `MissingConfiguration` when there is no ledger binding, or
    /// when neither an interface nor an address was supplied.
    pub fn create(host: ControllerHost, options: ControllerOptions) -> RainResult<Self> {
        let binding = options
            .ledger_client
            .ok_or_else(|| RainError::missing_configuration("ledger_client"))?;
        if options.ledger_interface.is_none() && options.ledger_address.is_none() {
            return Err(RainError::missing_configuration(
                "ledger_interface or ledger_address",
            ));
        }
        options.config.validate()?;

        Ok(Self {
            host,
            binding,
            ledger_address: options.ledger_address,
            ledger_interface: options.ledger_interface,
            encryption_key_id: options.encryption_key_id,
            config: options.config,
            bound: None,
        })
    }

    /// Type tag of this controller
    pub fn controller_type(&self) -> &'static str {
        CONTROLLER_TYPE
    }

    /// Address of the ledger instance, once known
    pub fn address(&self) -> Option<ChainAddress> {
        self.ledger_address
    }

    /// Interface of the ledger instance, once known
    pub fn interface(&self) -> Option<&LedgerInterface> {
        self.ledger_interface.as_ref()
    }

    /// Bound descriptor, once loaded
    pub fn descriptor(&self) -> Option<&ControllerDescriptor> {
        self.bound.as_ref().map(|b| &b.descriptor)
    }

    /// Whether a ledger client is bound
    pub fn is_loaded(&self) -> bool {
        self.bound.is_some()
    }

    /// Runtime configuration
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Bind a ledger client
    ///
    /// With `reference`, the descriptor is read from the store and replaces
    /// any address and interface supplied at construction. Without it, the
    /// construction values are bound as they are.
    pub async fn load(&mut self, reference: Option<&DescriptorRef>) -> RainResult<()> {
        let descriptor = match reference {
            Some(reference) => self.fetch_descriptor(reference).await?,
            None => ControllerDescriptor {
                ledger_address: self
                    .ledger_address
                    .ok_or_else(|| RainError::missing_configuration("ledger_address"))?,
                ledger_interface: self
                    .ledger_interface
                    .clone()
                    .ok_or_else(|| RainError::missing_configuration("ledger_interface"))?,
                encryption_key_id: self.encryption_key_id.clone(),
            },
        };
        check_interface(&descriptor.ledger_interface)?;

        let timeout = self.config.call_timeout();
        let resolver = IdentityResolver::new(Arc::clone(&self.host.identity_service), timeout);
        let ledger = LedgerClient::bind(&descriptor, Arc::clone(&self.binding), timeout);
        let engine = DecisionEngine::new(
            resolver.clone(),
            ledger.clone(),
            Arc::clone(&self.host.log),
            timeout,
        );
        let dispatcher =
            MutationDispatcher::new(resolver, ledger, self.config.confirmation_policy);

        info!(
            ledger = %descriptor.ledger_address,
            reference = reference.map(|r| r.as_str()),
            can_sign = self.binding.can_sign(),
            "access controller loaded"
        );
        self.ledger_address = Some(descriptor.ledger_address);
        self.ledger_interface = Some(descriptor.ledger_interface.clone());
        self.encryption_key_id = descriptor.encryption_key_id.clone();
        self.bound = Some(Bound {
            descriptor,
            engine,
            dispatcher,
        });
        Ok(())
    }

    async fn fetch_descriptor(&self, reference: &DescriptorRef) -> RainResult<ControllerDescriptor> {
        let blob = bounded(
            self.config.call_timeout(),
            self.host.descriptor_store.read(reference),
            |timeout_ms| StoreError::Unavailable {
                message: format!("reading {reference} timed out after {timeout_ms}ms"),
            },
        )
        .await?;
        let stored: StoredDescriptor = decode(blob.codec, &blob.bytes)
            .map_err(|e| RainError::descriptor_corrupt(format!("{reference}: {e}")))?;
        ControllerDescriptor::from_stored(stored)
    }

    /// Persist the descriptor and return its reference
    ///
    /// Saves the bound descriptor if loaded, otherwise the construction
    /// values, which must then include both address and interface.
    pub async fn save(&self) -> RainResult<DescriptorRef> {
        let stored = match &self.bound {
            Some(bound) => bound.descriptor.to_stored(),
            None => StoredDescriptor {
                contract_address: self
                    .ledger_address
                    .ok_or_else(|| RainError::missing_configuration("ledger_address"))?
                    .to_string(),
                abi: self
                    .ledger_interface
                    .as_ref()
                    .ok_or_else(|| RainError::missing_configuration("ledger_interface"))?
                    .to_json_string(),
                encryption_key_id: self.encryption_key_id.clone(),
            },
        };
        let codec = self.config.descriptor_codec;
        let bytes = encode(codec, &stored)?;
        let reference = bounded(
            self.config.call_timeout(),
            self.host.descriptor_store.write(codec, bytes),
            |timeout_ms| StoreError::Unavailable {
                message: format!("writing descriptor timed out after {timeout_ms}ms"),
            },
        )
        .await?;
        info!(%reference, %codec, ledger = %stored.contract_address, "access controller saved");
        Ok(reference)
    }

    fn bound(&self, operation: &str) -> RainResult<&Bound> {
        self.bound
            .as_ref()
            .ok_or_else(|| RainError::not_loaded(operation))
    }

    /// Whether `entry` may be appended
    pub async fn can_append(
        &self,
        entry: &LogEntry,
        identity_provider: &dyn IdentityProviderEffects,
    ) -> RainResult<bool> {
        Ok(self.authorize(entry, identity_provider).await?.is_allowed())
    }

    /// Verdict for `entry`, with the denial reason
    pub async fn authorize(
        &self,
        entry: &LogEntry,
        identity_provider: &dyn IdentityProviderEffects,
    ) -> RainResult<AccessDecision> {
        self.bound("can_append")?
            .engine
            .can_append(entry, identity_provider)
            .await
    }

    /// Highest tier the ledger records for `identity`
    ///
    /// Identities without a valid linked address rank `None`.
    pub async fn capability_of(&self, identity: &IdentityId) -> RainResult<CapabilityTier> {
        let engine = &self.bound("capability_of")?.engine;
        match engine.resolver().resolve_address(identity).await?.address() {
            Some(address) => engine.greatest_capability(&address).await,
            None => Ok(CapabilityTier::None),
        }
    }

    /// Grant `capability` to `identity`
    pub async fn grant(
        &self,
        capability: &str,
        identity: &IdentityId,
        options: &TransactionOptions,
    ) -> RainResult<MutationOutcome> {
        self.bound("grant")?
            .dispatcher
            .grant(capability, identity, options)
            .await
    }

    /// Revoke `capability` from `identity`
    pub async fn revoke(
        &self,
        capability: &str,
        identity: &IdentityId,
        options: &TransactionOptions,
    ) -> RainResult<MutationOutcome> {
        self.bound("revoke")?
            .dispatcher
            .revoke(capability, identity, options)
            .await
    }

    /// Transfer ownership of the community to `identity`
    pub async fn transfer_ownership(
        &self,
        identity: &IdentityId,
        options: &TransactionOptions,
    ) -> RainResult<MutationOutcome> {
        self.bound("transfer_ownership")?
            .dispatcher
            .transfer_ownership(identity, options)
            .await
    }
}

impl fmt::Debug for CommunityAccessController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommunityAccessController")
            .field("ledger_address", &self.ledger_address)
            .field("loaded", &self.bound.is_some())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Read methods must be declared exactly; missing write methods only limit
/// what can be mutated, so they are reported and tolerated.
fn check_interface(interface: &LedgerInterface) -> RainResult<()> {
    for (method, kind) in required_methods() {
        match (interface.method(method), kind) {
            (Some(declared), _) if declared == kind => {}
            (_, MethodKind::Read) => return Err(RainError::interface_mismatch(method)),
            (_, MethodKind::Write) => {
                warn!(method, "ledger interface lacks mutation; it will be refused");
            }
        }
    }
    Ok(())
}

/// Access control surface a host log drives
#[async_trait]
pub trait AccessController: Send + Sync {
    /// Type tag used for registration
    fn controller_type(&self) -> &'static str;

    /// Address of the governing ledger instance, once known
    fn address(&self) -> Option<ChainAddress>;

    /// Bind to the descriptor at `reference`, or to the construction values
    async fn load(&mut self, reference: Option<&DescriptorRef>) -> RainResult<()>;

    /// Persist the descriptor
    async fn save(&self) -> RainResult<DescriptorRef>;

    /// Whether `entry` may be appended
    async fn can_append(
        &self,
        entry: &LogEntry,
        identity_provider: &dyn IdentityProviderEffects,
    ) -> RainResult<bool>;

    /// Grant `capability` to `identity`
    async fn grant(
        &self,
        capability: &str,
        identity: &IdentityId,
        options: &TransactionOptions,
    ) -> RainResult<MutationOutcome>;

    /// Revoke `capability` from `identity`
    async fn revoke(
        &self,
        capability: &str,
        identity: &IdentityId,
        options: &TransactionOptions,
    ) -> RainResult<MutationOutcome>;

    /// Transfer ownership to `identity`
    async fn transfer_ownership(
        &self,
        identity: &IdentityId,
        options: &TransactionOptions,
    ) -> RainResult<MutationOutcome>;
}

#[async_trait]
impl AccessController for CommunityAccessController {
    fn controller_type(&self) -> &'static str {
        CONTROLLER_TYPE
    }

    fn address(&self) -> Option<ChainAddress> {
        self.ledger_address
    }

    async fn load(&mut self, reference: Option<&DescriptorRef>) -> RainResult<()> {
        CommunityAccessController::load(self, reference).await
    }

    async fn save(&self) -> RainResult<DescriptorRef> {
        CommunityAccessController::save(self).await
    }

    async fn can_append(
        &self,
        entry: &LogEntry,
        identity_provider: &dyn IdentityProviderEffects,
    ) -> RainResult<bool> {
        CommunityAccessController::can_append(self, entry, identity_provider).await
    }

    async fn grant(
        &self,
        capability: &str,
        identity: &IdentityId,
        options: &TransactionOptions,
    ) -> RainResult<MutationOutcome> {
        CommunityAccessController::grant(self, capability, identity, options).await
    }

    async fn revoke(
        &self,
        capability: &str,
        identity: &IdentityId,
        options: &TransactionOptions,
    ) -> RainResult<MutationOutcome> {
        CommunityAccessController::revoke(self, capability, identity, options).await
    }

    async fn transfer_ownership(
        &self,
        identity: &IdentityId,
        options: &TransactionOptions,
    ) -> RainResult<MutationOutcome> {
        CommunityAccessController::transfer_ownership(self, identity, options).await
    }
}
