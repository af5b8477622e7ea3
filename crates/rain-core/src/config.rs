//! Controller configuration
//!
//! Passed explicitly to the controller factory. Sources, lowest precedence
//! first: defaults, a TOML document, `RAIN_*` environment variables.

use crate::errors::RainError;
use crate::serialization::BlobCodec;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Environment variable overriding [`ControllerConfig::call_timeout_ms`]
pub const ENV_CALL_TIMEOUT_MS: &str = "RAIN_CALL_TIMEOUT_MS";
/// Environment variable overriding [`ControllerConfig::confirmation_policy`]
pub const ENV_CONFIRMATION_POLICY: &str = "RAIN_CONFIRMATION_POLICY";
/// Environment variable overriding [`ControllerConfig::descriptor_codec`]
pub const ENV_DESCRIPTOR_CODEC: &str = "RAIN_DESCRIPTOR_CODEC";

/// Default bound on a single remote call
pub const DEFAULT_CALL_TIMEOUT_MS: u64 = 10_000;

/// How mutations hand back their transaction
///
/// Applies uniformly to grant, revoke and ownership transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfirmationPolicy {
    /// Return the pending handle; callers settle it
    #[default]
    ReturnPending,
    /// Settle the transaction before returning
    AwaitConfirmation,
}

impl FromStr for ConfirmationPolicy {
    type Err = RainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "return-pending" => Ok(Self::ReturnPending),
            "await-confirmation" => Ok(Self::AwaitConfirmation),
            other => Err(RainError::invalid_configuration(format!(
                "unknown confirmation policy \"{other}\""
            ))),
        }
    }
}

/// Runtime configuration of a controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Bound on every remote call, in milliseconds
    pub call_timeout_ms: u64,
    /// Mutation confirmation policy
    pub confirmation_policy: ConfirmationPolicy,
    /// Codec used when saving the descriptor
    pub descriptor_codec: BlobCodec,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            call_timeout_ms: DEFAULT_CALL_TIMEOUT_MS,
            confirmation_policy: ConfirmationPolicy::default(),
            descriptor_codec: BlobCodec::default(),
        }
    }
}

impl ControllerConfig {
    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(document: &str) -> Result<Self, RainError> {
        let config: Self = toml::from_str(document)
            .map_err(|e| RainError::invalid_configuration(format!("invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `RAIN_*` overrides from the process environment
    pub fn merge_with_env(&mut self) -> Result<(), RainError> {
        self.merge_with_lookup(|key| std::env::var(key).ok())
    }

    /// Apply `RAIN_*` overrides from an arbitrary lookup
    pub fn merge_with_lookup<F>(&mut self, lookup: F) -> Result<(), RainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_CALL_TIMEOUT_MS) {
            self.call_timeout_ms = raw.trim().parse().map_err(|e| {
                RainError::invalid_configuration(format!("{ENV_CALL_TIMEOUT_MS}: {e}"))
            })?;
        }
        if let Some(raw) = lookup(ENV_CONFIRMATION_POLICY) {
            self.confirmation_policy = raw.trim().parse()?;
        }
        if let Some(raw) = lookup(ENV_DESCRIPTOR_CODEC) {
            self.descriptor_codec = raw.trim().parse().map_err(|e| {
                RainError::invalid_configuration(format!("{ENV_DESCRIPTOR_CODEC}: {e}"))
            })?;
        }
        self.validate()
    }

    /// Reject values the controller cannot run with
    pub fn validate(&self) -> Result<(), RainError> {
        if self.call_timeout_ms == 0 {
            return Err(RainError::invalid_configuration(
                "call_timeout_ms must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Remote-call bound as a [`Duration`]
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_toml_overrides_defaults() {
        let config = ControllerConfig::from_toml_str(
            r#"
            call_timeout_ms = 2500
            confirmation_policy = "await-confirmation"
            "#,
        )
        .unwrap();
        assert_eq!(config.call_timeout(), Duration::from_millis(2500));
        assert_eq!(config.confirmation_policy, ConfirmationPolicy::AwaitConfirmation);
        assert_eq!(config.descriptor_codec, BlobCodec::DagCbor);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = ControllerConfig::from_toml_str("call_timeout_ms = 0").unwrap_err();
        assert!(matches!(err, RainError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_env_lookup_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_CALL_TIMEOUT_MS, "750"),
            (ENV_DESCRIPTOR_CODEC, "dag-json"),
        ]
        .into_iter()
        .collect();

        let mut config = ControllerConfig::default();
        config
            .merge_with_lookup(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.call_timeout_ms, 750);
        assert_eq!(config.descriptor_codec, BlobCodec::DagJson);
        assert_eq!(config.confirmation_policy, ConfirmationPolicy::ReturnPending);
    }

    #[test]
    fn test_env_lookup_rejects_garbage() {
        let mut config = ControllerConfig::default();
        let err = config
            .merge_with_lookup(|key| (key == ENV_CONFIRMATION_POLICY).then(|| "eventually".into()))
            .unwrap_err();
        assert!(matches!(err, RainError::InvalidConfiguration { .. }));
    }
}
