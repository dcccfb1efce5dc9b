//! Key configuration.
//!
//! Secrets come from process configuration and are read once at startup.
//! The deployment mode is an explicit setting that decides which key
//! provider is built; it defaults to production.

use crate::error::{CryptoError, CryptoResult};
use crate::key::{DevelopmentKeyProvider, KeyProvider, ProductionKeyProvider};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Environment variable holding the active master key.
pub const ACTIVE_KEY_VAR: &str = "KARIAH_CREDENTIAL_KEY";

/// Environment variable holding the outgoing master key during rotation.
pub const LEGACY_KEY_VAR: &str = "KARIAH_CREDENTIAL_KEY_LEGACY";

/// Environment variable selecting the deployment mode.
pub const DEPLOYMENT_VAR: &str = "KARIAH_DEPLOYMENT";

/// Which key provider a deployment runs with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMode {
    #[default]
    Production,
    Development,
}

impl DeploymentMode {
    fn parse(value: &str) -> CryptoResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" => Ok(Self::Production),
            "development" => Ok(Self::Development),
            other => Err(CryptoError::Configuration(format!(
                "unknown deployment mode '{other}'"
            ))),
        }
    }
}

/// Master key configuration.
#[derive(Clone, Default, Deserialize)]
pub struct KeyConfig {
    #[serde(default)]
    pub mode: DeploymentMode,

    /// Active master key secret (at least 32 bytes).
    #[serde(default)]
    pub active_key: Option<String>,

    /// Outgoing master key secret; set only while records are being migrated.
    #[serde(default)]
    pub legacy_key: Option<String>,
}

impl std::fmt::Debug for KeyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("KeyConfig")
            .field("mode", &self.mode)
            .field("active_key", &redact(&self.active_key))
            .field("legacy_key", &redact(&self.legacy_key))
            .finish()
    }
}

impl KeyConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> CryptoResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Configuration` for an unrecognised deployment mode.
    pub fn from_lookup<F>(lookup: F) -> CryptoResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mode = match lookup(DEPLOYMENT_VAR) {
            Some(value) if !value.trim().is_empty() => DeploymentMode::parse(&value)?,
            _ => DeploymentMode::default(),
        };

        Ok(Self {
            mode,
            active_key: lookup(ACTIVE_KEY_VAR),
            legacy_key: lookup(LEGACY_KEY_VAR),
        })
    }

    /// Builds the key provider for the configured mode.
    ///
    /// # Errors
    ///
    /// In production, returns `CryptoError::Configuration` when the active key
    /// is missing or too short. Development never fails.
    pub fn build_provider(&self) -> CryptoResult<Arc<dyn KeyProvider>> {
        let active = self.active_key.as_deref();
        let legacy = self.legacy_key.as_deref();

        let provider: Arc<dyn KeyProvider> = match self.mode {
            DeploymentMode::Production => Arc::new(ProductionKeyProvider::new(active, legacy)?),
            DeploymentMode::Development => Arc::new(DevelopmentKeyProvider::new(active, legacy)),
        };

        info!(
            mode = ?self.mode,
            rotation_window = provider.has_rotation_window(),
            "credential key provider ready"
        );
        Ok(provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_to_production() {
        let config = KeyConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.mode, DeploymentMode::Production);
        assert!(config.active_key.is_none());
        assert!(config.legacy_key.is_none());
    }

    #[test]
    fn reads_all_variables() {
        let config = KeyConfig::from_lookup(lookup_from(&[
            (DEPLOYMENT_VAR, "Development"),
            (ACTIVE_KEY_VAR, "a"),
            (LEGACY_KEY_VAR, "b"),
        ]))
        .unwrap();
        assert_eq!(config.mode, DeploymentMode::Development);
        assert_eq!(config.active_key.as_deref(), Some("a"));
        assert_eq!(config.legacy_key.as_deref(), Some("b"));
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let err = KeyConfig::from_lookup(lookup_from(&[(DEPLOYMENT_VAR, "staging")])).unwrap_err();
        assert!(matches!(err, CryptoError::Configuration(_)));
    }

    #[test]
    fn production_without_key_fails_to_build() {
        let config = KeyConfig::default();
        let err = config.build_provider().err().unwrap();
        assert!(matches!(err, CryptoError::Configuration(_)));
    }

    #[test]
    fn development_without_key_builds() {
        let config = KeyConfig {
            mode: DeploymentMode::Development,
            ..KeyConfig::default()
        };
        let provider = config.build_provider().unwrap();
        assert!(provider.active_key().is_ok());
    }

    #[test]
    fn debug_output_hides_secrets() {
        let config = KeyConfig {
            mode: DeploymentMode::Production,
            active_key: Some("super-secret-active-key-material!".to_string()),
            legacy_key: None,
        };
        let printed = format!("{config:?}");
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("REDACTED"));
    }

    #[test]
    fn deserializes_from_json() {
        let config: KeyConfig = serde_json::from_str(
            r#"{"mode":"development","active_key":"AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA"}"#,
        )
        .unwrap();
        assert_eq!(config.mode, DeploymentMode::Development);
        assert!(config.legacy_key.is_none());
    }
}
