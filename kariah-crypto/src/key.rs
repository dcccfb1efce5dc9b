//! Master keys and key providers.
//!
//! At most two master keys are live at once: the *active* key, used for every
//! new encryption, and an optional *legacy* key that is only accepted for
//! decryption while a rotation window is open.
//!
//! - [`ProductionKeyProvider`]: fails fast when the active key is absent or weak
//! - [`DevelopmentKeyProvider`]: falls back to a fixed insecure key, loudly
//! - [`StaticKeyProvider`]: explicit keys, for embedding and tests

use crate::error::{CryptoError, CryptoResult};
use std::sync::Arc;
use tracing::{debug, warn};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Usable length of a master key. Longer secrets are truncated to this.
pub const MASTER_KEY_LEN: usize = 32;

/// Fallback for development deployments only. Never reachable in production.
const INSECURE_DEVELOPMENT_KEY: &[u8; MASTER_KEY_LEN] = b"kariah-insecure-development-key!";

/// A 32-byte master key, zeroized on drop.
///
/// No `Clone` and a redacting `Debug`: share it through `Arc` instead.
pub struct MasterKey {
    bytes: KeyBytes,
}

#[derive(Zeroize, ZeroizeOnDrop)]
struct KeyBytes([u8; MASTER_KEY_LEN]);

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

impl MasterKey {
    pub fn new(bytes: [u8; MASTER_KEY_LEN]) -> Self {
        Self {
            bytes: KeyBytes(bytes),
        }
    }

    /// Builds a key from a configured secret string.
    ///
    /// The secret's UTF-8 bytes are used directly. Anything past the first
    /// 32 bytes is ignored.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Configuration` if the secret is shorter than
    /// 32 bytes.
    pub fn from_secret(secret: &str) -> CryptoResult<Self> {
        let raw = secret.as_bytes();
        if raw.len() < MASTER_KEY_LEN {
            return Err(CryptoError::Configuration(format!(
                "key must be at least {MASTER_KEY_LEN} bytes, got {}",
                raw.len()
            )));
        }

        let mut bytes = [0u8; MASTER_KEY_LEN];
        bytes.copy_from_slice(&raw[..MASTER_KEY_LEN]);
        Ok(Self::new(bytes))
    }

    /// Raw key bytes for the KDF. Do not store or log.
    pub(crate) fn expose_secret(&self) -> &[u8; MASTER_KEY_LEN] {
        &self.bytes.0
    }

    fn same_material(&self, other: &MasterKey) -> bool {
        self.bytes.0 == other.bytes.0
    }
}

/// Source of master keys for the cipher.
///
/// Configuration is read once; implementations are immutable afterwards and
/// safe to share across threads.
pub trait KeyProvider: Send + Sync {
    /// The key used for all new encryptions.
    fn active_key(&self) -> CryptoResult<Arc<MasterKey>>;

    /// The outgoing key, accepted for decryption only. `None` outside a
    /// rotation window.
    fn legacy_key(&self) -> Option<Arc<MasterKey>>;

    /// Whether a legacy key is currently configured.
    fn has_rotation_window(&self) -> bool {
        self.legacy_key().is_some()
    }
}

/// Resolves the optional legacy secret. Never fails: an unusable legacy key
/// simply means no rotation window.
fn resolve_legacy(secret: Option<&str>, active: &MasterKey) -> Option<Arc<MasterKey>> {
    let secret = secret.filter(|s| !s.is_empty())?;
    let key = match MasterKey::from_secret(secret) {
        Ok(key) => key,
        Err(_) => {
            warn!("legacy credential key is shorter than {MASTER_KEY_LEN} bytes, ignoring it");
            return None;
        }
    };

    if key.same_material(active) {
        warn!("legacy credential key equals the active key, ignoring it");
        return None;
    }

    debug!("credential key rotation window is open");
    Some(Arc::new(key))
}

// ============================================================================
// ProductionKeyProvider
// ============================================================================

/// Key provider for production deployments. No fallback exists.
#[derive(Debug)]
pub struct ProductionKeyProvider {
    active: Arc<MasterKey>,
    legacy: Option<Arc<MasterKey>>,
}

impl ProductionKeyProvider {
    /// Validates the configured secrets.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Configuration` if the active secret is unset,
    /// empty, or shorter than 32 bytes. Callers should abort startup.
    pub fn new(active: Option<&str>, legacy: Option<&str>) -> CryptoResult<Self> {
        let secret = active.filter(|s| !s.is_empty()).ok_or_else(|| {
            CryptoError::Configuration("active credential key is not set".to_string())
        })?;
        let active = MasterKey::from_secret(secret)?;
        let legacy = resolve_legacy(legacy, &active);

        Ok(Self {
            active: Arc::new(active),
            legacy,
        })
    }
}

impl KeyProvider for ProductionKeyProvider {
    fn active_key(&self) -> CryptoResult<Arc<MasterKey>> {
        Ok(Arc::clone(&self.active))
    }

    fn legacy_key(&self) -> Option<Arc<MasterKey>> {
        self.legacy.clone()
    }
}

// ============================================================================
// DevelopmentKeyProvider
// ============================================================================

/// Key provider for local development.
///
/// Uses the configured active key when it is usable, otherwise a fixed and
/// publicly known key. The fallback is announced with a warning when the
/// provider is built.
#[derive(Debug)]
pub struct DevelopmentKeyProvider {
    active: Arc<MasterKey>,
    legacy: Option<Arc<MasterKey>>,
    using_fallback: bool,
}

impl DevelopmentKeyProvider {
    pub fn new(active: Option<&str>, legacy: Option<&str>) -> Self {
        let configured = active
            .filter(|s| !s.is_empty())
            .map(MasterKey::from_secret);

        let (active, using_fallback) = match configured {
            Some(Ok(key)) => (key, false),
            Some(Err(_)) => {
                warn!(
                    "active credential key is shorter than {MASTER_KEY_LEN} bytes; \
                     using the INSECURE development key. Never deploy like this."
                );
                (MasterKey::new(*INSECURE_DEVELOPMENT_KEY), true)
            }
            None => {
                warn!(
                    "active credential key is not set; \
                     using the INSECURE development key. Never deploy like this."
                );
                (MasterKey::new(*INSECURE_DEVELOPMENT_KEY), true)
            }
        };
        let legacy = resolve_legacy(legacy, &active);

        Self {
            active: Arc::new(active),
            legacy,
            using_fallback,
        }
    }

    /// True when the insecure built-in key is in use.
    pub fn is_using_fallback(&self) -> bool {
        self.using_fallback
    }
}

impl KeyProvider for DevelopmentKeyProvider {
    fn active_key(&self) -> CryptoResult<Arc<MasterKey>> {
        Ok(Arc::clone(&self.active))
    }

    fn legacy_key(&self) -> Option<Arc<MasterKey>> {
        self.legacy.clone()
    }
}

// ============================================================================
// StaticKeyProvider
// ============================================================================

/// Provider over explicitly supplied keys.
#[derive(Debug)]
pub struct StaticKeyProvider {
    active: Arc<MasterKey>,
    legacy: Option<Arc<MasterKey>>,
}

impl StaticKeyProvider {
    pub fn new(active: MasterKey) -> Self {
        Self {
            active: Arc::new(active),
            legacy: None,
        }
    }

    /// Opens a rotation window: `legacy` is accepted for decryption only.
    pub fn with_legacy(active: MasterKey, legacy: MasterKey) -> Self {
        Self {
            active: Arc::new(active),
            legacy: Some(Arc::new(legacy)),
        }
    }
}

impl KeyProvider for StaticKeyProvider {
    fn active_key(&self) -> CryptoResult<Arc<MasterKey>> {
        Ok(Arc::clone(&self.active))
    }

    fn legacy_key(&self) -> Option<Arc<MasterKey>> {
        self.legacy.clone()
    }
}
