//! Credential encryption service and single-value key rotation.
//!
//! [`CredentialCipher`] is what the rest of the application talks to. It
//! binds a [`KeyProvider`] to the cipher, and knows how to move one stored
//! value through its lifecycle:
//!
//! ```text
//! Plaintext ──┐
//!             ├──> EncryptedWithActiveKey
//! EncryptedWithLegacyKey ──┘
//! ```

use crate::cipher;
use crate::classifier::looks_encrypted;
use crate::config::KeyConfig;
use crate::error::{CryptoError, CryptoResult};
use crate::key::KeyProvider;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Where a stored value sits in the credential lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialState {
    Empty,
    Plaintext,
    EncryptedWithLegacyKey,
    EncryptedWithActiveKey,
    /// Looks encrypted but opens under no configured key.
    Undecryptable,
}

impl CredentialState {
    /// Whether the rotation job would rewrite a value in this state.
    pub fn needs_migration(self) -> bool {
        matches!(self, Self::Plaintext | Self::EncryptedWithLegacyKey)
    }
}

/// Encrypts, decrypts and rotates credential values.
///
/// Cheap to clone; holds no mutable state.
#[derive(Clone)]
pub struct CredentialCipher {
    keys: Arc<dyn KeyProvider>,
}

impl CredentialCipher {
    pub fn new(keys: Arc<dyn KeyProvider>) -> Self {
        Self { keys }
    }

    /// Builds the key provider selected by `config` and wraps it.
    pub fn from_config(config: &KeyConfig) -> CryptoResult<Self> {
        Ok(Self::new(config.build_provider()?))
    }

    /// Whether a legacy key is configured.
    pub fn has_rotation_window(&self) -> bool {
        self.keys.has_rotation_window()
    }

    /// Encrypts a raw secret under the active key. `""` stays `""`.
    pub fn encrypt_credential(&self, plaintext: &str) -> CryptoResult<String> {
        let key = self.keys.active_key()?;
        cipher::encrypt(plaintext, &key)
    }

    /// Decrypts an envelope under the active key only. `""` stays `""`.
    ///
    /// # Errors
    ///
    /// `MalformedEnvelope` or `Decryption`; callers must not fall back to an
    /// empty credential.
    pub fn decrypt_credential(&self, envelope: &str) -> CryptoResult<String> {
        let key = self.keys.active_key()?;
        cipher::decrypt(envelope, &key)
    }

    /// Encrypts `value` unless it is empty or already looks encrypted.
    pub fn encrypt_if_needed(&self, value: &str) -> CryptoResult<String> {
        if value.is_empty() || looks_encrypted(value) {
            return Ok(value.to_string());
        }
        self.encrypt_credential(value)
    }

    /// Returns the plaintext of `value`, whatever its state.
    ///
    /// Plaintext passes through. Encrypted values are tried under the active
    /// key, then the legacy key.
    ///
    /// # Errors
    ///
    /// `KeyMismatch` if an encrypted-looking value opens under neither key.
    pub fn decrypt_if_needed(&self, value: &str) -> CryptoResult<String> {
        if value.is_empty() || !looks_encrypted(value) {
            return Ok(value.to_string());
        }

        let active = self.keys.active_key()?;
        if let Ok(plaintext) = cipher::decrypt(value, &active) {
            return Ok(plaintext);
        }

        if let Some(legacy) = self.keys.legacy_key() {
            if let Ok(plaintext) = cipher::decrypt(value, &legacy) {
                debug!("credential opened with the legacy key, re-encryption pending");
                return Ok(plaintext);
            }
        }

        warn!("credential does not decrypt under any configured key");
        Err(CryptoError::KeyMismatch)
    }

    /// Whether `value` should be rewritten under the active key.
    ///
    /// True for plaintext, and for values that open under the legacy key.
    /// Never fails.
    pub fn needs_reencryption(&self, value: &str) -> bool {
        if value.is_empty() {
            return false;
        }
        if !looks_encrypted(value) {
            return true;
        }

        match self.keys.legacy_key() {
            Some(legacy) => cipher::decrypt(value, &legacy).is_ok(),
            None => false,
        }
    }

    /// Migrates one stored value to the active key. Idempotent.
    ///
    /// - empty stays empty
    /// - plaintext is encrypted under the active key
    /// - a value that opens under the legacy key is re-encrypted
    /// - a value that opens under the active key is returned unchanged
    ///
    /// # Errors
    ///
    /// `KeyMismatch` if the value opens under no configured key. The value is
    /// never replaced in that case.
    pub fn reencrypt_credential(&self, value: &str) -> CryptoResult<String> {
        if value.is_empty() {
            return Ok(String::new());
        }
        if !looks_encrypted(value) {
            return self.encrypt_credential(value);
        }

        let active = self.keys.active_key()?;

        if let Some(legacy) = self.keys.legacy_key() {
            if let Ok(plaintext) = cipher::decrypt(value, &legacy) {
                debug!("re-encrypting credential from the legacy key");
                return cipher::encrypt(&plaintext, &active);
            }
        }

        match cipher::decrypt(value, &active) {
            Ok(_) => Ok(value.to_string()),
            Err(e) => {
                warn!(cause = e.kind(), "credential does not decrypt under any configured key");
                Err(CryptoError::KeyMismatch)
            }
        }
    }

    /// Classifies a stored value into its lifecycle state.
    pub fn credential_state(&self, value: &str) -> CryptoResult<CredentialState> {
        if value.is_empty() {
            return Ok(CredentialState::Empty);
        }
        if !looks_encrypted(value) {
            return Ok(CredentialState::Plaintext);
        }

        let active = self.keys.active_key()?;
        if cipher::decrypt(value, &active).is_ok() {
            return Ok(CredentialState::EncryptedWithActiveKey);
        }
        if let Some(legacy) = self.keys.legacy_key() {
            if cipher::decrypt(value, &legacy).is_ok() {
                return Ok(CredentialState::EncryptedWithLegacyKey);
            }
        }
        Ok(CredentialState::Undecryptable)
    }
}

impl std::fmt::Debug for CredentialCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialCipher")
            .field("rotation_window", &self.keys.has_rotation_window())
            .finish()
    }
}
