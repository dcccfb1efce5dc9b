//! At-rest protection for payment-provider credentials.
//!
//! Long-lived gateway secrets (API keys, signing keys, webhook secrets) are
//! stored as opaque strings. This crate turns them into authenticated
//! ciphertext and back, and supports rotating the master key without
//! downtime:
//!
//! - AES-256-GCM for authenticated encryption
//! - PBKDF2-HMAC-SHA256 (100,000 iterations) to derive a per-value key from
//!   the master key and a random salt
//! - A two-key rotation window: an *active* key for new encryptions and an
//!   optional *legacy* key accepted for decryption only
//!
//! # Usage
//!
//! ```ignore
//! use kariah_crypto::{CredentialCipher, KeyConfig};
//!
//! let cipher = CredentialCipher::from_config(&KeyConfig::from_env()?)?;
//! let stored = cipher.encrypt_credential("sk_live_...")?;
//! let secret = cipher.decrypt_if_needed(&stored)?;
//! ```
//!
//! # Stored format
//!
//! `base64(salt[64] ‖ iv[16] ‖ ciphertext ‖ tag[16])`, see [`envelope`].
//!
//! # Errors
//!
//! - `Configuration`: active key missing or too short in production
//! - `MalformedEnvelope`: not decodable as an envelope
//! - `Decryption`: envelope does not authenticate under the key tried
//! - `KeyMismatch`: value opens under neither the active nor the legacy key
//!
//! All operations are synchronous and free of shared mutable state.

pub mod cipher;
mod classifier;
mod config;
mod credential;
pub mod envelope;
mod error;
mod key;

pub use cipher::{decrypt, encrypt, open, seal, PBKDF2_ITERATIONS};
pub use classifier::{looks_encrypted, MIN_ENCRYPTED_CHARS};
pub use config::{DeploymentMode, KeyConfig, ACTIVE_KEY_VAR, DEPLOYMENT_VAR, LEGACY_KEY_VAR};
pub use credential::{CredentialCipher, CredentialState};
pub use envelope::{Envelope, IV_LEN, MIN_ENVELOPE_LEN, SALT_LEN, TAG_LEN};
pub use error::{CryptoError, CryptoResult};
pub use key::{
    DevelopmentKeyProvider, KeyProvider, MasterKey, ProductionKeyProvider, StaticKeyProvider,
    MASTER_KEY_LEN,
};
