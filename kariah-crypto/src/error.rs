//! Error types for credential encryption.
//!
//! Messages never carry key material or plaintext, only what went wrong.

use thiserror::Error;

/// Result type for credential crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur while protecting or recovering a credential.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// The active master key is missing or too weak for the deployment.
    #[error("invalid key configuration: {0}")]
    Configuration(String),

    /// The value is not a structurally valid envelope (bad base64, truncated).
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// The envelope is well-formed but did not authenticate under the key tried.
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// The value could not be decrypted with any configured key.
    #[error("credential cannot be decrypted with the active or legacy key")]
    KeyMismatch,

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("random number generation failed: {0}")]
    RandomFailure(String),
}

impl CryptoError {
    /// True for any failure to open an envelope under a single key.
    ///
    /// A malformed envelope counts as a decryption failure.
    pub fn is_decryption_failure(&self) -> bool {
        matches!(self, Self::Decryption(_) | Self::MalformedEnvelope(_))
    }

    /// Short, stable name of the error kind, safe to log.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::MalformedEnvelope(_) => "malformed_envelope",
            Self::Decryption(_) => "decryption",
            Self::KeyMismatch => "key_mismatch",
            Self::Encryption(_) => "encryption",
            Self::RandomFailure(_) => "random_failure",
        }
    }
}
