//! Credential record error types.

use crate::record::CredentialField;
use kariah_crypto::CryptoError;
use thiserror::Error;

/// Result type for credential record operations.
pub type CredentialResult<T> = Result<T, CredentialError>;

/// Errors that can occur while handling provider credential records.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// A single credential field could not be processed.
    #[error("credential field {field}: {source}")]
    Field {
        field: CredentialField,
        #[source]
        source: CryptoError,
    },

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("record store error: {0}")]
    Store(String),

    #[error("migration task failed: {0}")]
    Task(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl CredentialError {
    pub(crate) fn field(field: CredentialField, source: CryptoError) -> Self {
        Self::Field { field, source }
    }

    /// True if the underlying cause is a value no configured key can open.
    pub fn is_key_mismatch(&self) -> bool {
        matches!(
            self,
            Self::Field { source: CryptoError::KeyMismatch, .. } | Self::Crypto(CryptoError::KeyMismatch)
        )
    }

    /// The field that failed, if the error is field-scoped.
    pub fn failed_field(&self) -> Option<CredentialField> {
        match self {
            Self::Field { field, .. } => Some(*field),
            _ => None,
        }
    }
}
