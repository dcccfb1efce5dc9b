//! Record-level credential handling.
//!
//! A [`ProviderConfigRecord`] is the unit of rotation: every secret field is
//! migrated independently, and the record reports whether any of them
//! changed. The same per-field walk backs the write path (seal), the read
//! path (open) and the admin status view.

use crate::error::{CredentialError, CredentialResult};
use crate::mask::mask_credential;
use crate::record::{CredentialField, ProviderConfigRecord};
use chrono::Utc;
use kariah_crypto::{CredentialCipher, CredentialState};
use serde::Serialize;
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Result of rotating one record.
#[derive(Clone, Debug)]
pub struct RotationOutcome {
    pub record: ProviderConfigRecord,
    /// True iff at least one field changed value.
    pub reencrypted: bool,
    pub fields_changed: Vec<CredentialField>,
}

/// Re-encrypts every secret field of `record` under the active key.
///
/// Absent and empty fields pass through. `updated_at` is bumped only when a
/// field changed.
///
/// # Errors
///
/// `CredentialError::Field` naming the first field that could not be
/// migrated (typically a key mismatch). The input record is left untouched.
pub fn reencrypt_provider_credentials(
    cipher: &CredentialCipher,
    record: &ProviderConfigRecord,
) -> CredentialResult<RotationOutcome> {
    let mut updated = record.clone();
    let mut fields_changed = Vec::new();

    for field in CredentialField::ALL {
        let Some(current) = record.get(field).filter(|v| !v.is_empty()) else {
            continue;
        };

        let next = cipher
            .reencrypt_credential(current)
            .map_err(|e| CredentialError::field(field, e))?;

        if next != current {
            updated.set(field, Some(next));
            fields_changed.push(field);
        }
    }

    let reencrypted = !fields_changed.is_empty();
    if reencrypted {
        updated.updated_at = Utc::now();
        debug!(
            record_id = %record.id,
            fields = ?fields_changed,
            "re-encrypted provider credentials"
        );
    }

    Ok(RotationOutcome {
        record: updated,
        reencrypted,
        fields_changed,
    })
}

/// Encrypts any plaintext field before the record is written.
pub fn seal_provider_credentials(
    cipher: &CredentialCipher,
    record: &ProviderConfigRecord,
) -> CredentialResult<ProviderConfigRecord> {
    let mut sealed = record.clone();
    for field in CredentialField::ALL {
        if let Some(value) = record.get(field) {
            let stored = cipher
                .encrypt_if_needed(value)
                .map_err(|e| CredentialError::field(field, e))?;
            sealed.set(field, Some(stored));
        }
    }
    Ok(sealed)
}

/// Decrypted secrets of one record, for handing to a gateway client.
///
/// Zeroized on drop; `Debug` lists field names only.
#[derive(Default, Zeroize, ZeroizeOnDrop)]
pub struct ProviderSecrets {
    #[zeroize(skip)]
    present: Vec<CredentialField>,
    values: Vec<String>,
}

impl ProviderSecrets {
    fn insert(&mut self, field: CredentialField, value: String) {
        self.present.push(field);
        self.values.push(value);
    }

    /// Plaintext of `field`, `None` when absent or empty.
    pub fn get(&self, field: CredentialField) -> Option<&str> {
        self.present
            .iter()
            .position(|f| *f == field)
            .map(|i| self.values[i].as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.present.is_empty()
    }
}

impl std::fmt::Debug for ProviderSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSecrets")
            .field("fields", &self.present)
            .finish()
    }
}

/// Decrypts every configured field of `record`.
///
/// # Errors
///
/// `CredentialError::Field` if any field cannot be opened. There is no
/// partial result: a gateway call must not proceed with a missing secret.
pub fn open_provider_credentials(
    cipher: &CredentialCipher,
    record: &ProviderConfigRecord,
) -> CredentialResult<ProviderSecrets> {
    let mut secrets = ProviderSecrets::default();
    for field in record.configured_fields() {
        let stored = record.get(field).unwrap_or_default();
        let plaintext = cipher
            .decrypt_if_needed(stored)
            .map_err(|e| CredentialError::field(field, e))?;
        secrets.insert(field, plaintext);
    }
    Ok(secrets)
}

/// Admin-facing status of one credential field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CredentialStatus {
    pub field: CredentialField,
    pub state: CredentialState,
    /// Masked plaintext; `None` when empty or undecryptable.
    pub masked: Option<String>,
}

/// Lifecycle state and masked value of every field of `record`.
pub fn describe_credentials(
    cipher: &CredentialCipher,
    record: &ProviderConfigRecord,
) -> CredentialResult<Vec<CredentialStatus>> {
    let mut statuses = Vec::with_capacity(CredentialField::ALL.len());
    for field in CredentialField::ALL {
        let stored = record.get(field).unwrap_or_default();
        let state = cipher
            .credential_state(stored)
            .map_err(|e| CredentialError::field(field, e))?;

        let masked = match state {
            CredentialState::Empty | CredentialState::Undecryptable => None,
            _ => {
                let plaintext = cipher
                    .decrypt_if_needed(stored)
                    .map_err(|e| CredentialError::field(field, e))?;
                Some(mask_credential(&plaintext))
            }
        };

        statuses.push(CredentialStatus {
            field,
            state,
            masked,
        });
    }
    Ok(statuses)
}
