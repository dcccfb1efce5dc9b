mod support;

use kariah_credentials::{
    describe_credentials, open_provider_credentials, reencrypt_provider_credentials,
    seal_provider_credentials, CredentialField, PaymentProvider, ProviderConfigRecord,
};
use kariah_crypto::{looks_encrypted, CredentialState, CryptoError};
use pretty_assertions::assert_eq;
use support::*;

// ── Record rotation ──

#[test]
fn legacy_record_is_migrated_to_new_key() {
    let record = ProviderConfigRecord::new("masjid-an-nur", PaymentProvider::Billplz).with(
        CredentialField::ApiKey,
        before_rotation().encrypt_credential("sk_live_original").unwrap(),
    );

    let rotating = during_rotation();
    assert!(rotating.needs_reencryption(record.get(CredentialField::ApiKey).unwrap()));

    let outcome = reencrypt_provider_credentials(&rotating, &record).unwrap();
    assert!(outcome.reencrypted);
    assert_eq!(outcome.fields_changed, vec![CredentialField::ApiKey]);

    let migrated = outcome.record.get(CredentialField::ApiKey).unwrap();
    assert_eq!(after_rotation().decrypt_credential(migrated).unwrap(), "sk_live_original");
}

#[test]
fn rotation_is_idempotent() {
    let record = record_encrypted_with(&before_rotation(), "masjid-al-ikhlas");
    let rotating = during_rotation();

    let first = reencrypt_provider_credentials(&rotating, &record).unwrap();
    assert!(first.reencrypted);

    let second = reencrypt_provider_credentials(&rotating, &first.record).unwrap();
    assert!(!second.reencrypted);
    assert!(second.fields_changed.is_empty());
    assert_eq!(second.record, first.record);
}

#[test]
fn absent_and_empty_fields_pass_through() {
    let record = ProviderConfigRecord::new("org", PaymentProvider::Chip)
        .with(CredentialField::SigningKey, "");

    let outcome = reencrypt_provider_credentials(&during_rotation(), &record).unwrap();
    assert!(!outcome.reencrypted);
    assert_eq!(outcome.record, record);
}

#[test]
fn unchanged_record_keeps_timestamp() {
    let record = record_encrypted_with(&after_rotation(), "org");
    let outcome = reencrypt_provider_credentials(&during_rotation(), &record).unwrap();
    assert!(!outcome.reencrypted);
    assert_eq!(outcome.record.updated_at, record.updated_at);
}

#[test]
fn changed_record_bumps_timestamp() {
    let record = record_encrypted_with(&before_rotation(), "org");
    let outcome = reencrypt_provider_credentials(&during_rotation(), &record).unwrap();
    assert!(outcome.record.updated_at >= record.updated_at);
    assert_eq!(outcome.record.id, record.id);
}

#[test]
fn plaintext_fields_are_encrypted_by_rotation() {
    let record = ProviderConfigRecord::new("org", PaymentProvider::Stripe)
        .with(CredentialField::WebhookSecret, "whsec_plain");

    let outcome = reencrypt_provider_credentials(&after_rotation(), &record).unwrap();
    assert!(outcome.reencrypted);
    let stored = outcome.record.get(CredentialField::WebhookSecret).unwrap();
    assert!(looks_encrypted(stored));
}

#[test]
fn mixed_fields_are_migrated_independently() {
    let current = after_rotation().encrypt_credential("already-current").unwrap();
    let record = ProviderConfigRecord::new("org", PaymentProvider::ToyyibPay)
        .with(CredentialField::ApiKey, current.clone())
        .with(CredentialField::SecretKey, "plain-secret")
        .with(
            CredentialField::SigningKey,
            before_rotation().encrypt_credential("legacy-signing").unwrap(),
        );

    let outcome = reencrypt_provider_credentials(&during_rotation(), &record).unwrap();
    assert_eq!(
        outcome.fields_changed,
        vec![CredentialField::SecretKey, CredentialField::SigningKey]
    );
    assert_eq!(outcome.record.get(CredentialField::ApiKey), Some(current.as_str()));
}

#[test]
fn undecryptable_field_reports_key_mismatch_with_field() {
    let record = ProviderConfigRecord::new("org", PaymentProvider::ToyyibPay)
        .with(CredentialField::ApiKey, "pk_plain")
        .with(
            CredentialField::SigningKey,
            stranger().encrypt_credential("orphan").unwrap(),
        );

    let err = reencrypt_provider_credentials(&during_rotation(), &record).unwrap_err();
    assert!(err.is_key_mismatch());
    assert_eq!(err.failed_field(), Some(CredentialField::SigningKey));
}

// ── Seal / Open ──

#[test]
fn seal_then_open_roundtrip() {
    let cipher = after_rotation();
    let record = ProviderConfigRecord::new("org", PaymentProvider::Billplz)
        .with(CredentialField::ApiKey, "billplz-api-key")
        .with(CredentialField::WebhookSecret, "billplz-x-signature");

    let sealed = seal_provider_credentials(&cipher, &record).unwrap();
    for field in sealed.configured_fields() {
        assert!(looks_encrypted(sealed.get(field).unwrap()));
    }

    let secrets = open_provider_credentials(&cipher, &sealed).unwrap();
    assert_eq!(secrets.get(CredentialField::ApiKey), Some("billplz-api-key"));
    assert_eq!(secrets.get(CredentialField::WebhookSecret), Some("billplz-x-signature"));
    assert_eq!(secrets.get(CredentialField::SecretKey), None);
}

#[test]
fn seal_leaves_encrypted_fields_alone() {
    let cipher = after_rotation();
    let record = record_encrypted_with(&cipher, "org");
    assert_eq!(seal_provider_credentials(&cipher, &record).unwrap(), record);
}

#[test]
fn open_reads_legacy_values_during_window() {
    let record = record_encrypted_with(&before_rotation(), "masjid-jamek");
    let secrets = open_provider_credentials(&during_rotation(), &record).unwrap();
    assert_eq!(secrets.get(CredentialField::ApiKey), Some("masjid-jamek-api-key"));
}

#[test]
fn open_refuses_partial_results() {
    let record = record_encrypted_with(&before_rotation(), "org");
    let err = open_provider_credentials(&after_rotation(), &record).unwrap_err();
    assert!(err.is_key_mismatch());
    assert_eq!(err.failed_field(), Some(CredentialField::ApiKey));
}

#[test]
fn secrets_debug_hides_values() {
    let cipher = after_rotation();
    let record = record_encrypted_with(&cipher, "org");
    let secrets = open_provider_credentials(&cipher, &record).unwrap();
    let printed = format!("{secrets:?}");
    assert!(!printed.contains("org-api-key"));
    assert!(printed.contains("ApiKey"));
}

// ── Admin status ──

#[test]
fn describe_reports_state_and_mask() {
    let record = ProviderConfigRecord::new("org", PaymentProvider::ToyyibPay)
        .with(CredentialField::ApiKey, "sk_live_1234567890abcdef")
        .with(
            CredentialField::SecretKey,
            before_rotation().encrypt_credential("secret-9876").unwrap(),
        )
        .with(
            CredentialField::SigningKey,
            stranger().encrypt_credential("unknown").unwrap(),
        );

    let statuses = describe_credentials(&during_rotation(), &record).unwrap();
    let summary: Vec<_> = statuses
        .iter()
        .map(|s| (s.field, s.state, s.masked.clone()))
        .collect();

    assert_eq!(
        summary,
        vec![
            (CredentialField::ApiKey, CredentialState::Plaintext, Some("****cdef".to_string())),
            (
                CredentialField::SecretKey,
                CredentialState::EncryptedWithLegacyKey,
                Some("****9876".to_string())
            ),
            (CredentialField::SigningKey, CredentialState::Undecryptable, None),
            (CredentialField::WebhookSecret, CredentialState::Empty, None),
        ]
    );
}

#[test]
fn field_error_message_names_field_only() {
    let record = ProviderConfigRecord::new("org", PaymentProvider::Chip).with(
        CredentialField::ApiKey,
        stranger().encrypt_credential("very-secret-value").unwrap(),
    );
    let err = reencrypt_provider_credentials(&after_rotation(), &record).unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("credential field api_key:"));
    assert!(!message.contains("very-secret-value"));
    assert!(matches!(
        err,
        kariah_credentials::CredentialError::Field { source: CryptoError::KeyMismatch, .. }
    ));
}
