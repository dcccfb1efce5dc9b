#![allow(dead_code)]

use kariah_credentials::{CredentialField, PaymentProvider, ProviderConfigRecord};
use kariah_crypto::{CredentialCipher, MasterKey, ProductionKeyProvider, StaticKeyProvider};
use std::sync::Arc;

pub const OLD_KEY: &str = "old-master-key-0123456789abcdefgh";
pub const NEW_KEY: &str = "new-master-key-0123456789abcdefgh";

/// Cipher as configured before the rotation.
pub fn before_rotation() -> CredentialCipher {
    cipher(OLD_KEY, None)
}

/// Cipher during the rotation window: new key active, old key legacy.
pub fn during_rotation() -> CredentialCipher {
    cipher(NEW_KEY, Some(OLD_KEY))
}

/// Cipher once the legacy key has been removed.
pub fn after_rotation() -> CredentialCipher {
    cipher(NEW_KEY, None)
}

pub fn cipher(active: &str, legacy: Option<&str>) -> CredentialCipher {
    CredentialCipher::new(Arc::new(
        ProductionKeyProvider::new(Some(active), legacy).unwrap(),
    ))
}

/// Cipher whose key nobody else knows.
pub fn stranger() -> CredentialCipher {
    CredentialCipher::new(Arc::new(StaticKeyProvider::new(MasterKey::new([0x5a; 32]))))
}

pub fn record_encrypted_with(cipher: &CredentialCipher, org: &str) -> ProviderConfigRecord {
    ProviderConfigRecord::new(org, PaymentProvider::ToyyibPay)
        .with(
            CredentialField::ApiKey,
            cipher.encrypt_credential(&format!("{org}-api-key")).unwrap(),
        )
        .with(
            CredentialField::SecretKey,
            cipher.encrypt_credential(&format!("{org}-secret-key")).unwrap(),
        )
}
