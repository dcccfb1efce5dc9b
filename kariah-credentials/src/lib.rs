//! Payment-provider credential records for Kariah.
//!
//! Builds on `kariah-crypto` to handle whole provider configuration records:
//! - Record-level key rotation, one field at a time
//! - Write-path sealing and read-path opening of gateway secrets
//! - Masked display values for the admin console
//! - A paged, parallel migration job for rotating every stored record

pub mod config;
pub mod error;
pub mod mask;
pub mod migration;
pub mod record;
pub mod rotation;
pub mod store;

pub use config::MigrationConfig;
pub use error::{CredentialError, CredentialResult};
pub use mask::mask_credential;
pub use migration::{MigrationFailure, MigrationJob, MigrationReport};
pub use record::{CredentialField, PaymentProvider, ProviderConfigRecord};
pub use rotation::{
    describe_credentials, open_provider_credentials, reencrypt_provider_credentials,
    seal_provider_credentials, CredentialStatus, ProviderSecrets, RotationOutcome,
};
pub use store::{MemoryRecordStore, ProviderRecordStore};
