//! Batch re-encryption of stored provider credentials.
//!
//! Run once after the active master key is rotated (with the old key
//! configured as legacy), or to encrypt records that still hold plaintext.
//! Records are paged out of the store by id and rotated in parallel on the
//! blocking pool, bounded by `max_concurrency`. Only records that changed are
//! written back.

use crate::config::MigrationConfig;
use crate::error::{CredentialError, CredentialResult};
use crate::record::CredentialField;
use crate::rotation::reencrypt_provider_credentials;
use crate::store::ProviderRecordStore;
use kariah_crypto::CredentialCipher;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// A record the job could not migrate. It was left as stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MigrationFailure {
    pub record_id: Uuid,
    pub field: Option<CredentialField>,
    pub error: String,
}

/// Summary of one migration run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub scanned: usize,
    pub reencrypted: usize,
    pub unchanged: usize,
    pub failures: Vec<MigrationFailure>,
    pub dry_run: bool,
}

impl MigrationReport {
    /// True when every scanned record is now under the active key.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Re-encrypts every record in a store under the active key.
pub struct MigrationJob<S> {
    cipher: CredentialCipher,
    store: Arc<S>,
    config: MigrationConfig,
}

impl<S: ProviderRecordStore + 'static> MigrationJob<S> {
    pub fn new(
        cipher: CredentialCipher,
        store: Arc<S>,
        config: MigrationConfig,
    ) -> CredentialResult<Self> {
        config.validate()?;
        Ok(Self {
            cipher,
            store,
            config,
        })
    }

    /// Runs the job to completion.
    ///
    /// Records that fail to migrate (a field no configured key can open) are
    /// listed in the report and not written. A store error aborts the run;
    /// records saved before it stay migrated, and rerunning is safe.
    pub async fn run(&self) -> CredentialResult<MigrationReport> {
        if !self.cipher.has_rotation_window() {
            info!("no legacy credential key configured; only plaintext fields will be migrated");
        }

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency));
        let mut report = MigrationReport {
            dry_run: self.config.dry_run,
            ..MigrationReport::default()
        };
        let mut after = None;

        loop {
            let page = self
                .store
                .list_records(after, self.config.page_size)
                .await?;
            let page_len = page.len();
            let Some(last) = page.last() else {
                break;
            };
            after = Some(last.id);
            debug!(records = page_len, "migrating page of provider records");

            let mut handles = Vec::with_capacity(page_len);
            for record in page {
                let permit = Arc::clone(&semaphore)
                    .acquire_owned()
                    .await
                    .map_err(|e| CredentialError::Task(e.to_string()))?;
                let cipher = self.cipher.clone();
                handles.push(tokio::task::spawn_blocking(move || {
                    let _permit = permit;
                    let outcome = reencrypt_provider_credentials(&cipher, &record);
                    (record.id, outcome)
                }));
            }

            for handle in handles {
                let (record_id, outcome) = handle
                    .await
                    .map_err(|e| CredentialError::Task(e.to_string()))?;
                report.scanned += 1;

                match outcome {
                    Ok(outcome) if outcome.reencrypted => {
                        if !self.config.dry_run {
                            self.store.save_record(&outcome.record).await?;
                        }
                        report.reencrypted += 1;
                    }
                    Ok(_) => report.unchanged += 1,
                    Err(e) => {
                        let field = e.failed_field();
                        warn!(
                            record_id = %record_id,
                            field = field.map(CredentialField::as_str),
                            key_mismatch = e.is_key_mismatch(),
                            "provider record could not be migrated"
                        );
                        report.failures.push(MigrationFailure {
                            record_id,
                            field,
                            error: e.to_string(),
                        });
                    }
                }
            }

            if page_len < self.config.page_size {
                break;
            }
        }

        info!(
            scanned = report.scanned,
            reencrypted = report.reencrypted,
            unchanged = report.unchanged,
            failed = report.failures.len(),
            dry_run = report.dry_run,
            "credential migration finished"
        );
        Ok(report)
    }
}
