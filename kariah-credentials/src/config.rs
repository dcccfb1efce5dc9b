//! Migration job configuration.

use crate::error::{CredentialError, CredentialResult};
use serde::{Deserialize, Serialize};

/// Configuration for a credential re-encryption run.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    /// Records fetched from the store per page.
    pub page_size: usize,

    /// Records re-encrypted in parallel. PBKDF2 is CPU-bound, so more than the
    /// number of cores buys nothing.
    pub max_concurrency: usize,

    /// Evaluate every record but write nothing back.
    pub dry_run: bool,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            max_concurrency: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            dry_run: false,
        }
    }
}

impl MigrationConfig {
    pub fn validate(&self) -> CredentialResult<()> {
        if self.page_size == 0 {
            return Err(CredentialError::Config("page_size must be at least 1".to_string()));
        }
        if self.max_concurrency == 0 {
            return Err(CredentialError::Config(
                "max_concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
