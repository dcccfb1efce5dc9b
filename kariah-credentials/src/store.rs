//! Record store seam.
//!
//! Persistence is owned by the application; the migration job only needs to
//! page through records in a stable order and write back the ones it changed.

use crate::error::{CredentialError, CredentialResult};
use crate::record::ProviderConfigRecord;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Storage for provider configuration records.
#[async_trait]
pub trait ProviderRecordStore: Send + Sync {
    /// Returns up to `limit` records with an id greater than `after`,
    /// ordered by id.
    async fn list_records(
        &self,
        after: Option<Uuid>,
        limit: usize,
    ) -> CredentialResult<Vec<ProviderConfigRecord>>;

    /// Overwrites an existing record.
    async fn save_record(&self, record: &ProviderConfigRecord) -> CredentialResult<()>;
}

/// In-memory record store.
#[derive(Clone, Default)]
pub struct MemoryRecordStore {
    records: Arc<RwLock<BTreeMap<Uuid, ProviderConfigRecord>>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, record: ProviderConfigRecord) {
        self.records.write().await.insert(record.id, record);
    }

    pub async fn get(&self, id: Uuid) -> Option<ProviderConfigRecord> {
        self.records.read().await.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl ProviderRecordStore for MemoryRecordStore {
    async fn list_records(
        &self,
        after: Option<Uuid>,
        limit: usize,
    ) -> CredentialResult<Vec<ProviderConfigRecord>> {
        let lower = match after {
            Some(id) => Bound::Excluded(id),
            None => Bound::Unbounded,
        };
        let records = self.records.read().await;
        Ok(records
            .range((lower, Bound::Unbounded))
            .take(limit)
            .map(|(_, r)| r.clone())
            .collect())
    }

    async fn save_record(&self, record: &ProviderConfigRecord) -> CredentialResult<()> {
        let mut records = self.records.write().await;
        match records.get_mut(&record.id) {
            Some(slot) => {
                *slot = record.clone();
                Ok(())
            }
            None => Err(CredentialError::Store(format!("record {} not found", record.id))),
        }
    }
}
