//! In-process record store

use std::collections::BTreeMap;

use shared::Record;
use tokio::sync::RwLock;

use super::{not_found, RecordStore};
use crate::error::AppResult;

struct Collection<T> {
    next_id: i64,
    records: BTreeMap<i64, T>,
}

/// Records held in memory, ids assigned from a counter
pub struct MemoryStore<T> {
    collection: RwLock<Collection<T>>,
}

impl<T: Record> MemoryStore<T> {
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    /// Seed the collection; new ids continue after the largest seeded id
    pub fn with_records(records: Vec<T>) -> Self {
        let records: BTreeMap<i64, T> = records.into_iter().map(|r| (r.id(), r)).collect();
        let next_id = records.keys().next_back().map_or(1, |id| id + 1);
        Self {
            collection: RwLock::new(Collection { next_id, records }),
        }
    }
}

impl<T: Record> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[axum::async_trait]
impl<T: Record> RecordStore<T> for MemoryStore<T> {
    async fn list_all(&self) -> AppResult<Vec<T>> {
        let collection = self.collection.read().await;
        Ok(collection.records.values().cloned().collect())
    }

    async fn get_by_id(&self, id: i64) -> AppResult<T> {
        let collection = self.collection.read().await;
        collection
            .records
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found::<T>(id))
    }

    async fn create(&self, draft: T::Draft) -> AppResult<T> {
        T::validate_draft(&draft)?;

        let mut collection = self.collection.write().await;
        let id = collection.next_id;
        collection.next_id += 1;

        let record = T::from_draft(id, draft);
        collection.records.insert(id, record.clone());
        tracing::debug!(collection = T::COLLECTION, id, "Record created");
        Ok(record)
    }

    async fn update(&self, id: i64, patch: T::Patch) -> AppResult<T> {
        T::validate_patch(&patch)?;

        let mut collection = self.collection.write().await;
        let record = collection
            .records
            .get_mut(&id)
            .ok_or_else(|| not_found::<T>(id))?;
        record.apply(patch);
        tracing::debug!(collection = T::COLLECTION, id, "Record updated");
        Ok(record.clone())
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let mut collection = self.collection.write().await;
        collection
            .records
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found::<T>(id))
    }
}
