//! Snapshot of the vaccine catalog and inventory shared by read paths
//!
//! Every load takes a generation ticket. Loads run concurrently and may
//! finish out of order; only the load holding the newest ticket publishes.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::{InventoryLot, Vaccine};
use tokio::sync::RwLock;

use crate::error::AppResult;
use crate::store::SharedStore;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySnapshot {
    pub vaccines: Vec<Vaccine>,
    pub inventory: Vec<InventoryLot>,
    pub generation: u64,
    pub loaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub enum LoadOutcome {
    Published(Arc<InventorySnapshot>),
    /// A newer load was started before this one finished; its result was dropped
    Superseded { generation: u64 },
}

pub struct SnapshotLoader {
    vaccines: SharedStore<Vaccine>,
    inventory: SharedStore<InventoryLot>,
    latest_ticket: AtomicU64,
    current: RwLock<Option<Arc<InventorySnapshot>>>,
}

impl SnapshotLoader {
    pub fn new(vaccines: SharedStore<Vaccine>, inventory: SharedStore<InventoryLot>) -> Self {
        Self {
            vaccines,
            inventory,
            latest_ticket: AtomicU64::new(0),
            current: RwLock::new(None),
        }
    }

    /// Fetch both collections and publish them unless a newer load started
    pub async fn load(&self) -> AppResult<LoadOutcome> {
        let generation = self.latest_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(generation, "Loading inventory snapshot");

        let (vaccines, inventory) =
            tokio::try_join!(self.vaccines.list_all(), self.inventory.list_all())?;

        let mut current = self.current.write().await;
        if self.latest_ticket.load(Ordering::SeqCst) != generation {
            tracing::debug!(generation, "Discarding superseded snapshot load");
            return Ok(LoadOutcome::Superseded { generation });
        }

        let snapshot = Arc::new(InventorySnapshot {
            vaccines,
            inventory,
            generation,
            loaded_at: Utc::now(),
        });
        *current = Some(snapshot.clone());
        tracing::info!(
            generation,
            vaccines = snapshot.vaccines.len(),
            lots = snapshot.inventory.len(),
            "Inventory snapshot published"
        );
        Ok(LoadOutcome::Published(snapshot))
    }

    /// Latest published snapshot, if any
    pub async fn current(&self) -> Option<Arc<InventorySnapshot>> {
        self.current.read().await.clone()
    }

    /// Latest snapshot, loading it on first use
    pub async fn snapshot(&self) -> AppResult<Arc<InventorySnapshot>> {
        match self.current().await {
            Some(snapshot) => Ok(snapshot),
            None => self.reload().await,
        }
    }

    /// Reload after a write. A failed reload leaves the previous snapshot in
    /// place; the write itself already succeeded.
    pub async fn refresh(&self) {
        if let Err(e) = self.reload().await {
            tracing::warn!("Snapshot reload after write failed: {}", e);
        }
    }

    /// Load again and return a snapshot at least as new as this request
    pub async fn reload(&self) -> AppResult<Arc<InventorySnapshot>> {
        loop {
            match self.load().await? {
                LoadOutcome::Published(snapshot) => return Ok(snapshot),
                LoadOutcome::Superseded { generation } => {
                    if let Some(snapshot) = self.current().await {
                        if snapshot.generation >= generation {
                            return Ok(snapshot);
                        }
                    }
                }
            }
        }
    }
}
