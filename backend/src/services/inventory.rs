//! Inventory view: filtered, sorted lots with their derived status

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::{
    classify_status_with, filter_inventory_with, find_vaccine, InventoryLot, InventoryQuery,
    Record, StatusInfo, StatusThresholds, Vaccine,
};

use super::{InventorySnapshot, SnapshotLoader};
use crate::error::{AppError, AppResult};

/// A lot as displayed in the inventory table
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRow {
    #[serde(flatten)]
    pub lot: InventoryLot,
    pub vaccine_name: String,
    pub generic_name: String,
    pub vaccine_family: String,
    pub status_info: StatusInfo,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryView {
    pub items: Vec<InventoryRow>,
    /// Lots in the snapshot before filtering
    pub total: usize,
    pub generation: u64,
    pub loaded_at: DateTime<Utc>,
}

/// Snapshot metadata returned by a forced reload
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotSummary {
    pub generation: u64,
    pub loaded_at: DateTime<Utc>,
    pub vaccines: usize,
    pub lots: usize,
}

impl From<&InventorySnapshot> for SnapshotSummary {
    fn from(snapshot: &InventorySnapshot) -> Self {
        Self {
            generation: snapshot.generation,
            loaded_at: snapshot.loaded_at,
            vaccines: snapshot.vaccines.len(),
            lots: snapshot.inventory.len(),
        }
    }
}

#[derive(Clone)]
pub struct InventoryService {
    loader: Arc<SnapshotLoader>,
    thresholds: StatusThresholds,
}

impl InventoryService {
    pub fn new(loader: Arc<SnapshotLoader>, thresholds: StatusThresholds) -> Self {
        Self { loader, thresholds }
    }

    fn row(&self, lot: &InventoryLot, vaccines: &[Vaccine], now: DateTime<Utc>) -> InventoryRow {
        let (vaccine_name, generic_name, vaccine_family) = match find_vaccine(vaccines, &lot.vaccine_id) {
            Some(v) => (
                v.commercial_name.clone(),
                v.generic_name.clone(),
                v.vaccine_family.clone(),
            ),
            None => Default::default(),
        };
        InventoryRow {
            lot: lot.clone(),
            vaccine_name,
            generic_name,
            vaccine_family,
            status_info: classify_status_with(lot, now, &self.thresholds),
        }
    }

    /// Lots matching the query, in the requested order
    pub async fn list(&self, query: &InventoryQuery, now: DateTime<Utc>) -> AppResult<InventoryView> {
        let snapshot = self.loader.snapshot().await?;
        let items = filter_inventory_with(
            &snapshot.inventory,
            &snapshot.vaccines,
            query,
            now,
            &self.thresholds,
        )
        .into_iter()
        .map(|lot| self.row(lot, &snapshot.vaccines, now))
        .collect();

        Ok(InventoryView {
            items,
            total: snapshot.inventory.len(),
            generation: snapshot.generation,
            loaded_at: snapshot.loaded_at,
        })
    }

    /// One lot. A miss reloads the snapshot once before giving up.
    pub async fn get(&self, id: i64, now: DateTime<Utc>) -> AppResult<InventoryRow> {
        let snapshot = self.loader.snapshot().await?;
        if let Some(lot) = snapshot.inventory.iter().find(|lot| lot.id == id) {
            return Ok(self.row(lot, &snapshot.vaccines, now));
        }

        let snapshot = self.loader.reload().await?;
        snapshot
            .inventory
            .iter()
            .find(|lot| lot.id == id)
            .map(|lot| self.row(lot, &snapshot.vaccines, now))
            .ok_or_else(|| AppError::NotFound(format!("{} {}", InventoryLot::RESOURCE, id)))
    }

    pub async fn reload(&self) -> AppResult<SnapshotSummary> {
        let snapshot = self.loader.reload().await?;
        Ok(SnapshotSummary::from(snapshot.as_ref()))
    }
}
