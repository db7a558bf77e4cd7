//! Physical count reconciliation

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{
    classify_status_with, generate_record_id, reconcile, seed_counts, validate_counts,
    InventoryLot, InventoryPatch, NewReconciliationRecord, PhysicalCounts, ReconciliationLine,
    ReconciliationRecord, StatusInfo, StatusThresholds,
};

use super::{BatchWriter, LedgerLock, SnapshotLoader};
use crate::error::{AppResult, WriteStage};
use crate::store::Stores;

/// Counts submitted from a physical stock take
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationInput {
    /// Lot id -> counted doses. Lots left out keep their on-hand quantity.
    #[serde(default)]
    pub physical_counts: PhysicalCounts,
    pub performed_by: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewLine {
    #[serde(flatten)]
    pub line: ReconciliationLine,
    pub lot_number: String,
    pub status_info: StatusInfo,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationPreview {
    pub lines: Vec<PreviewLine>,
    pub total_adjustments: i64,
    pub discrepancy_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum ReconciliationOutcome {
    NoDiscrepancies,
    #[serde(rename_all = "camelCase")]
    Committed {
        records: Vec<ReconciliationRecord>,
        total_adjustments: i64,
    },
}

#[derive(Clone)]
pub struct ReconciliationService {
    stores: Stores,
    loader: Arc<SnapshotLoader>,
    lock: LedgerLock,
    thresholds: StatusThresholds,
    default_actor: String,
}

impl ReconciliationService {
    pub fn new(
        stores: Stores,
        loader: Arc<SnapshotLoader>,
        lock: LedgerLock,
        thresholds: StatusThresholds,
        default_actor: impl Into<String>,
    ) -> Self {
        Self {
            stores,
            loader,
            lock,
            thresholds,
            default_actor: default_actor.into(),
        }
    }

    /// Compare submitted counts with the stored balances without writing
    pub async fn preview(&self, counts: &PhysicalCounts, now: DateTime<Utc>) -> AppResult<ReconciliationPreview> {
        let lots = self.stores.inventory.list_all().await?;
        validate_counts(&lots, counts)?;
        Ok(self.build_preview(&lots, counts, now))
    }

    /// Preview with every count seeded from the stored balance
    pub async fn seeded_preview(&self, now: DateTime<Utc>) -> AppResult<ReconciliationPreview> {
        let lots = self.stores.inventory.list_all().await?;
        Ok(self.build_preview(&lots, &seed_counts(&lots), now))
    }

    fn build_preview(&self, lots: &[InventoryLot], counts: &PhysicalCounts, now: DateTime<Utc>) -> ReconciliationPreview {
        let sheet = reconcile(lots, counts);
        let lines = sheet
            .lines
            .into_iter()
            .zip(lots)
            .map(|(line, lot)| PreviewLine {
                line,
                lot_number: lot.lot_number.clone(),
                status_info: classify_status_with(lot, now, &self.thresholds),
            })
            .collect();

        ReconciliationPreview {
            lines,
            total_adjustments: sheet.total_adjustments,
            discrepancy_count: sheet.discrepancy_count,
        }
    }

    /// Record every discrepancy and set each discrepant lot to its counted quantity
    pub async fn commit(&self, input: ReconciliationInput) -> AppResult<ReconciliationOutcome> {
        let guard = self.lock.lock().await;
        let lots = self.stores.inventory.list_all().await?;
        validate_counts(&lots, &input.physical_counts)?;

        let sheet = reconcile(&lots, &input.physical_counts);
        if sheet.discrepancy_count == 0 {
            tracing::info!("Reconciliation submitted with no discrepancies");
            return Ok(ReconciliationOutcome::NoDiscrepancies);
        }

        let performed_by = input
            .performed_by
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(self.default_actor.as_str())
            .to_string();
        let today = Utc::now().date_naive();

        let mut batch = BatchWriter::new("reconcile");
        let mut records = Vec::with_capacity(sheet.discrepancy_count);
        for line in sheet.discrepancies() {
            let draft = NewReconciliationRecord {
                reconciliation_id: generate_record_id("REC", today),
                inventory_id: line.inventory_id.clone(),
                system_quantity: line.system_quantity,
                physical_quantity: line.physical_quantity,
                adjustment_quantity: line.adjustment,
                reconciliation_date: today,
                performed_by: performed_by.clone(),
            };
            let record = match self.stores.reconciliations.create(draft).await {
                Ok(record) => record,
                Err(e) => {
                    batch.failed(line.lot_id, &line.inventory_id, WriteStage::Create, e);
                    continue;
                }
            };

            let patch = InventoryPatch::quantity_on_hand(line.physical_quantity);
            match self.stores.inventory.update(line.lot_id, patch).await {
                Ok(_) => {
                    batch.succeeded(line.lot_id);
                    records.push(record);
                }
                Err(e) => batch.failed(line.lot_id, &line.inventory_id, WriteStage::Update, e),
            }
        }

        drop(guard);

        let result = batch.finish();
        self.loader.refresh().await;
        result?;

        tracing::info!(
            lots = records.len(),
            total_adjustments = sheet.total_adjustments,
            %performed_by,
            "Reconciliation committed"
        );
        Ok(ReconciliationOutcome::Committed {
            records,
            total_adjustments: sheet.total_adjustments,
        })
    }
}
