//! Quantity ledger: receiving shipments, administering doses, reporting losses
//!
//! Each operation validates the whole submission first; nothing is written
//! while any field error remains. Writes then go lot by lot: the record is
//! created, then the lot's on-hand balance is updated.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use shared::{
    eligible_lots, find_vaccine, generate_record_id, seed_doses, AdministerInput,
    AdministrationRecord, DoseCounts, InventoryLot, InventoryPatch, LossRecord,
    ReceiveShipmentInput, ReportLossInput,
};

use super::{BatchWriter, LedgerLock, SnapshotLoader};
use crate::error::{AppError, AppResult, WriteStage};
use crate::store::Stores;

/// Result of a successful administration submission
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdministrationOutcome {
    pub records: Vec<AdministrationRecord>,
    pub total_doses: i64,
}

/// Blank administration form: lots with stock and a zero entry for each
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdministrationSheet {
    pub lots: Vec<InventoryLot>,
    pub doses: DoseCounts,
}

#[derive(Clone)]
pub struct LedgerService {
    stores: Stores,
    loader: Arc<SnapshotLoader>,
    lock: LedgerLock,
    default_actor: String,
}

impl LedgerService {
    pub fn new(
        stores: Stores,
        loader: Arc<SnapshotLoader>,
        lock: LedgerLock,
        default_actor: impl Into<String>,
    ) -> Self {
        Self {
            stores,
            loader,
            lock,
            default_actor: default_actor.into(),
        }
    }

    pub async fn administrations(&self) -> AppResult<Vec<AdministrationRecord>> {
        self.stores.administrations.list_all().await
    }

    pub async fn administration_sheet(&self) -> AppResult<AdministrationSheet> {
        let lots = self.stores.inventory.list_all().await?;
        Ok(AdministrationSheet {
            doses: seed_doses(&lots),
            lots: eligible_lots(&lots).into_iter().cloned().collect(),
        })
    }

    pub async fn losses(&self) -> AppResult<Vec<LossRecord>> {
        self.stores.losses.list_all().await
    }

    /// Record a received shipment as a new lot
    pub async fn receive(&self, input: ReceiveShipmentInput) -> AppResult<InventoryLot> {
        let receipt = input.validate()?;

        let vaccines = self.stores.vaccines.list_all().await?;
        if find_vaccine(&vaccines, &receipt.vaccine_id).is_none() {
            return Err(AppError::validation("vaccineId", "Selected vaccine was not found"));
        }

        let today = Utc::now().date_naive();
        let draft = receipt.into_new_lot(generate_record_id("INV", today), today);
        let lot = self.stores.inventory.create(draft).await?;

        tracing::info!(
            lot_id = lot.id,
            inventory_id = %lot.inventory_id,
            quantity_on_hand = lot.quantity_on_hand,
            "Shipment received"
        );
        self.loader.refresh().await;
        Ok(lot)
    }

    /// Record doses given from one or more lots
    pub async fn administer(&self, input: AdministerInput) -> AppResult<AdministrationOutcome> {
        let guard = self.lock.lock().await;
        let lots = self.stores.inventory.list_all().await?;
        let entries = input.validate(&lots)?;

        let administered_by = input
            .administered_by
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(self.default_actor.as_str())
            .to_string();
        let today = Utc::now().date_naive();

        let mut batch = BatchWriter::new("administer");
        let mut records = Vec::with_capacity(entries.len());
        for entry in &entries {
            let draft = entry.to_new_record(generate_record_id("ADM", today), today, &administered_by);
            let record = match self.stores.administrations.create(draft).await {
                Ok(record) => record,
                Err(e) => {
                    batch.failed(entry.lot_id, &entry.inventory_id, WriteStage::Create, e);
                    continue;
                }
            };

            let patch = InventoryPatch::quantity_on_hand(entry.remaining_on_hand);
            match self.stores.inventory.update(entry.lot_id, patch).await {
                Ok(_) => {
                    batch.succeeded(entry.lot_id);
                    records.push(record);
                }
                Err(e) => batch.failed(entry.lot_id, &entry.inventory_id, WriteStage::Update, e),
            }
        }

        drop(guard);

        let result = batch.finish();
        self.loader.refresh().await;
        result?;

        let total_doses = records.iter().map(|r| i64::from(r.administered_doses)).sum();
        tracing::info!(lots = records.len(), total_doses, %administered_by, "Doses administered");
        Ok(AdministrationOutcome {
            records,
            total_doses,
        })
    }

    /// Record doses lost from a lot
    pub async fn report_loss(&self, input: ReportLossInput) -> AppResult<LossRecord> {
        let guard = self.lock.lock().await;
        let lot = match input.lot_id {
            Some(lot_id) => match self.stores.inventory.get_by_id(lot_id).await {
                Ok(lot) => Some(lot),
                Err(e) => {
                    drop(guard);
                    if e.is_not_found() {
                        self.loader.refresh().await;
                    }
                    return Err(e);
                }
            },
            None => None,
        };
        let loss = input.validate(lot.as_ref())?;

        let today = Utc::now().date_naive();
        let record = self
            .stores
            .losses
            .create(loss.to_new_record(generate_record_id("LOSS", today), today))
            .await?;

        let patch = InventoryPatch::quantity_on_hand(loss.remaining_on_hand);
        let updated = self.stores.inventory.update(loss.lot_id, patch).await;
        drop(guard);
        if let Err(e) = updated {
            let mut batch = BatchWriter::new("report-loss");
            batch.failed(loss.lot_id, &loss.inventory_id, WriteStage::Update, e);
            self.loader.refresh().await;
            batch.finish()?;
        }

        tracing::info!(
            lot_id = loss.lot_id,
            loss_quantity = loss.loss_quantity,
            reason = %loss.loss_reason,
            "Vaccine loss reported"
        );
        self.loader.refresh().await;
        Ok(record)
    }
}
