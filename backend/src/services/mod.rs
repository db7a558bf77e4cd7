//! Business logic services for the Vaccine Inventory Management Platform

pub mod catalog;
pub mod import;
pub mod inventory;
pub mod ledger;
pub mod loader;
pub mod reconciliation;
pub mod reporting;

pub use catalog::CatalogService;
pub use import::ImportService;
pub use inventory::InventoryService;
pub use ledger::LedgerService;
pub use loader::{InventorySnapshot, LoadOutcome, SnapshotLoader};
pub use reconciliation::ReconciliationService;
pub use reporting::ReportingService;

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::{AppError, AppResult, BatchReport, LotFailure, WriteStage};

/// Serialises read-validate-write sequences on lot balances.
///
/// Administration, loss reports and reconciliation commits hold it from the
/// balance read until the last lot update, so two submissions can never both
/// validate against the same on-hand quantity.
pub type LedgerLock = Arc<Mutex<()>>;

/// Collects per-lot outcomes of a create-then-update sequence.
///
/// A lot failure does not stop the batch. `finish` turns the outcomes into
/// the caller's result: everything written is `Ok`, nothing written is the
/// first lot's error as it was raised, anything in between is `PartialWrite`.
pub(crate) struct BatchWriter {
    report: BatchReport,
    first_error: Option<AppError>,
}

impl BatchWriter {
    pub(crate) fn new(operation: &str) -> Self {
        Self {
            report: BatchReport::new(operation),
            first_error: None,
        }
    }

    pub(crate) fn succeeded(&mut self, lot_id: i64) {
        self.report.succeeded.push(lot_id);
    }

    pub(crate) fn failed(&mut self, lot_id: i64, inventory_id: &str, stage: WriteStage, error: AppError) {
        tracing::warn!(
            operation = %self.report.operation,
            lot_id,
            ?stage,
            "Lot write failed: {}",
            error
        );
        self.report.failed.push(LotFailure {
            lot_id,
            inventory_id: inventory_id.to_string(),
            stage,
            message: error.to_string(),
        });
        self.first_error.get_or_insert(error);
    }

    pub(crate) fn finish(self) -> AppResult<BatchReport> {
        match self.first_error {
            None => Ok(self.report),
            Some(error) if !self.report.wrote_anything() => Err(error),
            Some(_) => Err(AppError::PartialWrite(self.report)),
        }
    }
}
