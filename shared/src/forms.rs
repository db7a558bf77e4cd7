//! Ledger form inputs and their validation
//!
//! Inputs arrive with every field optional, as a form would submit them.
//! `validate` either yields a fully typed value ready to be written or the
//! complete set of field errors.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{
    InventoryLot, LossReason, NewAdministrationRecord, NewInventoryLot, NewLossRecord,
    STATUS_LABEL_GOOD,
};
use crate::validation::{required, required_text, FieldErrors};

// ============================================================================
// Receive
// ============================================================================

/// A shipment as entered on the receiving form
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReceiveShipmentInput {
    pub vaccine_id: Option<String>,
    pub lot_number: Option<String>,
    pub expiration_date: Option<NaiveDate>,
    pub quantity_received: Option<i32>,
    pub passing_inspection: Option<i32>,
    pub failed_inspection: Option<i32>,
    pub discrepancy_reason: Option<String>,
}

/// A shipment that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidReceipt {
    pub vaccine_id: String,
    pub lot_number: String,
    pub expiration_date: NaiveDate,
    pub quantity_received: i32,
    pub passing_inspection: i32,
    pub failed_inspection: i32,
    pub discrepancy_reason: Option<String>,
}

impl ReceiveShipmentInput {
    pub fn validate(&self) -> Result<ValidReceipt, FieldErrors> {
        let mut errors = FieldErrors::new();

        let vaccine_id = required_text(
            &mut errors,
            "vaccineId",
            self.vaccine_id.as_deref(),
            "Vaccine selection is required",
        );
        let lot_number = required_text(
            &mut errors,
            "lotNumber",
            self.lot_number.as_deref(),
            "Lot number is required",
        );
        let expiration_date = required(
            &mut errors,
            "expirationDate",
            self.expiration_date,
            "Expiration date is required",
        );
        let received = required(
            &mut errors,
            "quantityReceived",
            self.quantity_received,
            "Quantity received is required",
        );
        let passing = required(
            &mut errors,
            "passingInspection",
            self.passing_inspection,
            "Passing inspection count is required",
        );
        let failed = required(
            &mut errors,
            "failedInspection",
            self.failed_inspection,
            "Failed inspection count is required",
        );

        if received.is_some_and(|q| q <= 0) {
            errors.add("quantityReceived", "Quantity received must be greater than zero");
        }
        if passing.is_some_and(|q| q < 0) {
            errors.add("passingInspection", "Quantity cannot be negative");
        }
        if failed.is_some_and(|q| q < 0) {
            errors.add("failedInspection", "Quantity cannot be negative");
        }

        let inspected = i64::from(passing.unwrap_or(0)) + i64::from(failed.unwrap_or(0));
        let total_matches = inspected == i64::from(received.unwrap_or(0));
        if !total_matches {
            let message = "Passing + Failed inspection must equal quantity received";
            errors.add("passingInspection", message);
            errors.add("failedInspection", message);
        }

        let discrepancy_reason = self
            .discrepancy_reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);
        if failed.unwrap_or(0) > 0 && discrepancy_reason.is_none() {
            errors.add(
                "discrepancyReason",
                "Discrepancy reason is required when there are failed inspections",
            );
        }

        match (vaccine_id, lot_number, expiration_date, received, passing, failed) {
            (Some(vaccine_id), Some(lot_number), Some(expiration_date), Some(received), Some(passing), Some(failed))
                if errors.is_empty() =>
            {
                Ok(ValidReceipt {
                    vaccine_id,
                    lot_number,
                    expiration_date,
                    quantity_received: received,
                    passing_inspection: passing,
                    failed_inspection: failed,
                    discrepancy_reason,
                })
            }
            _ => Err(errors),
        }
    }
}

impl ValidReceipt {
    /// The lot to create. Only doses that passed inspection enter on-hand stock.
    pub fn into_new_lot(self, inventory_id: String, received_date: NaiveDate) -> NewInventoryLot {
        NewInventoryLot {
            inventory_id,
            vaccine_id: self.vaccine_id,
            lot_number: self.lot_number,
            expiration_date: self.expiration_date,
            received_date,
            quantity_received: self.quantity_received,
            quantity_on_hand: self.passing_inspection,
            passing_inspection: self.passing_inspection,
            failed_inspection: self.failed_inspection,
            discrepancy_reason: self.discrepancy_reason,
            status: STATUS_LABEL_GOOD.to_string(),
        }
    }
}

// ============================================================================
// Report Loss
// ============================================================================

/// A loss as entered on the loss reporting form
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReportLossInput {
    /// Numeric id of the selected lot
    #[serde(alias = "inventoryId")]
    pub lot_id: Option<i64>,
    pub loss_quantity: Option<i32>,
    pub loss_reason: Option<String>,
    pub loss_details: Option<String>,
    pub training_completed: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidLoss {
    pub lot_id: i64,
    pub inventory_id: String,
    pub loss_quantity: i32,
    pub loss_reason: LossReason,
    pub loss_details: String,
    /// On-hand balance after the loss is applied
    pub remaining_on_hand: i32,
}

impl ReportLossInput {
    /// Validate against the selected lot as currently stored
    pub fn validate(&self, lot: Option<&InventoryLot>) -> Result<ValidLoss, FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.lot_id.is_none() {
            errors.add("inventoryId", "Please select an inventory lot");
        }
        let quantity = required(
            &mut errors,
            "lossQuantity",
            self.loss_quantity,
            "Loss quantity is required",
        );
        let reason_text = required_text(
            &mut errors,
            "lossReason",
            self.loss_reason.as_deref(),
            "Loss reason is required",
        );
        let details = required_text(
            &mut errors,
            "lossDetails",
            self.loss_details.as_deref(),
            "Loss details are required",
        );
        if self.training_completed != Some(true) {
            errors.add("trainingCompleted", "Training confirmation is required");
        }

        let reason = reason_text.and_then(|text| match text.parse::<LossReason>() {
            Ok(reason) => Some(reason),
            Err(err) => {
                errors.add("lossReason", err.to_string());
                None
            }
        });

        if let Some(q) = quantity {
            if q <= 0 {
                errors.set("lossQuantity", "Loss quantity must be greater than zero");
            } else if let Some(lot) = lot {
                if q > lot.quantity_on_hand {
                    errors.set(
                        "lossQuantity",
                        format!("Cannot exceed available quantity ({})", lot.quantity_on_hand),
                    );
                }
            }
        }

        match (lot, quantity, reason, details) {
            (Some(lot), Some(quantity), Some(reason), Some(details)) if errors.is_empty() => {
                Ok(ValidLoss {
                    lot_id: lot.id,
                    inventory_id: lot.inventory_id.clone(),
                    loss_quantity: quantity,
                    loss_reason: reason,
                    loss_details: details,
                    remaining_on_hand: lot.quantity_on_hand - quantity,
                })
            }
            _ => Err(errors),
        }
    }
}

impl ValidLoss {
    pub fn to_new_record(&self, loss_id: String, report_date: NaiveDate) -> NewLossRecord {
        NewLossRecord {
            loss_id,
            inventory_id: self.inventory_id.clone(),
            loss_quantity: self.loss_quantity,
            loss_reason: self.loss_reason,
            loss_details: self.loss_details.clone(),
            training_completed: true,
            report_date,
        }
    }
}

// ============================================================================
// Administer
// ============================================================================

/// Dose counts keyed by lot id
pub type DoseCounts = BTreeMap<i64, i32>;

/// Doses entered on the administration form
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdministerInput {
    pub doses: DoseCounts,
    pub administered_by: Option<String>,
}

/// One lot's validated administration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoseEntry {
    pub lot_id: i64,
    pub inventory_id: String,
    pub doses: i32,
    /// On-hand balance after the doses are applied
    pub remaining_on_hand: i32,
}

impl DoseEntry {
    pub fn to_new_record(
        &self,
        administration_id: String,
        administration_date: NaiveDate,
        administered_by: &str,
    ) -> NewAdministrationRecord {
        NewAdministrationRecord {
            administration_id,
            inventory_id: self.inventory_id.clone(),
            administered_doses: self.doses,
            administration_date,
            administered_by: administered_by.to_string(),
        }
    }
}

/// Lots doses can be administered from
pub fn eligible_lots(lots: &[InventoryLot]) -> Vec<&InventoryLot> {
    lots.iter().filter(|lot| lot.quantity_on_hand > 0).collect()
}

/// A zero entry for every eligible lot
pub fn seed_doses(lots: &[InventoryLot]) -> DoseCounts {
    eligible_lots(lots).into_iter().map(|lot| (lot.id, 0)).collect()
}

pub fn total_doses(doses: &DoseCounts) -> i64 {
    doses.values().map(|d| i64::from(*d)).sum()
}

impl AdministerInput {
    /// Validate every entry against current stock. Zero entries are skipped.
    /// The returned entries are in ascending lot id order.
    pub fn validate(&self, lots: &[InventoryLot]) -> Result<Vec<DoseEntry>, FieldErrors> {
        let mut errors = FieldErrors::new();
        let mut entries = Vec::new();

        for (lot_id, doses) in &self.doses {
            let field = format!("doses.{}", lot_id);
            let Some(lot) = lots.iter().find(|lot| lot.id == *lot_id) else {
                errors.add(field, "Unknown inventory lot");
                continue;
            };
            if *doses < 0 {
                errors.add(field, "Doses cannot be negative");
            } else if *doses == 0 {
                continue;
            } else if lot.quantity_on_hand <= 0 {
                errors.add(field, "No doses available in this lot");
            } else if *doses > lot.quantity_on_hand {
                errors.add(
                    field,
                    format!(
                        "Cannot administer more than {} doses available",
                        lot.quantity_on_hand
                    ),
                );
            } else {
                entries.push(DoseEntry {
                    lot_id: lot.id,
                    inventory_id: lot.inventory_id.clone(),
                    doses: *doses,
                    remaining_on_hand: lot.quantity_on_hand - doses,
                });
            }
        }

        if errors.is_empty() && entries.is_empty() {
            errors.add("doses", "No doses to record");
        }

        errors.into_result().map(|()| entries)
    }
}
