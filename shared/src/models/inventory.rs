//! Inventory lot models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Record;
use crate::validation::{require_non_negative, require_text, FieldErrors};

/// Stored label for newly received lots
pub const STATUS_LABEL_GOOD: &str = "Good";

/// Stored label for imported lots with no stock
pub const STATUS_LABEL_OUT_OF_STOCK: &str = "Out of Stock";

/// A received batch of one vaccine, tracked as a running dose balance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InventoryLot {
    pub id: i64,
    pub inventory_id: String,
    /// References `Vaccine::vaccine_id`
    pub vaccine_id: String,
    pub lot_number: String,
    pub expiration_date: NaiveDate,
    pub received_date: NaiveDate,
    pub quantity_received: i32,
    pub quantity_on_hand: i32,
    pub passing_inspection: i32,
    pub failed_inspection: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discrepancy_reason: Option<String>,
    /// Free-text label; the displayed status is derived, see `crate::status`
    pub status: String,
}

/// A lot before the store assigns its id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewInventoryLot {
    pub inventory_id: String,
    pub vaccine_id: String,
    pub lot_number: String,
    pub expiration_date: NaiveDate,
    pub received_date: NaiveDate,
    pub quantity_received: i32,
    pub quantity_on_hand: i32,
    pub passing_inspection: i32,
    pub failed_inspection: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discrepancy_reason: Option<String>,
    pub status: String,
}

/// Partial update of a lot
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InventoryPatch {
    pub quantity_on_hand: Option<i32>,
    pub status: Option<String>,
}

impl InventoryPatch {
    /// Patch that only sets the on-hand balance
    pub fn quantity_on_hand(quantity: i32) -> Self {
        Self {
            quantity_on_hand: Some(quantity),
            status: None,
        }
    }
}

impl Record for InventoryLot {
    type Draft = NewInventoryLot;
    type Patch = InventoryPatch;

    const COLLECTION: &'static str = "inventory";
    const RESOURCE: &'static str = "Inventory lot";

    fn id(&self) -> i64 {
        self.id
    }

    fn from_draft(id: i64, draft: NewInventoryLot) -> Self {
        Self {
            id,
            inventory_id: draft.inventory_id,
            vaccine_id: draft.vaccine_id,
            lot_number: draft.lot_number,
            expiration_date: draft.expiration_date,
            received_date: draft.received_date,
            quantity_received: draft.quantity_received,
            quantity_on_hand: draft.quantity_on_hand,
            passing_inspection: draft.passing_inspection,
            failed_inspection: draft.failed_inspection,
            discrepancy_reason: draft.discrepancy_reason,
            status: draft.status,
        }
    }

    fn apply(&mut self, patch: InventoryPatch) {
        if let Some(quantity) = patch.quantity_on_hand {
            self.quantity_on_hand = quantity;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
    }

    fn validate_draft(draft: &NewInventoryLot) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        require_text(&mut errors, "inventoryId", &draft.inventory_id, "Inventory ID is required");
        require_text(&mut errors, "vaccineId", &draft.vaccine_id, "Vaccine ID is required");
        require_text(&mut errors, "lotNumber", &draft.lot_number, "Lot number is required");
        require_non_negative(&mut errors, "quantityReceived", draft.quantity_received);
        require_non_negative(&mut errors, "quantityOnHand", draft.quantity_on_hand);
        require_non_negative(&mut errors, "passingInspection", draft.passing_inspection);
        require_non_negative(&mut errors, "failedInspection", draft.failed_inspection);

        let inspected = i64::from(draft.passing_inspection) + i64::from(draft.failed_inspection);
        if inspected != i64::from(draft.quantity_received) {
            errors.add(
                "passingInspection",
                "Passing + Failed inspection must equal quantity received",
            );
        }
        if draft.quantity_on_hand > draft.passing_inspection {
            errors.add(
                "quantityOnHand",
                "On-hand quantity cannot exceed doses that passed inspection",
            );
        }
        errors.into_result()
    }

    fn validate_patch(patch: &InventoryPatch) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if let Some(quantity) = patch.quantity_on_hand {
            require_non_negative(&mut errors, "quantityOnHand", quantity);
        }
        errors.into_result()
    }
}
