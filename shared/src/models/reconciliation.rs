//! Physical count reconciliation records

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Immutable, Record};
use crate::validation::{require_non_negative, require_text, FieldErrors};

/// A recorded difference between the counted and the system quantity of a lot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationRecord {
    pub id: i64,
    pub reconciliation_id: String,
    /// References `InventoryLot::inventory_id`
    pub inventory_id: String,
    /// On-hand quantity before the adjustment
    pub system_quantity: i32,
    pub physical_quantity: i32,
    /// `physical_quantity - system_quantity`
    pub adjustment_quantity: i32,
    pub reconciliation_date: NaiveDate,
    pub performed_by: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewReconciliationRecord {
    pub reconciliation_id: String,
    pub inventory_id: String,
    pub system_quantity: i32,
    pub physical_quantity: i32,
    pub adjustment_quantity: i32,
    pub reconciliation_date: NaiveDate,
    pub performed_by: String,
}

impl Record for ReconciliationRecord {
    type Draft = NewReconciliationRecord;
    type Patch = Immutable;

    const COLLECTION: &'static str = "reconciliations";
    const RESOURCE: &'static str = "Reconciliation record";

    fn id(&self) -> i64 {
        self.id
    }

    fn from_draft(id: i64, draft: NewReconciliationRecord) -> Self {
        Self {
            id,
            reconciliation_id: draft.reconciliation_id,
            inventory_id: draft.inventory_id,
            system_quantity: draft.system_quantity,
            physical_quantity: draft.physical_quantity,
            adjustment_quantity: draft.adjustment_quantity,
            reconciliation_date: draft.reconciliation_date,
            performed_by: draft.performed_by,
        }
    }

    fn apply(&mut self, patch: Immutable) {
        match patch {}
    }

    fn validate_draft(draft: &NewReconciliationRecord) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        require_text(&mut errors, "inventoryId", &draft.inventory_id, "Inventory ID is required");
        require_non_negative(&mut errors, "physicalQuantity", draft.physical_quantity);
        if draft.adjustment_quantity != draft.physical_quantity - draft.system_quantity {
            errors.add(
                "adjustmentQuantity",
                "Adjustment must equal physical quantity minus system quantity",
            );
        }
        if draft.adjustment_quantity == 0 {
            errors.add("adjustmentQuantity", "Only discrepancies are recorded");
        }
        errors.into_result()
    }
}
