//! Dose administration records

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Immutable, Record};
use crate::validation::{require_positive, require_text, FieldErrors};

/// Doses administered from one lot on one day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdministrationRecord {
    pub id: i64,
    pub administration_id: String,
    /// References `InventoryLot::inventory_id`
    pub inventory_id: String,
    pub administered_doses: i32,
    pub administration_date: NaiveDate,
    pub administered_by: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewAdministrationRecord {
    pub administration_id: String,
    pub inventory_id: String,
    pub administered_doses: i32,
    pub administration_date: NaiveDate,
    pub administered_by: String,
}

impl Record for AdministrationRecord {
    type Draft = NewAdministrationRecord;
    type Patch = Immutable;

    const COLLECTION: &'static str = "administrations";
    const RESOURCE: &'static str = "Administration record";

    fn id(&self) -> i64 {
        self.id
    }

    fn from_draft(id: i64, draft: NewAdministrationRecord) -> Self {
        Self {
            id,
            administration_id: draft.administration_id,
            inventory_id: draft.inventory_id,
            administered_doses: draft.administered_doses,
            administration_date: draft.administration_date,
            administered_by: draft.administered_by,
        }
    }

    fn apply(&mut self, patch: Immutable) {
        match patch {}
    }

    fn validate_draft(draft: &NewAdministrationRecord) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        require_text(&mut errors, "inventoryId", &draft.inventory_id, "Inventory ID is required");
        require_positive(&mut errors, "administeredDoses", draft.administered_doses);
        errors.into_result()
    }
}
