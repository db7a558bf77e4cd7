//! Vaccine catalog models

use serde::{Deserialize, Serialize};

use super::{Immutable, Record};
use crate::validation::{require_text, FieldErrors};

/// A vaccine product in the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Vaccine {
    pub id: i64,
    /// Catalog identity referenced by inventory lots (e.g., "VAX-001")
    pub vaccine_id: String,
    pub commercial_name: String,
    pub generic_name: String,
    pub vaccine_family: String,
    pub manufacturer_id: String,
}

/// A catalog entry before the store assigns its id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewVaccine {
    pub vaccine_id: String,
    pub commercial_name: String,
    pub generic_name: String,
    pub vaccine_family: String,
    pub manufacturer_id: String,
}

impl Record for Vaccine {
    type Draft = NewVaccine;
    type Patch = Immutable;

    const COLLECTION: &'static str = "vaccines";
    const RESOURCE: &'static str = "Vaccine";

    fn id(&self) -> i64 {
        self.id
    }

    fn from_draft(id: i64, draft: NewVaccine) -> Self {
        Self {
            id,
            vaccine_id: draft.vaccine_id,
            commercial_name: draft.commercial_name,
            generic_name: draft.generic_name,
            vaccine_family: draft.vaccine_family,
            manufacturer_id: draft.manufacturer_id,
        }
    }

    fn apply(&mut self, patch: Immutable) {
        match patch {}
    }

    fn validate_draft(draft: &NewVaccine) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        require_text(&mut errors, "vaccineId", &draft.vaccine_id, "Vaccine ID is required");
        require_text(
            &mut errors,
            "commercialName",
            &draft.commercial_name,
            "Commercial name is required",
        );
        errors.into_result()
    }
}

/// Find a vaccine by its catalog identity
pub fn find_vaccine<'a>(vaccines: &'a [Vaccine], vaccine_id: &str) -> Option<&'a Vaccine> {
    vaccines.iter().find(|v| v.vaccine_id == vaccine_id)
}
