//! Vaccine loss (wastage) records

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Immutable, Record};
use crate::validation::{require_positive, require_text, FieldErrors};

/// A reported loss of doses from one lot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LossRecord {
    pub id: i64,
    pub loss_id: String,
    /// References `InventoryLot::inventory_id`
    pub inventory_id: String,
    pub loss_quantity: i32,
    pub loss_reason: LossReason,
    pub loss_details: String,
    pub training_completed: bool,
    pub report_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewLossRecord {
    pub loss_id: String,
    pub inventory_id: String,
    pub loss_quantity: i32,
    pub loss_reason: LossReason,
    pub loss_details: String,
    pub training_completed: bool,
    pub report_date: NaiveDate,
}

/// Why doses were lost
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum LossReason {
    Expired,
    TemperatureExcursion,
    BrokenVial,
    Contamination,
    PowerOutage,
    EquipmentFailure,
    HumanError,
    Other,
}

impl LossReason {
    pub const ALL: [LossReason; 8] = [
        LossReason::Expired,
        LossReason::TemperatureExcursion,
        LossReason::BrokenVial,
        LossReason::Contamination,
        LossReason::PowerOutage,
        LossReason::EquipmentFailure,
        LossReason::HumanError,
        LossReason::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LossReason::Expired => "expired",
            LossReason::TemperatureExcursion => "temperature-excursion",
            LossReason::BrokenVial => "broken-vial",
            LossReason::Contamination => "contamination",
            LossReason::PowerOutage => "power-outage",
            LossReason::EquipmentFailure => "equipment-failure",
            LossReason::HumanError => "human-error",
            LossReason::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LossReason::Expired => "Expired",
            LossReason::TemperatureExcursion => "Temperature Excursion",
            LossReason::BrokenVial => "Broken Vial",
            LossReason::Contamination => "Contamination",
            LossReason::PowerOutage => "Power Outage",
            LossReason::EquipmentFailure => "Equipment Failure",
            LossReason::HumanError => "Human Error",
            LossReason::Other => "Other",
        }
    }
}

impl std::fmt::Display for LossReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown loss reason: {0}")]
pub struct UnknownLossReason(pub String);

impl std::str::FromStr for LossReason {
    type Err = UnknownLossReason;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LossReason::ALL
            .into_iter()
            .find(|reason| reason.as_str() == s)
            .ok_or_else(|| UnknownLossReason(s.to_string()))
    }
}

/// Select option for a loss reason
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LossReasonOption {
    pub value: LossReason,
    pub label: String,
}

/// All loss reasons with display labels, in presentation order
pub fn loss_reason_options() -> Vec<LossReasonOption> {
    LossReason::ALL
        .into_iter()
        .map(|reason| LossReasonOption {
            value: reason,
            label: reason.label().to_string(),
        })
        .collect()
}

impl Record for LossRecord {
    type Draft = NewLossRecord;
    type Patch = Immutable;

    const COLLECTION: &'static str = "losses";
    const RESOURCE: &'static str = "Vaccine loss record";

    fn id(&self) -> i64 {
        self.id
    }

    fn from_draft(id: i64, draft: NewLossRecord) -> Self {
        Self {
            id,
            loss_id: draft.loss_id,
            inventory_id: draft.inventory_id,
            loss_quantity: draft.loss_quantity,
            loss_reason: draft.loss_reason,
            loss_details: draft.loss_details,
            training_completed: draft.training_completed,
            report_date: draft.report_date,
        }
    }

    fn apply(&mut self, patch: Immutable) {
        match patch {}
    }

    fn validate_draft(draft: &NewLossRecord) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        require_text(&mut errors, "inventoryId", &draft.inventory_id, "Inventory ID is required");
        require_positive(&mut errors, "lossQuantity", draft.loss_quantity);
        require_text(&mut errors, "lossDetails", &draft.loss_details, "Loss details are required");
        if !draft.training_completed {
            errors.add("trainingCompleted", "Training confirmation is required");
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loss_reason_round_trips_through_str() {
        for reason in LossReason::ALL {
            assert_eq!(reason.as_str().parse::<LossReason>(), Ok(reason));
        }
    }

    #[test]
    fn test_loss_reason_serde_matches_as_str() {
        let json = serde_json::to_string(&LossReason::TemperatureExcursion).unwrap();
        assert_eq!(json, "\"temperature-excursion\"");
    }

    #[test]
    fn test_unknown_loss_reason() {
        let err = "stolen".parse::<LossReason>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown loss reason: stolen");
    }

    #[test]
    fn test_loss_reason_options_order() {
        let options = loss_reason_options();
        assert_eq!(options.len(), 8);
        assert_eq!(options[0].label, "Expired");
        assert_eq!(options[7].value, LossReason::Other);
    }
}
