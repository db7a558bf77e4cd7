//! Physical count reconciliation arithmetic
//!
//! `adjustment = physical count - on-hand`. Total adjustments is the sum of
//! absolute adjustments (magnitude of change, not a net figure).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::InventoryLot;
use crate::validation::FieldErrors;

/// Physical counts keyed by lot id
pub type PhysicalCounts = BTreeMap<i64, i32>;

/// One lot's comparison of counted and recorded quantity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationLine {
    pub lot_id: i64,
    pub inventory_id: String,
    pub system_quantity: i32,
    pub physical_quantity: i32,
    pub adjustment: i32,
}

impl ReconciliationLine {
    pub fn is_discrepancy(&self) -> bool {
        self.adjustment != 0
    }
}

/// Every lot's line plus the aggregate figures
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationSheet {
    pub lines: Vec<ReconciliationLine>,
    pub total_adjustments: i64,
    pub discrepancy_count: usize,
}

impl ReconciliationSheet {
    /// Lines with a non-zero adjustment, in collection order
    pub fn discrepancies(&self) -> impl Iterator<Item = &ReconciliationLine> {
        self.lines.iter().filter(|line| line.is_discrepancy())
    }
}

/// Counts seeded with each lot's current on-hand quantity
pub fn seed_counts(lots: &[InventoryLot]) -> PhysicalCounts {
    lots.iter().map(|lot| (lot.id, lot.quantity_on_hand)).collect()
}

/// Reject negative counts and counts for lots that are not in the collection
pub fn validate_counts(lots: &[InventoryLot], counts: &PhysicalCounts) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    for (lot_id, count) in counts {
        let field = format!("physicalCounts.{}", lot_id);
        if !lots.iter().any(|lot| lot.id == *lot_id) {
            errors.add(field, "Unknown inventory lot");
        } else if *count < 0 {
            errors.add(field, "Physical count cannot be negative");
        }
    }
    errors.into_result()
}

/// Signed adjustment for one lot. Lots without a submitted count keep their
/// seeded value, which is their on-hand quantity.
pub fn adjustment_for(lot: &InventoryLot, counts: &PhysicalCounts) -> i32 {
    physical_count(lot, counts) - lot.quantity_on_hand
}

fn physical_count(lot: &InventoryLot, counts: &PhysicalCounts) -> i32 {
    counts.get(&lot.id).copied().unwrap_or(lot.quantity_on_hand)
}

/// Build the sheet for every lot, in collection order
pub fn reconcile(lots: &[InventoryLot], counts: &PhysicalCounts) -> ReconciliationSheet {
    let lines: Vec<ReconciliationLine> = lots
        .iter()
        .map(|lot| {
            let physical_quantity = physical_count(lot, counts);
            ReconciliationLine {
                lot_id: lot.id,
                inventory_id: lot.inventory_id.clone(),
                system_quantity: lot.quantity_on_hand,
                physical_quantity,
                adjustment: physical_quantity - lot.quantity_on_hand,
            }
        })
        .collect();

    let total_adjustments = lines
        .iter()
        .map(|line| i64::from(line.adjustment).abs())
        .sum();
    let discrepancy_count = lines.iter().filter(|line| line.is_discrepancy()).count();

    ReconciliationSheet {
        lines,
        total_adjustments,
        discrepancy_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn lot(id: i64, on_hand: i32) -> InventoryLot {
        InventoryLot {
            id,
            inventory_id: format!("INV-{:03}", id),
            vaccine_id: "VAX-001".to_string(),
            lot_number: format!("LOT{}", id),
            expiration_date: NaiveDate::from_ymd_opt(2027, 6, 30).unwrap(),
            received_date: NaiveDate::from_ymd_opt(2026, 6, 30).unwrap(),
            quantity_received: 100,
            quantity_on_hand: on_hand,
            passing_inspection: 100,
            failed_inspection: 0,
            discrepancy_reason: None,
            status: "Good".to_string(),
        }
    }

    #[test]
    fn test_seeded_counts_have_no_discrepancies() {
        let lots = vec![lot(1, 50), lot(2, 0), lot(3, 75)];
        let sheet = reconcile(&lots, &seed_counts(&lots));
        assert_eq!(sheet.discrepancy_count, 0);
        assert_eq!(sheet.total_adjustments, 0);
        assert_eq!(sheet.discrepancies().count(), 0);
    }

    #[test]
    fn test_adjustment_sign_and_magnitude_total() {
        let lots = vec![lot(1, 50), lot(2, 10), lot(3, 75)];
        let counts = PhysicalCounts::from([(1, 45), (2, 13)]);

        assert_eq!(adjustment_for(&lots[0], &counts), -5);
        assert_eq!(adjustment_for(&lots[1], &counts), 3);
        assert_eq!(adjustment_for(&lots[2], &counts), 0);

        let sheet = reconcile(&lots, &counts);
        assert_eq!(sheet.total_adjustments, 8);
        assert_eq!(sheet.discrepancy_count, 2);
        let discrepant: Vec<i64> = sheet.discrepancies().map(|l| l.lot_id).collect();
        assert_eq!(discrepant, vec![1, 2]);
        assert_eq!(sheet.lines[0].system_quantity, 50);
        assert_eq!(sheet.lines[0].physical_quantity, 45);
    }

    #[test]
    fn test_validate_counts() {
        let lots = vec![lot(1, 50)];
        assert!(validate_counts(&lots, &PhysicalCounts::from([(1, 0)])).is_ok());

        let errors = validate_counts(&lots, &PhysicalCounts::from([(1, -1), (9, 4)])).unwrap_err();
        assert_eq!(errors.get("physicalCounts.1"), Some("Physical count cannot be negative"));
        assert_eq!(errors.get("physicalCounts.9"), Some("Unknown inventory lot"));
    }
}
