//! Bulk import tests
//!
//! Tests for stock sheet imports including:
//! - Per-row success and failure counts
//! - Vaccines matched by commercial name or created on the fly
//! - Empty lots imported as out of stock

mod common;

use std::sync::Arc;

use common::{seeded_stores, state_with, FlakyStore};
use shared::InventoryLot;
use vims_server::services::import::ImportRow;

fn row(commercial: &str, lot_number: &str, expiration: &str, quantity: i32) -> ImportRow {
    ImportRow {
        commercial_name: commercial.to_string(),
        generic_name: "Generic".to_string(),
        lot_number: lot_number.to_string(),
        expiration_date: expiration.to_string(),
        quantity_on_hand: quantity,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[tokio::test]
    async fn test_import_counts_rows() {
        let stores = seeded_stores(vec![]);
        let state = state_with(stores.clone());

        let tally = state
            .importer()
            .import(vec![
                row("Fluzone Quadrivalent", "UJ842AA", "9/30/27", 120),
                row("Fluzone Quadrivalent", "", "9/30/27", 10),
                row("Fluzone Quadrivalent", "UJ842AB", "someday", 10),
                row("", "X1", "2027-01-01", 10),
            ])
            .await
            .unwrap();

        assert_eq!(tally.success, 1);
        assert_eq!(tally.failed, 3);
        assert!(tally.errors.contains(&"Missing lot number for Fluzone Quadrivalent".to_string()));
        assert!(tally
            .errors
            .contains(&"Invalid expiration date for Fluzone Quadrivalent: 'someday'".to_string()));
        assert!(tally.errors.contains(&"Commercial name is required".to_string()));

        let lots = stores.inventory.list_all().await.unwrap();
        assert_eq!(lots.len(), 1);
        assert_eq!(lots[0].vaccine_id, "VAX-002");
        assert_eq!(lots[0].quantity_on_hand, 120);
        assert_eq!(lots[0].expiration_date.to_string(), "2027-09-30");
    }

    /// Unknown names create one catalog entry, reused by later rows
    #[tokio::test]
    async fn test_import_creates_vaccine_once() {
        let stores = seeded_stores(vec![]);
        let state = state_with(stores.clone());

        let tally = state
            .importer()
            .import(vec![
                row("Shingrix", "SHX01", "2027-03-01", 30),
                row("SHINGRIX", "SHX02", "2027-04-01", 40),
            ])
            .await
            .unwrap();

        assert_eq!(tally.success, 2);
        let vaccines = stores.vaccines.list_all().await.unwrap();
        assert_eq!(vaccines.len(), 3);
        let created = &vaccines[2];
        assert_eq!(created.commercial_name, "Shingrix");
        assert_eq!(created.manufacturer_id, "MFR-TBD");

        let lots = stores.inventory.list_all().await.unwrap();
        assert!(lots.iter().all(|lot| lot.vaccine_id == created.vaccine_id));
    }

    #[tokio::test]
    async fn test_empty_lot_is_out_of_stock() {
        let stores = seeded_stores(vec![]);
        let state = state_with(stores.clone());

        state
            .importer()
            .import(vec![row("Fluzone Quadrivalent", "EMPTY1", "2027-01-01", 0)])
            .await
            .unwrap();

        let lots = stores.inventory.list_all().await.unwrap();
        assert_eq!(lots[0].status, "Out of Stock");
    }

    #[tokio::test]
    async fn test_negative_quantity_is_rejected() {
        let state = state_with(seeded_stores(vec![]));

        let tally = state
            .importer()
            .import(vec![row("Fluzone Quadrivalent", "NEG1", "2027-01-01", -4)])
            .await
            .unwrap();

        assert_eq!(tally.failed, 1);
        assert_eq!(tally.errors, vec!["Invalid quantity for Fluzone Quadrivalent".to_string()]);
    }

    /// A store failure fails the row, not the import
    #[tokio::test]
    async fn test_store_failure_is_counted() {
        let mut stores = seeded_stores(vec![]);
        stores.inventory = Arc::new(FlakyStore::<InventoryLot>::new(vec![]).failing_create(1));
        let state = state_with(stores.clone());

        let tally = state
            .importer()
            .import(vec![
                row("Fluzone Quadrivalent", "A1", "2027-01-01", 5),
                row("Fluzone Quadrivalent", "A2", "2027-01-01", 6),
            ])
            .await
            .unwrap();

        assert_eq!(tally.success, 1);
        assert_eq!(tally.failed, 1);
        assert_eq!(tally.errors, vec!["Failed to create inventory for Fluzone Quadrivalent".to_string()]);
        assert_eq!(stores.inventory.list_all().await.unwrap()[0].lot_number, "A2");
    }

    #[tokio::test]
    async fn test_import_refreshes_snapshot() {
        let state = state_with(seeded_stores(vec![]));
        assert!(state.loader.snapshot().await.unwrap().inventory.is_empty());

        state
            .importer()
            .import(vec![row("Fluzone Quadrivalent", "R1", "2027-01-01", 5)])
            .await
            .unwrap();

        assert_eq!(state.loader.snapshot().await.unwrap().inventory.len(), 1);
    }
}
