//! Bulk import of inventory rows from a stock sheet
//!
//! Each row names its vaccine by commercial name. Unknown vaccines are added
//! to the catalog on the fly. A failing row is counted and reported; the
//! remaining rows are still processed.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use shared::{
    generate_record_id, BatchTally, NewInventoryLot, NewVaccine, Vaccine, STATUS_LABEL_GOOD,
    STATUS_LABEL_OUT_OF_STOCK,
};

use super::SnapshotLoader;
use crate::error::AppResult;
use crate::store::Stores;

/// Manufacturer recorded for vaccines created by an import
const UNKNOWN_MANUFACTURER: &str = "MFR-TBD";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRow {
    pub commercial_name: String,
    #[serde(default)]
    pub generic_name: String,
    #[serde(default)]
    pub lot_number: String,
    /// `M/D/YY`, `M/D/YYYY` or `YYYY-MM-DD`
    #[serde(default)]
    pub expiration_date: String,
    #[serde(default)]
    pub quantity_on_hand: i32,
}

/// Parse the date formats found in stock sheets. Two-digit years are 20YY.
pub fn parse_import_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }

    let mut parts = value.split('/');
    let (month, day, year) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    let month: u32 = month.trim().parse().ok()?;
    let day: u32 = day.trim().parse().ok()?;
    let year = year.trim();
    let year: i32 = match year.len() {
        2 => 2000 + year.parse::<i32>().ok()?,
        4 => year.parse().ok()?,
        _ => return None,
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

#[derive(Clone)]
pub struct ImportService {
    stores: Stores,
    loader: Arc<SnapshotLoader>,
}

impl ImportService {
    pub fn new(stores: Stores, loader: Arc<SnapshotLoader>) -> Self {
        Self { stores, loader }
    }

    pub async fn import(&self, rows: Vec<ImportRow>) -> AppResult<BatchTally> {
        let mut vaccines = self.stores.vaccines.list_all().await?;
        let today = Utc::now().date_naive();
        let mut tally = BatchTally::default();

        for row in &rows {
            let name = row.commercial_name.trim();
            if name.is_empty() {
                tally.record_failure("Commercial name is required");
                continue;
            }
            if row.lot_number.trim().is_empty() {
                tally.record_failure(format!("Missing lot number for {}", name));
                continue;
            }
            let Some(expiration_date) = parse_import_date(&row.expiration_date) else {
                tally.record_failure(format!(
                    "Invalid expiration date for {}: '{}'",
                    name, row.expiration_date
                ));
                continue;
            };
            if row.quantity_on_hand < 0 {
                tally.record_failure(format!("Invalid quantity for {}", name));
                continue;
            }

            let vaccine_id = match self.find_or_create_vaccine(&mut vaccines, row, today).await {
                Ok(vaccine_id) => vaccine_id,
                Err(e) => {
                    tracing::warn!(commercial_name = name, "Vaccine lookup failed: {}", e);
                    tally.record_failure(format!("Failed to create/find vaccine for {}", name));
                    continue;
                }
            };

            let quantity = row.quantity_on_hand;
            let draft = NewInventoryLot {
                inventory_id: generate_record_id("INV", today),
                vaccine_id,
                lot_number: row.lot_number.trim().to_string(),
                expiration_date,
                received_date: today,
                quantity_received: quantity,
                quantity_on_hand: quantity,
                passing_inspection: quantity,
                failed_inspection: 0,
                discrepancy_reason: None,
                status: if quantity == 0 {
                    STATUS_LABEL_OUT_OF_STOCK.to_string()
                } else {
                    STATUS_LABEL_GOOD.to_string()
                },
            };
            match self.stores.inventory.create(draft).await {
                Ok(_) => tally.record_success(),
                Err(e) => {
                    tracing::warn!(commercial_name = name, "Inventory create failed: {}", e);
                    tally.record_failure(format!("Failed to create inventory for {}", name));
                }
            }
        }

        tracing::info!(
            rows = rows.len(),
            success = tally.success,
            failed = tally.failed,
            "Bulk import finished"
        );
        if tally.success > 0 {
            self.loader.refresh().await;
        }
        Ok(tally)
    }

    /// Catalog identity of the row's vaccine, matched by commercial name
    /// ignoring case
    async fn find_or_create_vaccine(
        &self,
        vaccines: &mut Vec<Vaccine>,
        row: &ImportRow,
        today: NaiveDate,
    ) -> AppResult<String> {
        let name = row.commercial_name.trim();
        if let Some(existing) = vaccines
            .iter()
            .find(|v| v.commercial_name.to_lowercase() == name.to_lowercase())
        {
            return Ok(existing.vaccine_id.clone());
        }

        let generic_name = row.generic_name.trim().to_string();
        let vaccine = self
            .stores
            .vaccines
            .create(NewVaccine {
                vaccine_id: generate_record_id("VAX", today),
                commercial_name: name.to_string(),
                vaccine_family: generic_name.clone(),
                generic_name,
                manufacturer_id: UNKNOWN_MANUFACTURER.to_string(),
            })
            .await?;
        tracing::debug!(vaccine_id = %vaccine.vaccine_id, commercial_name = name, "Vaccine created by import");

        let vaccine_id = vaccine.vaccine_id.clone();
        vaccines.push(vaccine);
        Ok(vaccine_id)
    }
}
