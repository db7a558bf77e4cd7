//! Vaccine catalog

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use shared::{generate_record_id, loss_reason_options, LossReasonOption, NewVaccine, Vaccine};

use super::SnapshotLoader;
use crate::error::{AppError, AppResult};
use crate::store::SharedStore;

/// Catalog entry as submitted; a missing `vaccineId` is generated
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVaccineInput {
    pub vaccine_id: Option<String>,
    pub commercial_name: String,
    #[serde(default)]
    pub generic_name: String,
    #[serde(default)]
    pub vaccine_family: String,
    #[serde(default)]
    pub manufacturer_id: String,
}

#[derive(Clone)]
pub struct CatalogService {
    vaccines: SharedStore<Vaccine>,
    loader: Arc<SnapshotLoader>,
}

impl CatalogService {
    pub fn new(vaccines: SharedStore<Vaccine>, loader: Arc<SnapshotLoader>) -> Self {
        Self { vaccines, loader }
    }

    pub async fn list(&self) -> AppResult<Vec<Vaccine>> {
        self.vaccines.list_all().await
    }

    pub async fn get(&self, id: i64) -> AppResult<Vaccine> {
        let result = self.vaccines.get_by_id(id).await;
        if matches!(&result, Err(e) if e.is_not_found()) {
            self.loader.refresh().await;
        }
        result
    }

    pub async fn create(&self, input: CreateVaccineInput) -> AppResult<Vaccine> {
        let existing = self.vaccines.list_all().await?;
        let vaccine_id = input
            .vaccine_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| generate_record_id("VAX", Utc::now().date_naive()));
        if existing.iter().any(|v| v.vaccine_id == vaccine_id) {
            return Err(AppError::validation("vaccineId", "Vaccine ID already exists"));
        }

        let vaccine = self
            .vaccines
            .create(NewVaccine {
                vaccine_id,
                commercial_name: input.commercial_name.trim().to_string(),
                generic_name: input.generic_name.trim().to_string(),
                vaccine_family: input.vaccine_family.trim().to_string(),
                manufacturer_id: input.manufacturer_id.trim().to_string(),
            })
            .await?;

        tracing::info!(vaccine_id = %vaccine.vaccine_id, "Vaccine added to catalog");
        self.loader.refresh().await;
        Ok(vaccine)
    }

    /// Loss reasons with their display labels
    pub fn loss_reasons(&self) -> Vec<LossReasonOption> {
        loss_reason_options()
    }
}
