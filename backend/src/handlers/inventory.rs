//! HTTP handlers for inventory endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use shared::{
    AdvancedFilters, BatchTally, InventoryLot, InventoryQuery, ReceiveShipmentInput,
    SortDirection, SortField, StatusFilter, TextMatch,
};

use crate::error::AppResult;
use crate::services::import::ImportRow;
use crate::services::inventory::{InventoryRow, InventoryView, SnapshotSummary};
use crate::AppState;

/// How the vaccine family filter compares
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FamilyMatchMode {
    #[default]
    Exact,
    Contains,
}

/// Inventory view query string
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryParams {
    pub search: Option<String>,
    #[serde(default)]
    pub status: StatusFilter,
    pub vaccine_family: Option<String>,
    #[serde(default)]
    pub vaccine_family_mode: FamilyMatchMode,
    pub vaccine_name: Option<String>,
    pub lot_number: Option<String>,
    pub expiration_from: Option<NaiveDate>,
    pub expiration_to: Option<NaiveDate>,
    pub quantity_min: Option<i32>,
    pub quantity_max: Option<i32>,
    #[serde(default)]
    pub sort_field: SortField,
    #[serde(default)]
    pub sort_direction: SortDirection,
}

impl From<InventoryParams> for InventoryQuery {
    fn from(params: InventoryParams) -> Self {
        let vaccine_family = params
            .vaccine_family
            .filter(|family| !family.trim().is_empty())
            .map(|family| match params.vaccine_family_mode {
                FamilyMatchMode::Exact => TextMatch::Exact(family),
                FamilyMatchMode::Contains => TextMatch::Contains(family),
            });

        InventoryQuery {
            search: params.search,
            status: params.status,
            filters: AdvancedFilters {
                vaccine_family,
                vaccine_name: params.vaccine_name,
                lot_number: params.lot_number,
                expiration_from: params.expiration_from,
                expiration_to: params.expiration_to,
                quantity_min: params.quantity_min,
                quantity_max: params.quantity_max,
            },
            sort_field: params.sort_field,
            sort_direction: params.sort_direction,
        }
    }
}

/// Filtered and sorted inventory with derived status
pub async fn list_inventory(
    State(state): State<AppState>,
    Query(params): Query<InventoryParams>,
) -> AppResult<Json<InventoryView>> {
    let query = InventoryQuery::from(params);
    let view = state.inventory().list(&query, Utc::now()).await?;
    Ok(Json(view))
}

/// Get one lot with its derived status
pub async fn get_inventory_lot(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<InventoryRow>> {
    let row = state.inventory().get(id, Utc::now()).await?;
    Ok(Json(row))
}

/// Force a snapshot reload
pub async fn reload_inventory(State(state): State<AppState>) -> AppResult<Json<SnapshotSummary>> {
    let summary = state.inventory().reload().await?;
    Ok(Json(summary))
}

/// Receive a shipment into a new lot
pub async fn receive_shipment(
    State(state): State<AppState>,
    Json(input): Json<ReceiveShipmentInput>,
) -> AppResult<Json<InventoryLot>> {
    let lot = state.ledger().receive(input).await?;
    Ok(Json(lot))
}

/// Import stock sheet rows
pub async fn import_inventory(
    State(state): State<AppState>,
    Json(rows): Json<Vec<ImportRow>>,
) -> AppResult<Json<BatchTally>> {
    let tally = state.importer().import(rows).await?;
    Ok(Json(tally))
}
