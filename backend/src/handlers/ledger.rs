//! HTTP handlers for dose administration and loss reporting

use axum::{extract::State, Json};
use shared::{AdministerInput, AdministrationRecord, LossRecord, ReportLossInput};

use crate::error::AppResult;
use crate::services::ledger::{AdministrationOutcome, AdministrationSheet};
use crate::AppState;

/// Record administered doses
pub async fn administer_doses(
    State(state): State<AppState>,
    Json(input): Json<AdministerInput>,
) -> AppResult<Json<AdministrationOutcome>> {
    let outcome = state.ledger().administer(input).await?;
    Ok(Json(outcome))
}

/// List administration records
pub async fn list_administrations(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<AdministrationRecord>>> {
    let records = state.ledger().administrations().await?;
    Ok(Json(records))
}

/// Lots available for administration, each seeded with zero doses
pub async fn get_administration_sheet(
    State(state): State<AppState>,
) -> AppResult<Json<AdministrationSheet>> {
    let sheet = state.ledger().administration_sheet().await?;
    Ok(Json(sheet))
}

/// Report a vaccine loss
pub async fn report_loss(
    State(state): State<AppState>,
    Json(input): Json<ReportLossInput>,
) -> AppResult<Json<LossRecord>> {
    let record = state.ledger().report_loss(input).await?;
    Ok(Json(record))
}

/// List loss records
pub async fn list_losses(State(state): State<AppState>) -> AppResult<Json<Vec<LossRecord>>> {
    let records = state.ledger().losses().await?;
    Ok(Json(records))
}
