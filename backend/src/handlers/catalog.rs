//! HTTP handlers for the vaccine catalog

use axum::{
    extract::{Path, State},
    Json,
};
use shared::{LossReasonOption, Vaccine};

use crate::error::AppResult;
use crate::services::catalog::CreateVaccineInput;
use crate::AppState;

/// List the catalog
pub async fn list_vaccines(State(state): State<AppState>) -> AppResult<Json<Vec<Vaccine>>> {
    let vaccines = state.catalog().list().await?;
    Ok(Json(vaccines))
}

/// Get one vaccine
pub async fn get_vaccine(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vaccine>> {
    let vaccine = state.catalog().get(id).await?;
    Ok(Json(vaccine))
}

/// Add a vaccine to the catalog
pub async fn create_vaccine(
    State(state): State<AppState>,
    Json(input): Json<CreateVaccineInput>,
) -> AppResult<Json<Vaccine>> {
    let vaccine = state.catalog().create(input).await?;
    Ok(Json(vaccine))
}

/// Loss reasons with display labels
pub async fn list_loss_reasons(State(state): State<AppState>) -> Json<Vec<LossReasonOption>> {
    Json(state.catalog().loss_reasons())
}
