//! HTTP handlers for physical count reconciliation

use axum::{extract::State, Json};
use chrono::Utc;

use crate::error::AppResult;
use crate::services::reconciliation::{
    ReconciliationInput, ReconciliationOutcome, ReconciliationPreview,
};
use crate::AppState;

/// Sheet with every count seeded from the stored balance
pub async fn get_reconciliation_sheet(
    State(state): State<AppState>,
) -> AppResult<Json<ReconciliationPreview>> {
    let preview = state.reconciliation().seeded_preview(Utc::now()).await?;
    Ok(Json(preview))
}

/// Preview submitted counts without writing
pub async fn preview_reconciliation(
    State(state): State<AppState>,
    Json(input): Json<ReconciliationInput>,
) -> AppResult<Json<ReconciliationPreview>> {
    let preview = state
        .reconciliation()
        .preview(&input.physical_counts, Utc::now())
        .await?;
    Ok(Json(preview))
}

/// Commit submitted counts
pub async fn commit_reconciliation(
    State(state): State<AppState>,
    Json(input): Json<ReconciliationInput>,
) -> AppResult<Json<ReconciliationOutcome>> {
    let outcome = state.reconciliation().commit(input).await?;
    Ok(Json(outcome))
}
