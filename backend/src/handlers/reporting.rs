//! HTTP handlers for the dashboard and reports

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use shared::{DashboardMetrics, DateRange, Report, ReportKind};

use crate::error::{AppError, AppResult};
use crate::AppState;

/// Dashboard totals and alerts
pub async fn get_dashboard(State(state): State<AppState>) -> AppResult<Json<DashboardMetrics>> {
    let metrics = state.reporting().dashboard(Utc::now()).await?;
    Ok(Json(metrics))
}

/// Generate a report (`?startDate=&endDate=` filter record dates)
pub async fn get_report(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(range): Query<DateRange>,
) -> AppResult<Json<Report>> {
    let kind: ReportKind = kind
        .parse()
        .map_err(|message: String| AppError::validation("kind", message))?;
    let report = state.reporting().report(kind, range, Utc::now()).await?;
    Ok(Json(report))
}
