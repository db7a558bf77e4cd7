//! Dashboard metrics and summary reports

use std::sync::Arc;

use chrono::{DateTime, Utc};
use shared::{
    build_report, dashboard_metrics, DashboardMetrics, DateRange, Report, ReportKind,
    ReportSources, StatusThresholds,
};

use super::SnapshotLoader;
use crate::error::{AppError, AppResult};
use crate::store::Stores;

#[derive(Clone)]
pub struct ReportingService {
    stores: Stores,
    loader: Arc<SnapshotLoader>,
    thresholds: StatusThresholds,
}

impl ReportingService {
    pub fn new(stores: Stores, loader: Arc<SnapshotLoader>, thresholds: StatusThresholds) -> Self {
        Self {
            stores,
            loader,
            thresholds,
        }
    }

    pub async fn dashboard(&self, now: DateTime<Utc>) -> AppResult<DashboardMetrics> {
        let (snapshot, administrations) = tokio::try_join!(
            self.loader.snapshot(),
            self.stores.administrations.list_all()
        )?;

        Ok(dashboard_metrics(
            &snapshot.inventory,
            &administrations,
            now,
            &self.thresholds,
        ))
    }

    pub async fn report(&self, kind: ReportKind, range: DateRange, now: DateTime<Utc>) -> AppResult<Report> {
        if let (Some(start), Some(end)) = (range.start_date, range.end_date) {
            if start > end {
                return Err(AppError::validation("endDate", "End date must be on or after start date"));
            }
        }

        let (snapshot, administrations, losses) = tokio::try_join!(
            self.loader.snapshot(),
            self.stores.administrations.list_all(),
            self.stores.losses.list_all()
        )?;

        let report = build_report(
            kind,
            ReportSources {
                vaccines: &snapshot.vaccines,
                inventory: &snapshot.inventory,
                administrations: &administrations,
                losses: &losses,
            },
            &range,
            now,
            &self.thresholds,
        );

        tracing::info!(?kind, items = report.item_count(), "Report generated");
        Ok(report)
    }
}
