//! Dashboard metrics and summary reports

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{find_vaccine, AdministrationRecord, InventoryLot, LossReason, LossRecord, Vaccine};
use crate::status::{classify_status_with, days_until_expiration, StatusInfo, StatusThresholds};
use crate::types::DateRange;

const UNKNOWN_VACCINE: &str = "Unknown";

// ============================================================================
// Lot Predicates
// ============================================================================

/// Not yet expired, but within the expiring window
pub fn is_expiring_soon(lot: &InventoryLot, now: DateTime<Utc>, thresholds: &StatusThresholds) -> bool {
    let days = days_until_expiration(lot.expiration_date, now);
    days > 0 && days <= thresholds.expiring_within_days
}

pub fn is_expired(lot: &InventoryLot, now: DateTime<Utc>) -> bool {
    days_until_expiration(lot.expiration_date, now) <= 0
}

/// Some stock left, at or below the low stock threshold. Empty lots are out
/// of stock, not low.
pub fn is_low_stock(lot: &InventoryLot, thresholds: &StatusThresholds) -> bool {
    lot.quantity_on_hand > 0 && lot.quantity_on_hand <= thresholds.low_stock_threshold
}

// ============================================================================
// Dashboard
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Error,
    Warning,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DashboardAlert {
    pub level: AlertLevel,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub total_doses: i64,
    pub administered_doses: i64,
    pub expiring_soon: usize,
    pub expired: usize,
    pub low_stock: usize,
    pub alerts: Vec<DashboardAlert>,
}

fn plural(count: usize, suffix: &'static str) -> &'static str {
    if count > 1 {
        suffix
    } else {
        ""
    }
}

pub fn dashboard_metrics(
    inventory: &[InventoryLot],
    administrations: &[AdministrationRecord],
    now: DateTime<Utc>,
    thresholds: &StatusThresholds,
) -> DashboardMetrics {
    let total_doses = inventory.iter().map(|lot| i64::from(lot.quantity_on_hand)).sum();
    let administered_doses = administrations
        .iter()
        .map(|a| i64::from(a.administered_doses))
        .sum();
    let expiring_soon = inventory
        .iter()
        .filter(|lot| is_expiring_soon(lot, now, thresholds))
        .count();
    let expired = inventory.iter().filter(|lot| is_expired(lot, now)).count();
    let low_stock = inventory
        .iter()
        .filter(|lot| is_low_stock(lot, thresholds))
        .count();

    let mut alerts = Vec::new();
    if expired > 0 {
        alerts.push(DashboardAlert {
            level: AlertLevel::Error,
            message: format!(
                "{} vaccine lot{} have expired and need immediate attention",
                expired,
                plural(expired, "s")
            ),
        });
    }
    if expiring_soon > 0 {
        alerts.push(DashboardAlert {
            level: AlertLevel::Warning,
            message: format!(
                "{} vaccine lot{} will expire within {} days",
                expiring_soon,
                plural(expiring_soon, "s"),
                thresholds.expiring_within_days
            ),
        });
    }
    if low_stock > 0 {
        alerts.push(DashboardAlert {
            level: AlertLevel::Warning,
            message: format!(
                "{} vaccine{} are running low on stock",
                low_stock,
                plural(low_stock, "s")
            ),
        });
    }

    DashboardMetrics {
        total_doses,
        administered_doses,
        expiring_soon,
        expired,
        low_stock,
        alerts,
    }
}

// ============================================================================
// Reports
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    Inventory,
    Expiring,
    Expired,
    LowStock,
    Administration,
    Loss,
}

impl ReportKind {
    pub fn title(&self, thresholds: &StatusThresholds) -> String {
        match self {
            ReportKind::Inventory => "Current Inventory Report".to_string(),
            ReportKind::Expiring => format!(
                "Expiring Vaccines Report (Next {} Days)",
                thresholds.expiring_within_days
            ),
            ReportKind::Expired => "Expired Vaccines Report".to_string(),
            ReportKind::LowStock => "Low Stock Report".to_string(),
            ReportKind::Administration => "Administration Summary Report".to_string(),
            ReportKind::Loss => "Vaccine Loss Report".to_string(),
        }
    }
}

impl std::str::FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inventory" => Ok(ReportKind::Inventory),
            "expiring" => Ok(ReportKind::Expiring),
            "expired" => Ok(ReportKind::Expired),
            "low-stock" => Ok(ReportKind::LowStock),
            "administration" => Ok(ReportKind::Administration),
            "loss" => Ok(ReportKind::Loss),
            other => Err(format!("Invalid report type: {}", other)),
        }
    }
}

/// A lot with its vaccine names resolved and its derived status
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InventoryReportItem {
    #[serde(flatten)]
    pub lot: InventoryLot,
    pub vaccine_name: String,
    pub generic_name: String,
    pub status_info: StatusInfo,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LossReasonTotal {
    pub reason: LossReason,
    pub label: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ReportBody {
    Inventory {
        items: Vec<InventoryReportItem>,
    },
    Administration {
        items: Vec<AdministrationRecord>,
        #[serde(rename = "totalDoses")]
        total_doses: i64,
    },
    Loss {
        items: Vec<LossRecord>,
        #[serde(rename = "totalLoss")]
        total_loss: i64,
        #[serde(rename = "byReason")]
        by_reason: Vec<LossReasonTotal>,
    },
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub kind: ReportKind,
    pub title: String,
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub body: ReportBody,
}

impl Report {
    pub fn item_count(&self) -> usize {
        match &self.body {
            ReportBody::Inventory { items } => items.len(),
            ReportBody::Administration { items, .. } => items.len(),
            ReportBody::Loss { items, .. } => items.len(),
        }
    }
}

/// Collections a report is built from
#[derive(Debug, Clone, Copy)]
pub struct ReportSources<'a> {
    pub vaccines: &'a [Vaccine],
    pub inventory: &'a [InventoryLot],
    pub administrations: &'a [AdministrationRecord],
    pub losses: &'a [LossRecord],
}

fn inventory_items<'a>(
    lots: impl Iterator<Item = &'a InventoryLot>,
    vaccines: &[Vaccine],
    now: DateTime<Utc>,
    thresholds: &StatusThresholds,
) -> Vec<InventoryReportItem> {
    lots.map(|lot| {
        let vaccine = find_vaccine(vaccines, &lot.vaccine_id);
        InventoryReportItem {
            lot: lot.clone(),
            vaccine_name: vaccine
                .map(|v| v.commercial_name.clone())
                .unwrap_or_else(|| UNKNOWN_VACCINE.to_string()),
            generic_name: vaccine
                .map(|v| v.generic_name.clone())
                .unwrap_or_else(|| UNKNOWN_VACCINE.to_string()),
            status_info: classify_status_with(lot, now, thresholds),
        }
    })
    .collect()
}

fn loss_totals_by_reason(losses: &[LossRecord]) -> Vec<LossReasonTotal> {
    LossReason::ALL
        .into_iter()
        .filter_map(|reason| {
            let quantity: i64 = losses
                .iter()
                .filter(|loss| loss.loss_reason == reason)
                .map(|loss| i64::from(loss.loss_quantity))
                .sum();
            (quantity > 0).then(|| LossReasonTotal {
                reason,
                label: reason.label().to_string(),
                quantity,
            })
        })
        .collect()
}

/// Build a report. The date range applies to administration and loss records.
pub fn build_report(
    kind: ReportKind,
    sources: ReportSources<'_>,
    range: &DateRange,
    now: DateTime<Utc>,
    thresholds: &StatusThresholds,
) -> Report {
    let lots = sources.inventory.iter();
    let body = match kind {
        ReportKind::Inventory => ReportBody::Inventory {
            items: inventory_items(lots, sources.vaccines, now, thresholds),
        },
        ReportKind::Expiring => ReportBody::Inventory {
            items: inventory_items(
                lots.filter(|lot| is_expiring_soon(lot, now, thresholds)),
                sources.vaccines,
                now,
                thresholds,
            ),
        },
        ReportKind::Expired => ReportBody::Inventory {
            items: inventory_items(
                lots.filter(|lot| is_expired(lot, now)),
                sources.vaccines,
                now,
                thresholds,
            ),
        },
        ReportKind::LowStock => ReportBody::Inventory {
            items: inventory_items(
                lots.filter(|lot| is_low_stock(lot, thresholds)),
                sources.vaccines,
                now,
                thresholds,
            ),
        },
        ReportKind::Administration => {
            let items: Vec<AdministrationRecord> = sources
                .administrations
                .iter()
                .filter(|a| range.contains(a.administration_date))
                .cloned()
                .collect();
            let total_doses = items.iter().map(|a| i64::from(a.administered_doses)).sum();
            ReportBody::Administration { items, total_doses }
        }
        ReportKind::Loss => {
            let items: Vec<LossRecord> = sources
                .losses
                .iter()
                .filter(|loss| range.contains(loss.report_date))
                .cloned()
                .collect();
            let total_loss = items.iter().map(|loss| i64::from(loss.loss_quantity)).sum();
            let by_reason = loss_totals_by_reason(&items);
            ReportBody::Loss {
                items,
                total_loss,
                by_reason,
            }
        }
    };

    Report {
        kind,
        title: kind.title(thresholds),
        generated_at: now,
        body,
    }
}
