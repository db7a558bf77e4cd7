//! Display status derivation for inventory lots
//!
//! Rules, first match wins:
//! 1. expired: expiration is today or earlier (days until expiration <= 0)
//! 2. expiring: expires within the expiring window (default 30 days)
//! 3. low-stock: on-hand at or below the low stock threshold (default 20)
//! 4. good

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::InventoryLot;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Derived display status of a lot
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum StatusKind {
    Expired,
    Expiring,
    LowStock,
    Good,
}

impl StatusKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusKind::Expired => "expired",
            StatusKind::Expiring => "expiring",
            StatusKind::LowStock => "low-stock",
            StatusKind::Good => "good",
        }
    }
}

impl std::fmt::Display for StatusKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status badge for a lot, computed on demand and never stored
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatusInfo {
    pub status: StatusKind,
    pub text: String,
    pub days_until_expiration: i64,
}

/// Classification thresholds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatusThresholds {
    /// Lots expiring within this many days are `expiring`
    pub expiring_within_days: i64,
    /// Lots with at most this many doses on hand are `low-stock`
    pub low_stock_threshold: i32,
}

impl Default for StatusThresholds {
    fn default() -> Self {
        Self {
            expiring_within_days: 30,
            low_stock_threshold: 20,
        }
    }
}

/// Whole days from `now` until the start (00:00 UTC) of `expiration_date`, rounded up
pub fn days_until_expiration(expiration_date: NaiveDate, now: DateTime<Utc>) -> i64 {
    let expires_at = expiration_date.and_time(chrono::NaiveTime::MIN).and_utc();
    let millis = (expires_at - now).num_milliseconds();

    // Integer division truncates toward zero, which is already the ceiling
    // for negative values.
    let days = millis / MILLIS_PER_DAY;
    if millis % MILLIS_PER_DAY > 0 {
        days + 1
    } else {
        days
    }
}

/// Classify a lot using the default thresholds
pub fn classify_status(lot: &InventoryLot, now: DateTime<Utc>) -> StatusInfo {
    classify_with(
        lot.expiration_date,
        lot.quantity_on_hand,
        now,
        &StatusThresholds::default(),
    )
}

/// Classify a lot using explicit thresholds
pub fn classify_status_with(
    lot: &InventoryLot,
    now: DateTime<Utc>,
    thresholds: &StatusThresholds,
) -> StatusInfo {
    classify_with(lot.expiration_date, lot.quantity_on_hand, now, thresholds)
}

/// Classify from the two inputs the rules depend on
pub fn classify_with(
    expiration_date: NaiveDate,
    quantity_on_hand: i32,
    now: DateTime<Utc>,
    thresholds: &StatusThresholds,
) -> StatusInfo {
    let days = days_until_expiration(expiration_date, now);

    let (status, text) = if days <= 0 {
        (StatusKind::Expired, "Expired".to_string())
    } else if days <= thresholds.expiring_within_days {
        (StatusKind::Expiring, format!("Expires in {} days", days))
    } else if quantity_on_hand <= thresholds.low_stock_threshold {
        (StatusKind::LowStock, "Low Stock".to_string())
    } else {
        (StatusKind::Good, "Good".to_string())
    };

    StatusInfo {
        status,
        text,
        days_until_expiration: days,
    }
}
