//! Inventory search, filtering and sorting
//!
//! Produces a new ordered view over already-loaded lots. Inputs are never
//! mutated and every active predicate must hold (logical AND).

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{find_vaccine, InventoryLot, Vaccine};
use crate::status::{classify_status_with, StatusKind, StatusThresholds};

/// Status filter selection
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum StatusFilter {
    #[default]
    All,
    Good,
    Expiring,
    Expired,
    LowStock,
}

impl StatusFilter {
    fn matches(&self, status: StatusKind) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Good => status == StatusKind::Good,
            StatusFilter::Expiring => status == StatusKind::Expiring,
            StatusFilter::Expired => status == StatusKind::Expired,
            StatusFilter::LowStock => status == StatusKind::LowStock,
        }
    }
}

/// Column to sort by
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    VaccineName,
    GenericName,
    VaccineFamily,
    LotNumber,
    #[default]
    ExpirationDate,
    ReceivedDate,
    QuantityOnHand,
    QuantityReceived,
    Status,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// The other direction, as toggled by clicking the active column header
    pub fn toggled(&self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Text predicate for the vaccine family filter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "mode", content = "value", rename_all = "lowercase")]
pub enum TextMatch {
    /// Case-insensitive equality
    Exact(String),
    /// Case-insensitive substring
    Contains(String),
}

impl TextMatch {
    fn matches(&self, candidate: &str) -> bool {
        match self {
            TextMatch::Exact(expected) => candidate.to_lowercase() == expected.to_lowercase(),
            TextMatch::Contains(needle) => contains_ignore_case(candidate, needle),
        }
    }
}

/// Multi-field filters; `None` means inactive
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedFilters {
    pub vaccine_family: Option<TextMatch>,
    /// Matches commercial or generic name
    pub vaccine_name: Option<String>,
    pub lot_number: Option<String>,
    pub expiration_from: Option<NaiveDate>,
    pub expiration_to: Option<NaiveDate>,
    pub quantity_min: Option<i32>,
    pub quantity_max: Option<i32>,
}

/// Everything the inventory view is filtered and ordered by
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InventoryQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: StatusFilter,
    #[serde(default)]
    pub filters: AdvancedFilters,
    #[serde(default)]
    pub sort_field: SortField,
    #[serde(default)]
    pub sort_direction: SortDirection,
}

impl InventoryQuery {
    /// Select a sort column: re-selecting the active column toggles direction,
    /// a new column starts ascending
    pub fn sort_by(&mut self, field: SortField) {
        if self.sort_field == field {
            self.sort_direction = self.sort_direction.toggled();
        } else {
            self.sort_field = field;
            self.sort_direction = SortDirection::Asc;
        }
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn active_text(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Text the free-text search is matched against
fn search_haystack(lot: &InventoryLot, vaccine: Option<&Vaccine>) -> String {
    [
        vaccine.map(|v| v.commercial_name.as_str()).unwrap_or(""),
        vaccine.map(|v| v.generic_name.as_str()).unwrap_or(""),
        vaccine.map(|v| v.vaccine_family.as_str()).unwrap_or(""),
        lot.lot_number.as_str(),
        lot.status.as_str(),
    ]
    .join(" ")
    .to_lowercase()
}

fn matches_filters(lot: &InventoryLot, vaccine: Option<&Vaccine>, filters: &AdvancedFilters) -> bool {
    if let Some(family) = &filters.vaccine_family {
        let candidate = vaccine.map(|v| v.vaccine_family.as_str()).unwrap_or("");
        if !family.matches(candidate) {
            return false;
        }
    }
    if let Some(name) = active_text(&filters.vaccine_name) {
        let matched = vaccine.is_some_and(|v| {
            contains_ignore_case(&v.commercial_name, name) || contains_ignore_case(&v.generic_name, name)
        });
        if !matched {
            return false;
        }
    }
    if let Some(lot_number) = active_text(&filters.lot_number) {
        if !contains_ignore_case(&lot.lot_number, lot_number) {
            return false;
        }
    }
    if filters.expiration_from.is_some_and(|from| lot.expiration_date < from) {
        return false;
    }
    if filters.expiration_to.is_some_and(|to| lot.expiration_date > to) {
        return false;
    }
    if filters.quantity_min.is_some_and(|min| lot.quantity_on_hand < min) {
        return false;
    }
    if filters.quantity_max.is_some_and(|max| lot.quantity_on_hand > max) {
        return false;
    }
    true
}

fn vaccine_text<'a>(vaccine: Option<&'a Vaccine>, field: SortField) -> &'a str {
    match (vaccine, field) {
        (Some(v), SortField::VaccineName) => &v.commercial_name,
        (Some(v), SortField::GenericName) => &v.generic_name,
        (Some(v), SortField::VaccineFamily) => &v.vaccine_family,
        _ => "",
    }
}

fn compare_lots(a: &InventoryLot, b: &InventoryLot, vaccines: &[Vaccine], field: SortField) -> Ordering {
    match field {
        SortField::VaccineName | SortField::GenericName | SortField::VaccineFamily => {
            let a_text = vaccine_text(find_vaccine(vaccines, &a.vaccine_id), field);
            let b_text = vaccine_text(find_vaccine(vaccines, &b.vaccine_id), field);
            a_text.cmp(b_text)
        }
        SortField::LotNumber => a.lot_number.cmp(&b.lot_number),
        SortField::ExpirationDate => a.expiration_date.cmp(&b.expiration_date),
        SortField::ReceivedDate => a.received_date.cmp(&b.received_date),
        SortField::QuantityOnHand => a.quantity_on_hand.cmp(&b.quantity_on_hand),
        SortField::QuantityReceived => a.quantity_received.cmp(&b.quantity_received),
        SortField::Status => a.status.cmp(&b.status),
    }
}

/// Filter and sort lots with the default status thresholds
pub fn filter_inventory<'a>(
    lots: &'a [InventoryLot],
    vaccines: &[Vaccine],
    query: &InventoryQuery,
    now: DateTime<Utc>,
) -> Vec<&'a InventoryLot> {
    filter_inventory_with(lots, vaccines, query, now, &StatusThresholds::default())
}

/// Filter and sort lots.
///
/// The status filter compares against the status derived at `now`, not the
/// stored `status` label, so results agree with the displayed badges.
/// Sorting is stable: ties keep their input order in either direction.
pub fn filter_inventory_with<'a>(
    lots: &'a [InventoryLot],
    vaccines: &[Vaccine],
    query: &InventoryQuery,
    now: DateTime<Utc>,
    thresholds: &StatusThresholds,
) -> Vec<&'a InventoryLot> {
    let search = active_text(&query.search).map(str::to_lowercase);

    let mut result: Vec<&InventoryLot> = lots
        .iter()
        .filter(|lot| {
            let vaccine = find_vaccine(vaccines, &lot.vaccine_id);

            if let Some(term) = &search {
                if !search_haystack(lot, vaccine).contains(term.as_str()) {
                    return false;
                }
            }
            if query.status != StatusFilter::All {
                let status = classify_status_with(lot, now, thresholds).status;
                if !query.status.matches(status) {
                    return false;
                }
            }
            matches_filters(lot, vaccine, &query.filters)
        })
        .collect();

    result.sort_by(|a, b| {
        let ordering = compare_lots(a, b, vaccines, query.sort_field);
        match query.sort_direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });

    result
}
