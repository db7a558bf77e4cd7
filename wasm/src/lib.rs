//! WebAssembly module for the Vaccine Inventory Management Platform
//!
//! Provides client-side computation for:
//! - Lot status badges
//! - Inventory filtering and column header sorting
//! - Receive, administer and loss form validation
//! - Reconciliation previews and dashboard metrics
//!
//! Values cross the boundary as JSON strings using the API's camelCase shapes.
//! Instants are JavaScript epoch milliseconds; omit them to use the current time.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use wasm_bindgen::prelude::*;

use shared::{
    classify_status_with, dashboard_metrics, filter_inventory_with, loss_reason_options,
    reconcile, validate_counts, AdministerInput, AdministrationRecord, FieldErrors, InventoryLot,
    InventoryQuery, PhysicalCounts, ReceiveShipmentInput, ReportLossInput, SortField,
    StatusThresholds, Vaccine,
};

type BindingResult<T> = Result<T, String>;

fn parse<T: DeserializeOwned>(json: &str, what: &str) -> BindingResult<T> {
    serde_json::from_str(json).map_err(|e| format!("Invalid {} JSON: {}", what, e))
}

fn to_json<T: Serialize>(value: &T) -> BindingResult<String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization failed: {}", e))
}

fn instant(now_millis: Option<f64>) -> BindingResult<DateTime<Utc>> {
    let millis = now_millis.unwrap_or_else(js_sys::Date::now);
    DateTime::from_timestamp_millis(millis as i64).ok_or_else(|| format!("Invalid instant: {}", millis))
}

fn thresholds(thresholds_json: Option<String>) -> BindingResult<StatusThresholds> {
    match thresholds_json {
        Some(json) => parse(&json, "thresholds"),
        None => Ok(StatusThresholds::default()),
    }
}

/// Field errors as JSON; `{}` when the form is valid
fn errors_json(result: Result<(), FieldErrors>) -> BindingResult<String> {
    to_json(&result.err().unwrap_or_default())
}

fn js<T>(result: BindingResult<T>) -> Result<T, JsValue> {
    result.map_err(|e| JsValue::from_str(&e))
}

fn lot_status(lot_json: &str, now_millis: Option<f64>, thresholds_json: Option<String>) -> BindingResult<String> {
    let lot: InventoryLot = parse(lot_json, "lot")?;
    let status = classify_status_with(&lot, instant(now_millis)?, &thresholds(thresholds_json)?);
    to_json(&status)
}

fn filtered_lots(
    lots_json: &str,
    vaccines_json: &str,
    query_json: &str,
    now_millis: Option<f64>,
    thresholds_json: Option<String>,
) -> BindingResult<String> {
    let lots: Vec<InventoryLot> = parse(lots_json, "lots")?;
    let vaccines: Vec<Vaccine> = parse(vaccines_json, "vaccines")?;
    let query: InventoryQuery = parse(query_json, "query")?;
    let view = filter_inventory_with(
        &lots,
        &vaccines,
        &query,
        instant(now_millis)?,
        &thresholds(thresholds_json)?,
    );
    to_json(&view)
}

fn resorted_query(query_json: &str, field: &str) -> BindingResult<String> {
    let mut query: InventoryQuery = parse(query_json, "query")?;
    let field: SortField = parse(&serde_json::Value::from(field).to_string(), "sort field")?;
    query.sort_by(field);
    to_json(&query)
}

fn receipt_errors(input_json: &str) -> BindingResult<String> {
    let input: ReceiveShipmentInput = parse(input_json, "receipt")?;
    errors_json(input.validate().map(|_| ()))
}

fn loss_errors(input_json: &str, lot_json: Option<String>) -> BindingResult<String> {
    let input: ReportLossInput = parse(input_json, "loss")?;
    let lot: Option<InventoryLot> = lot_json.map(|json| parse(&json, "lot")).transpose()?;
    errors_json(input.validate(lot.as_ref()).map(|_| ()))
}

fn administration_errors(input_json: &str, lots_json: &str) -> BindingResult<String> {
    let input: AdministerInput = parse(input_json, "administration")?;
    let lots: Vec<InventoryLot> = parse(lots_json, "lots")?;
    errors_json(input.validate(&lots).map(|_| ()))
}

fn reconciliation_sheet(lots_json: &str, counts_json: &str) -> BindingResult<String> {
    let lots: Vec<InventoryLot> = parse(lots_json, "lots")?;
    let counts: PhysicalCounts = parse(counts_json, "counts")?;
    if let Err(errors) = validate_counts(&lots, &counts) {
        return Err(errors.to_string());
    }
    to_json(&reconcile(&lots, &counts))
}

fn dashboard(lots_json: &str, administrations_json: &str, now_millis: Option<f64>) -> BindingResult<String> {
    let lots: Vec<InventoryLot> = parse(lots_json, "lots")?;
    let administrations: Vec<AdministrationRecord> = parse(administrations_json, "administrations")?;
    let metrics = dashboard_metrics(
        &lots,
        &administrations,
        instant(now_millis)?,
        &StatusThresholds::default(),
    );
    to_json(&metrics)
}

/// Status badge (`{status, text, daysUntilExpiration}`) for one lot
#[wasm_bindgen]
pub fn classify_lot_status(
    lot_json: &str,
    now_millis: Option<f64>,
    thresholds_json: Option<String>,
) -> Result<String, JsValue> {
    js(lot_status(lot_json, now_millis, thresholds_json))
}

/// Lots matching an inventory query, in display order
#[wasm_bindgen]
pub fn filter_inventory(
    lots_json: &str,
    vaccines_json: &str,
    query_json: &str,
    now_millis: Option<f64>,
    thresholds_json: Option<String>,
) -> Result<String, JsValue> {
    js(filtered_lots(lots_json, vaccines_json, query_json, now_millis, thresholds_json))
}

/// Query after clicking a column header: the active column flips direction,
/// another column starts ascending
#[wasm_bindgen]
pub fn sort_inventory_by(query_json: &str, field: &str) -> Result<String, JsValue> {
    js(resorted_query(query_json, field))
}

/// Field errors for the receiving form
#[wasm_bindgen]
pub fn validate_receipt(input_json: &str) -> Result<String, JsValue> {
    js(receipt_errors(input_json))
}

/// Field errors for the loss form, checked against the selected lot
#[wasm_bindgen]
pub fn validate_loss(input_json: &str, lot_json: Option<String>) -> Result<String, JsValue> {
    js(loss_errors(input_json, lot_json))
}

/// Field errors for the administration form
#[wasm_bindgen]
pub fn validate_administration(input_json: &str, lots_json: &str) -> Result<String, JsValue> {
    js(administration_errors(input_json, lots_json))
}

/// Reconciliation sheet for entered physical counts
#[wasm_bindgen]
pub fn reconcile_counts(lots_json: &str, counts_json: &str) -> Result<String, JsValue> {
    js(reconciliation_sheet(lots_json, counts_json))
}

/// Dashboard totals and alerts
#[wasm_bindgen]
pub fn compute_dashboard(
    lots_json: &str,
    administrations_json: &str,
    now_millis: Option<f64>,
) -> Result<String, JsValue> {
    js(dashboard(lots_json, administrations_json, now_millis))
}

/// Loss reason options (`[{value, label}]`)
#[wasm_bindgen]
pub fn loss_reasons() -> String {
    serde_json::to_string(&loss_reason_options()).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    // 2026-10-18T12:00:00Z
    const NOW: f64 = 1_792_324_800_000.0;

    fn lot(id: i64, expiration: &str, on_hand: i32) -> Value {
        json!({
            "id": id,
            "inventoryId": format!("INV-{:03}", id),
            "vaccineId": "VAX-001",
            "lotNumber": format!("LOT{}", id),
            "expirationDate": expiration,
            "receivedDate": "2026-01-01",
            "quantityReceived": 100,
            "quantityOnHand": on_hand,
            "passingInspection": 100,
            "failedInspection": 0,
            "status": "Good"
        })
    }

    #[test]
    fn test_classify_lot_status() {
        let json = lot_status(&lot(1, "2026-10-28", 50).to_string(), Some(NOW), None).unwrap();
        let status: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(status["status"], "expiring");
        assert_eq!(status["text"], "Expires in 10 days");
        assert_eq!(status["daysUntilExpiration"], 10);
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = json!({"expiringWithinDays": 5, "lowStockThreshold": 60}).to_string();
        let json = lot_status(&lot(1, "2026-10-28", 50).to_string(), Some(NOW), Some(thresholds)).unwrap();
        let status: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(status["status"], "low-stock");
    }

    #[test]
    fn test_filter_inventory_by_status() {
        let lots = json!([lot(1, "2027-06-30", 50), lot(2, "2026-10-01", 50), lot(3, "2026-10-28", 50)]);
        let query = json!({"status": "expired"});
        let json = filtered_lots(&lots.to_string(), "[]", &query.to_string(), Some(NOW), None).unwrap();
        let view: Vec<Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(view.len(), 1);
        assert_eq!(view[0]["id"], 2);
    }

    #[test]
    fn test_sort_inventory_by_header() {
        let query = json!({"sortField": "lotNumber", "sortDirection": "asc"}).to_string();

        let flipped: Value = serde_json::from_str(&resorted_query(&query, "lotNumber").unwrap()).unwrap();
        assert_eq!(flipped["sortField"], "lotNumber");
        assert_eq!(flipped["sortDirection"], "desc");

        let moved: Value = serde_json::from_str(&resorted_query(&flipped.to_string(), "quantityOnHand").unwrap()).unwrap();
        assert_eq!(moved["sortField"], "quantityOnHand");
        assert_eq!(moved["sortDirection"], "asc");

        assert!(resorted_query(&query, "colour").unwrap_err().starts_with("Invalid sort field JSON"));
    }

    #[test]
    fn test_validate_receipt() {
        let valid = json!({
            "vaccineId": "VAX-001",
            "lotNumber": "A1",
            "expirationDate": "2027-06-30",
            "quantityReceived": 100,
            "passingInspection": 100,
            "failedInspection": 0
        });
        assert_eq!(receipt_errors(&valid.to_string()).unwrap(), "{}");

        let errors: Value = serde_json::from_str(&receipt_errors("{}").unwrap()).unwrap();
        assert_eq!(errors["lotNumber"], "Lot number is required");
    }

    #[test]
    fn test_validate_loss_against_lot() {
        let input = json!({
            "inventoryId": 1,
            "lossQuantity": 60,
            "lossReason": "expired",
            "lossDetails": "Found expired in fridge",
            "trainingCompleted": true
        });
        let json = loss_errors(&input.to_string(), Some(lot(1, "2027-06-30", 50).to_string())).unwrap();
        let errors: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(errors["lossQuantity"], "Cannot exceed available quantity (50)");
    }

    #[test]
    fn test_reconcile_counts() {
        let lots = json!([lot(1, "2027-06-30", 50), lot(2, "2027-06-30", 10)]);
        let json = reconciliation_sheet(&lots.to_string(), r#"{"1": 45, "2": 13}"#).unwrap();
        let sheet: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(sheet["totalAdjustments"], 8);
        assert_eq!(sheet["discrepancyCount"], 2);

        assert!(reconciliation_sheet(&lots.to_string(), r#"{"1": -1}"#).is_err());
    }

    #[test]
    fn test_invalid_json_is_reported() {
        let err = receipt_errors("not json").unwrap_err();
        assert!(err.starts_with("Invalid receipt JSON"));
    }

    #[test]
    fn test_loss_reasons() {
        let reasons: Vec<Value> = serde_json::from_str(&loss_reasons()).unwrap();
        assert_eq!(reasons.len(), 8);
        assert!(reasons.iter().all(|r| r["label"].is_string()));
    }
}
