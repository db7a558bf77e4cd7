//! HTTP API tests
//!
//! Drives the router in process against in-memory stores:
//! - Route wiring and JSON shapes
//! - Error envelopes for validation and missing records
//! - Dashboard and report endpoints

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use common::{lot, seeded_stores, state_with};
use serde_json::{json, Value};
use tower::ServiceExt;
use vims_server::create_app;

fn app_with(lots: Vec<shared::InventoryLot>) -> Router {
    create_app(state_with(seeded_stores(lots)))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

// ============================================================================
// Health and Catalog
// ============================================================================

#[cfg(test)]
mod catalog_api_tests {
    use super::*;

    #[tokio::test]
    async fn test_health() {
        let app = app_with(vec![]);

        let (status, body) = get(&app, "/api/v1/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["database"], "in-memory");
    }

    #[tokio::test]
    async fn test_list_and_get_vaccines() {
        let app = app_with(vec![]);

        let (status, body) = get(&app, "/api/v1/vaccines").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);

        let (status, body) = get(&app, "/api/v1/vaccines/2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["vaccineId"], "VAX-002");
        assert_eq!(body["commercialName"], "Fluzone Quadrivalent");
    }

    #[tokio::test]
    async fn test_missing_vaccine_is_404() {
        let app = app_with(vec![]);

        let (status, body) = get(&app, "/api/v1/vaccines/99").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
        assert_eq!(body["error"]["retryable"], false);
    }

    #[tokio::test]
    async fn test_create_vaccine_rejects_duplicate_id() {
        let app = app_with(vec![]);

        let (status, body) = post(
            &app,
            "/api/v1/vaccines",
            json!({"vaccineId": "VAX-001", "commercialName": "Comirnaty"}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["fields"]["vaccineId"], "Vaccine ID already exists");
    }

    #[tokio::test]
    async fn test_loss_reasons() {
        let app = app_with(vec![]);

        let (status, body) = get(&app, "/api/v1/losses/reasons").await;

        assert_eq!(status, StatusCode::OK);
        let reasons = body.as_array().unwrap();
        assert_eq!(reasons.len(), 8);
        assert_eq!(reasons[0]["value"], "expired");
    }
}

// ============================================================================
// Inventory
// ============================================================================

#[cfg(test)]
mod inventory_api_tests {
    use super::*;

    #[tokio::test]
    async fn test_inventory_rows_carry_status() {
        let app = app_with(vec![lot(1, 200, 50), lot(2, -3, 50), lot(3, 10, 50)]);

        let (status, body) = get(&app, "/api/v1/inventory?status=expired").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 3);
        let items = body["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["inventoryId"], "INV-002");
        assert_eq!(items[0]["vaccineName"], "Pfizer-BioNTech COVID-19");
        assert_eq!(items[0]["statusInfo"]["status"], "expired");
    }

    #[tokio::test]
    async fn test_inventory_sorted_by_quantity_desc() {
        let app = app_with(vec![lot(1, 200, 10), lot(2, 200, 90), lot(3, 200, 40)]);

        let (_, body) = get(
            &app,
            "/api/v1/inventory?sortField=quantityOnHand&sortDirection=desc",
        )
        .await;

        let quantities: Vec<i64> = body["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["quantityOnHand"].as_i64().unwrap())
            .collect();
        assert_eq!(quantities, vec![90, 40, 10]);
    }

    #[tokio::test]
    async fn test_inventory_lot_not_found() {
        let app = app_with(vec![lot(1, 200, 50)]);

        let (status, body) = get(&app, "/api/v1/inventory/42").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_receive_then_list() {
        let app = app_with(vec![]);

        let (status, body) = post(
            &app,
            "/api/v1/inventory/receive",
            json!({
                "vaccineId": "VAX-002",
                "lotNumber": "UT7781",
                "expirationDate": "2027-06-30",
                "quantityReceived": 50,
                "passingInspection": 50,
                "failedInspection": 0
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["quantityOnHand"], 50);

        let (_, body) = get(&app, "/api/v1/inventory").await;
        assert_eq!(body["items"][0]["lotNumber"], "UT7781");
        assert_eq!(body["items"][0]["vaccineName"], "Fluzone Quadrivalent");
    }

    #[tokio::test]
    async fn test_receive_validation_envelope() {
        let app = app_with(vec![]);

        let (status, body) = post(&app, "/api/v1/inventory/receive", json!({})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["fields"]["lotNumber"], "Lot number is required");
        assert_eq!(body["error"]["fields"]["vaccineId"], "Vaccine selection is required");
    }

    #[tokio::test]
    async fn test_reload_reports_generation() {
        let app = app_with(vec![lot(1, 200, 50)]);

        let (status, body) = post(&app, "/api/v1/inventory/reload", json!({})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["lots"], 1);
        assert_eq!(body["vaccines"], 2);
        assert!(body["generation"].as_u64().unwrap() >= 1);
    }
}

// ============================================================================
// Ledger and Reconciliation
// ============================================================================

#[cfg(test)]
mod ledger_api_tests {
    use super::*;

    #[tokio::test]
    async fn test_administer_and_list() {
        let app = app_with(vec![lot(1, 200, 50)]);

        let (status, body) = post(
            &app,
            "/api/v1/administrations",
            json!({"doses": {"1": 4}, "administeredBy": "Dr. Ortiz"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalDoses"], 4);

        let (_, body) = get(&app, "/api/v1/administrations").await;
        assert_eq!(body[0]["administeredDoses"], 4);
        assert_eq!(body[0]["administeredBy"], "Dr. Ortiz");

        let (_, body) = get(&app, "/api/v1/inventory/1").await;
        assert_eq!(body["quantityOnHand"], 46);
    }

    /// Empty lots are left off; posting the sheet unchanged records nothing
    #[tokio::test]
    async fn test_administration_sheet() {
        let app = app_with(vec![lot(1, 200, 50), lot(2, 200, 0), lot(3, 200, 7)]);

        let (status, sheet) = get(&app, "/api/v1/administrations/sheet").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(sheet["doses"], json!({"1": 0, "3": 0}));
        let ids: Vec<i64> = sheet["lots"]
            .as_array()
            .unwrap()
            .iter()
            .map(|lot| lot["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![1, 3]);

        let (status, body) = post(&app, "/api/v1/administrations", json!({"doses": sheet["doses"]})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["fields"]["doses"], "No doses to record");
    }

    #[tokio::test]
    async fn test_loss_over_quantity() {
        let app = app_with(vec![lot(1, 200, 30)]);

        let (status, body) = post(
            &app,
            "/api/v1/losses",
            json!({
                "inventoryId": 1,
                "lossQuantity": 40,
                "lossReason": "broken-vial",
                "lossDetails": "Dropped tray",
                "trainingCompleted": true
            }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"]["fields"]["lossQuantity"],
            "Cannot exceed available quantity (30)"
        );
    }

    #[tokio::test]
    async fn test_reconciliation_flow() {
        let app = app_with(vec![lot(1, 200, 50)]);

        let (status, body) = get(&app, "/api/v1/reconciliation").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["discrepancyCount"], 0);
        assert_eq!(body["lines"][0]["physicalQuantity"], 50);

        let (_, body) = post(
            &app,
            "/api/v1/reconciliation/preview",
            json!({"physicalCounts": {"1": 45}}),
        )
        .await;
        assert_eq!(body["lines"][0]["adjustment"], -5);

        let (status, body) = post(
            &app,
            "/api/v1/reconciliation",
            json!({"physicalCounts": {"1": 45}}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "committed");
        assert_eq!(body["totalAdjustments"], 5);
        assert_eq!(body["records"][0]["adjustmentQuantity"], -5);

        let (_, body) = post(
            &app,
            "/api/v1/reconciliation",
            json!({"physicalCounts": {"1": 45}}),
        )
        .await;
        assert_eq!(body["outcome"], "no-discrepancies");
    }
}

// ============================================================================
// Dashboard and Reports
// ============================================================================

#[cfg(test)]
mod reporting_api_tests {
    use super::*;

    #[tokio::test]
    async fn test_dashboard_alerts() {
        let app = app_with(vec![lot(1, 200, 50), lot(2, -1, 40), lot(3, 10, 30), lot(4, 200, 5)]);

        let (status, body) = get(&app, "/api/v1/dashboard").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalDoses"], 125);
        assert_eq!(body["administeredDoses"], 0);
        assert_eq!(body["expired"], 1);
        assert_eq!(body["expiringSoon"], 1);
        assert_eq!(body["lowStock"], 1);

        let alerts = body["alerts"].as_array().unwrap();
        assert_eq!(alerts.len(), 3);
        assert_eq!(alerts[0]["level"], "error");
        assert_eq!(
            alerts[0]["message"],
            "1 vaccine lot have expired and need immediate attention"
        );
    }

    #[tokio::test]
    async fn test_expiring_report() {
        let app = app_with(vec![lot(1, 200, 50), lot(2, 12, 50)]);

        let (status, body) = get(&app, "/api/v1/reports/expiring").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["kind"], "expiring");
        assert_eq!(body["title"], "Expiring Vaccines Report (Next 30 Days)");
        assert_eq!(body["items"].as_array().unwrap().len(), 1);
        assert_eq!(body["items"][0]["inventoryId"], "INV-002");
    }

    #[tokio::test]
    async fn test_unknown_report_kind() {
        let app = app_with(vec![]);

        let (status, body) = get(&app, "/api/v1/reports/weekly").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["fields"]["kind"], "Invalid report type: weekly");
    }

    #[tokio::test]
    async fn test_inverted_date_range() {
        let app = app_with(vec![]);

        let (status, body) = get(
            &app,
            "/api/v1/reports/administration?startDate=2026-10-01&endDate=2026-09-01",
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["fields"]["endDate"].is_string());
    }
}
