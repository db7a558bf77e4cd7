//! Route definitions for the Vaccine Inventory Management Platform

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/vaccines", vaccine_routes())
        .nest("/inventory", inventory_routes())
        .nest("/administrations", administration_routes())
        .nest("/losses", loss_routes())
        .nest("/reconciliation", reconciliation_routes())
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/reports/:kind", get(handlers::get_report))
}

/// Vaccine catalog routes
fn vaccine_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_vaccines).post(handlers::create_vaccine))
        .route("/:id", get(handlers::get_vaccine))
}

/// Inventory routes
fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_inventory))
        .route("/reload", post(handlers::reload_inventory))
        .route("/receive", post(handlers::receive_shipment))
        .route("/import", post(handlers::import_inventory))
        .route("/:id", get(handlers::get_inventory_lot))
}

/// Dose administration routes
fn administration_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_administrations).post(handlers::administer_doses),
        )
        .route("/sheet", get(handlers::get_administration_sheet))
}

/// Loss reporting routes
fn loss_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_losses).post(handlers::report_loss))
        .route("/reasons", get(handlers::list_loss_reasons))
}

/// Reconciliation routes
fn reconciliation_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::get_reconciliation_sheet).post(handlers::commit_reconciliation),
        )
        .route("/preview", post(handlers::preview_reconciliation))
}
