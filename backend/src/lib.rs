//! Vaccine Inventory Management Platform - Backend
//!
//! Record stores, inventory services and the JSON API over them. The
//! `vims-server` binary wires these together from configuration.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod services;
pub mod store;

pub use config::Config;

use services::{
    CatalogService, ImportService, InventoryService, LedgerService, ReconciliationService,
    LedgerLock, ReportingService, SnapshotLoader,
};
use store::Stores;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub stores: Stores,
    pub loader: Arc<SnapshotLoader>,
    pub config: Arc<Config>,
    pub ledger_lock: LedgerLock,
    /// Present when the postgres driver is configured
    pub db: Option<sqlx::PgPool>,
}

impl AppState {
    pub fn new(stores: Stores, config: Config, db: Option<sqlx::PgPool>) -> Self {
        let loader = Arc::new(SnapshotLoader::new(
            stores.vaccines.clone(),
            stores.inventory.clone(),
        ));
        Self {
            stores,
            loader,
            config: Arc::new(config),
            ledger_lock: LedgerLock::default(),
            db,
        }
    }

    pub fn catalog(&self) -> CatalogService {
        CatalogService::new(self.stores.vaccines.clone(), self.loader.clone())
    }

    pub fn inventory(&self) -> InventoryService {
        InventoryService::new(self.loader.clone(), self.config.status.thresholds())
    }

    pub fn ledger(&self) -> LedgerService {
        LedgerService::new(
            self.stores.clone(),
            self.loader.clone(),
            self.ledger_lock.clone(),
            self.config.ledger.default_actor.clone(),
        )
    }

    pub fn reconciliation(&self) -> ReconciliationService {
        ReconciliationService::new(
            self.stores.clone(),
            self.loader.clone(),
            self.ledger_lock.clone(),
            self.config.status.thresholds(),
            self.config.ledger.default_actor.clone(),
        )
    }

    pub fn reporting(&self) -> ReportingService {
        ReportingService::new(
            self.stores.clone(),
            self.loader.clone(),
            self.config.status.thresholds(),
        )
    }

    pub fn importer(&self) -> ImportService {
        ImportService::new(self.stores.clone(), self.loader.clone())
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Vaccine Inventory Management Platform API v1.0"
}
