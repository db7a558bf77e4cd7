//! Fixtures shared by the backend integration tests

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use shared::{InventoryLot, Record, Vaccine};
use vims_server::error::{AppError, AppResult};
use vims_server::store::{MemoryStore, RecordStore, Stores};
use vims_server::{AppState, Config};

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn vaccine(id: i64, vaccine_id: &str, commercial: &str, generic: &str) -> Vaccine {
    Vaccine {
        id,
        vaccine_id: vaccine_id.to_string(),
        commercial_name: commercial.to_string(),
        generic_name: generic.to_string(),
        vaccine_family: generic.to_string(),
        manufacturer_id: "MFR-001".to_string(),
    }
}

pub fn catalog() -> Vec<Vaccine> {
    vec![
        vaccine(1, "VAX-001", "Pfizer-BioNTech COVID-19", "COVID-19 mRNA"),
        vaccine(2, "VAX-002", "Fluzone Quadrivalent", "Influenza"),
    ]
}

/// A lot of VAX-001 expiring `days` from today
pub fn lot(id: i64, days: i64, on_hand: i32) -> InventoryLot {
    InventoryLot {
        id,
        inventory_id: format!("INV-{:03}", id),
        vaccine_id: "VAX-001".to_string(),
        lot_number: format!("LOT{}", id),
        expiration_date: today() + Duration::days(days),
        received_date: today() - Duration::days(30),
        quantity_received: 100,
        quantity_on_hand: on_hand,
        passing_inspection: 100,
        failed_inspection: 0,
        discrepancy_reason: None,
        status: "Good".to_string(),
    }
}

pub fn seeded_stores(lots: Vec<InventoryLot>) -> Stores {
    Stores {
        vaccines: Arc::new(MemoryStore::with_records(catalog())),
        inventory: Arc::new(MemoryStore::with_records(lots)),
        administrations: Arc::new(MemoryStore::new()),
        losses: Arc::new(MemoryStore::new()),
        reconciliations: Arc::new(MemoryStore::new()),
    }
}

pub fn state_with(stores: Stores) -> AppState {
    let config = Config::defaults().expect("default configuration");
    AppState::new(stores, config, None)
}

/// Memory store that fails chosen calls with a store error
pub struct FlakyStore<T> {
    inner: MemoryStore<T>,
    create_calls: AtomicUsize,
    /// 1-based `create` calls that fail
    failing_creates: HashSet<usize>,
    /// Record ids whose `update` fails
    failing_updates: HashSet<i64>,
}

impl<T: Record> FlakyStore<T> {
    pub fn new(records: Vec<T>) -> Self {
        Self {
            inner: MemoryStore::with_records(records),
            create_calls: AtomicUsize::new(0),
            failing_creates: HashSet::new(),
            failing_updates: HashSet::new(),
        }
    }

    pub fn failing_create(mut self, call: usize) -> Self {
        self.failing_creates.insert(call);
        self
    }

    pub fn failing_update(mut self, id: i64) -> Self {
        self.failing_updates.insert(id);
        self
    }
}

fn store_down() -> AppError {
    AppError::Collaborator("connection reset".to_string())
}

#[axum::async_trait]
impl<T: Record> RecordStore<T> for FlakyStore<T> {
    async fn list_all(&self) -> AppResult<Vec<T>> {
        self.inner.list_all().await
    }

    async fn get_by_id(&self, id: i64) -> AppResult<T> {
        self.inner.get_by_id(id).await
    }

    async fn create(&self, draft: T::Draft) -> AppResult<T> {
        let call = self.create_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.failing_creates.contains(&call) {
            return Err(store_down());
        }
        self.inner.create(draft).await
    }

    async fn update(&self, id: i64, patch: T::Patch) -> AppResult<T> {
        if self.failing_updates.contains(&id) {
            return Err(store_down());
        }
        self.inner.update(id, patch).await
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        self.inner.delete(id).await
    }
}

/// Memory store that yields to the scheduler before every call, so
/// concurrent submissions interleave between their reads and writes
pub struct YieldingStore<T> {
    inner: MemoryStore<T>,
}

impl<T: Record> YieldingStore<T> {
    pub fn new(records: Vec<T>) -> Self {
        Self {
            inner: MemoryStore::with_records(records),
        }
    }
}

#[axum::async_trait]
impl<T: Record> RecordStore<T> for YieldingStore<T> {
    async fn list_all(&self) -> AppResult<Vec<T>> {
        tokio::task::yield_now().await;
        self.inner.list_all().await
    }

    async fn get_by_id(&self, id: i64) -> AppResult<T> {
        tokio::task::yield_now().await;
        self.inner.get_by_id(id).await
    }

    async fn create(&self, draft: T::Draft) -> AppResult<T> {
        tokio::task::yield_now().await;
        self.inner.create(draft).await
    }

    async fn update(&self, id: i64, patch: T::Patch) -> AppResult<T> {
        tokio::task::yield_now().await;
        self.inner.update(id, patch).await
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        self.inner.delete(id).await
    }
}

/// Stores whose inventory interleaves under concurrent submissions
pub fn yielding_stores(lots: Vec<InventoryLot>) -> Stores {
    let mut stores = seeded_stores(vec![]);
    stores.inventory = Arc::new(YieldingStore::new(lots));
    stores
}
