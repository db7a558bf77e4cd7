//! Record collections behind a uniform CRUD contract
//!
//! Services never talk to a database directly; they are handed one store per
//! collection. `MemoryStore` keeps records in process, `PgStore` keeps them
//! as JSONB rows in PostgreSQL.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use std::sync::Arc;

use shared::{AdministrationRecord, InventoryLot, LossRecord, ReconciliationRecord, Record, Vaccine};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};

/// CRUD access to one record collection.
///
/// Records come back in collection order (ascending id). `create` assigns
/// the id; `get_by_id`, `update` and `delete` fail with `NotFound` for
/// unknown ids. Drafts and patches are validated before anything is written.
#[axum::async_trait]
pub trait RecordStore<T: Record>: Send + Sync {
    async fn list_all(&self) -> AppResult<Vec<T>>;

    async fn get_by_id(&self, id: i64) -> AppResult<T>;

    async fn create(&self, draft: T::Draft) -> AppResult<T>;

    async fn update(&self, id: i64, patch: T::Patch) -> AppResult<T>;

    async fn delete(&self, id: i64) -> AppResult<()>;
}

pub type SharedStore<T> = Arc<dyn RecordStore<T>>;

/// One store per collection
#[derive(Clone)]
pub struct Stores {
    pub vaccines: SharedStore<Vaccine>,
    pub inventory: SharedStore<InventoryLot>,
    pub administrations: SharedStore<AdministrationRecord>,
    pub losses: SharedStore<LossRecord>,
    pub reconciliations: SharedStore<ReconciliationRecord>,
}

impl Stores {
    /// Empty in-process collections
    pub fn in_memory() -> Self {
        Self {
            vaccines: Arc::new(MemoryStore::new()),
            inventory: Arc::new(MemoryStore::new()),
            administrations: Arc::new(MemoryStore::new()),
            losses: Arc::new(MemoryStore::new()),
            reconciliations: Arc::new(MemoryStore::new()),
        }
    }

    /// Collections kept in the `records` table
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            vaccines: Arc::new(PgStore::new(pool.clone())),
            inventory: Arc::new(PgStore::new(pool.clone())),
            administrations: Arc::new(PgStore::new(pool.clone())),
            losses: Arc::new(PgStore::new(pool.clone())),
            reconciliations: Arc::new(PgStore::new(pool)),
        }
    }
}

pub(crate) fn not_found<T: Record>(id: i64) -> AppError {
    AppError::NotFound(format!("{} {}", T::RESOURCE, id))
}
