//! Common shape of every persisted record collection

use serde::{de::DeserializeOwned, Serialize};

use crate::validation::FieldErrors;

/// A record kept in a named collection by a record store.
///
/// Stores assign the numeric `id` on create. `Draft` is what callers submit,
/// `Patch` is the partial update a store accepts for this record kind.
pub trait Record: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    type Draft: Clone + Send + Sync + Serialize + DeserializeOwned + 'static;
    type Patch: Send + Sync + 'static;

    /// Collection name (e.g., "inventory")
    const COLLECTION: &'static str;

    /// Human readable resource name used in not-found messages
    const RESOURCE: &'static str;

    fn id(&self) -> i64;

    fn from_draft(id: i64, draft: Self::Draft) -> Self;

    fn apply(&mut self, patch: Self::Patch);

    /// Boundary check run by stores before a draft is persisted
    fn validate_draft(_draft: &Self::Draft) -> Result<(), FieldErrors> {
        Ok(())
    }

    /// Boundary check run by stores before a patch is applied
    fn validate_patch(_patch: &Self::Patch) -> Result<(), FieldErrors> {
        Ok(())
    }
}

/// Patch type for create-only records.
///
/// Having no values, it makes updates to such records unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Immutable {}
