//! Shared types and business rules for the Vaccine Inventory Management Platform
//!
//! This crate contains the models and the pure inventory rules (status
//! classification, filtering, ledger form validation, reconciliation and
//! reporting) shared between the backend, frontend (via WASM), and other
//! components of the system.

pub mod filter;
pub mod forms;
pub mod models;
pub mod reconciliation;
pub mod report;
pub mod status;
pub mod types;
pub mod validation;

pub use filter::*;
pub use forms::*;
pub use models::*;
pub use reconciliation::*;
pub use report::*;
pub use status::*;
pub use types::*;
pub use validation::*;
