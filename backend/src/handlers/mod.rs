//! HTTP handlers for the Vaccine Inventory Management Platform

mod catalog;
mod health;
mod inventory;
mod ledger;
mod reconciliation;
mod reporting;

pub use catalog::*;
pub use health::*;
pub use inventory::*;
pub use ledger::*;
pub use reconciliation::*;
pub use reporting::*;
