//! Domain models for the Vaccine Inventory Management Platform

mod administration;
mod inventory;
mod loss;
mod reconciliation;
mod record;
mod vaccine;

pub use administration::*;
pub use inventory::*;
pub use loss::*;
pub use reconciliation::*;
pub use record::*;
pub use vaccine::*;

use chrono::NaiveDate;
use uuid::Uuid;

/// Generate a business identity (e.g., "INV-20261018-1A2B3C4D")
pub fn generate_record_id(prefix: &str, date: NaiveDate) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}-{}",
        prefix,
        date.format("%Y%m%d"),
        suffix[..8].to_uppercase()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_record_id_format() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let id = generate_record_id("INV", date);

        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "INV");
        assert_eq!(parts[1], "20261018");
        assert_eq!(parts[2].len(), 8);
        assert!(parts[2]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn test_generate_record_id_unique() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_ne!(generate_record_id("ADM", date), generate_record_id("ADM", date));
    }
}
