//! Validation utilities for the Vaccine Inventory Management Platform
//!
//! Failures are collected per field (field name -> message) so a form can
//! show every problem at once and nothing is written until all are fixed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Field-level validation failures, keyed by camelCase field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for a field. The first message for a field wins.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    /// Record a failure for a field, replacing any earlier message
    pub fn set(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `Ok(())` when nothing was recorded
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

// ============================================================================
// Field Checks
// ============================================================================

/// Require a non-blank text value
pub fn require_text(errors: &mut FieldErrors, field: &str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.add(field, message);
    }
}

/// Require an optional text value to be present and non-blank, returning it trimmed
pub fn required_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
    message: &str,
) -> Option<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Some(v.to_string()),
        _ => {
            errors.add(field, message);
            None
        }
    }
}

/// Require an optional value to be present
pub fn required<T: Copy>(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<T>,
    message: &str,
) -> Option<T> {
    if value.is_none() {
        errors.add(field, message);
    }
    value
}

/// Require a count to be zero or more
pub fn require_non_negative(errors: &mut FieldErrors, field: &str, value: i32) {
    if value < 0 {
        errors.add(field, "Quantity cannot be negative");
    }
}

/// Require a count to be at least one
pub fn require_positive(errors: &mut FieldErrors, field: &str, value: i32) {
    if value <= 0 {
        errors.add(field, "Quantity must be greater than zero");
    }
}
