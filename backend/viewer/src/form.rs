//! Form Collector
//!
//! Holds the five incident inputs and their inline errors. A submit only
//! reaches the caller when every field passes the presence check.

use std::collections::BTreeMap;

use incident_core::{Field, IncidentRecord};

/// Message shown under an empty field.
pub const REQUIRED: &str = "Required";

#[derive(Debug, Default, Clone)]
pub struct IncidentForm {
    values: IncidentRecord,
    errors: BTreeMap<Field, &'static str>,
}

impl IncidentForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self, field: Field) -> &str {
        self.values.get(field)
    }

    /// Stores an edit and clears that field's error.
    ///
    /// Input beyond the field's length limit is dropped.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        let mut value = value.into();
        if let Some(limit) = field.max_len() {
            if let Some((cut, _)) = value.char_indices().nth(limit) {
                value.truncate(cut);
            }
        }
        *self.values.get_mut(field) = value;
        self.errors.remove(&field);
    }

    pub fn error(&self, field: Field) -> Option<&'static str> {
        self.errors.get(&field).copied()
    }

    /// Fields currently showing an error, in form order.
    pub fn fields_with_errors(&self) -> Vec<Field> {
        self.errors.keys().copied().collect()
    }

    /// Recomputes every field's error. Returns `true` when none remain.
    pub fn validate(&mut self) -> bool {
        self.errors.clear();
        for field in Field::ALL {
            let value = self.values.get(field);
            let present = if field.trims() {
                !value.trim().is_empty()
            } else {
                !value.is_empty()
            };
            if !present {
                self.errors.insert(field, REQUIRED);
            }
        }
        self.errors.is_empty()
    }

    /// Validates and, on success, hands the record to `on_submit` exactly once.
    ///
    /// The record carries the values as entered, untrimmed.
    pub fn submit<F>(&mut self, on_submit: F) -> bool
    where
        F: FnOnce(IncidentRecord),
    {
        if !self.validate() {
            return false;
        }
        on_submit(self.values.clone());
        true
    }
}
