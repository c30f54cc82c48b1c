//! Creation-time rules for new to-dos.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::model::Todo;

pub const DUE_DATE_FIELD: &str = "dueDate";
pub const IS_COMPLETED_FIELD: &str = "isCompleted";

pub const DUE_DATE_IN_PAST: &str = "Cannot have due date in the past.";
pub const ALREADY_COMPLETED: &str = "Cannot add completed to-do.";

/// Field-level validation messages, keyed by wire field name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn into_map(self) -> BTreeMap<String, Vec<String>> {
        self.0
    }
}

/// Checks a to-do that is about to be created.
///
/// Every rule runs, so a single call can report several fields at once.
pub fn validate_new_todo(todo: &Todo, now: DateTime<Utc>) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if todo.due_date < now {
        errors.add(DUE_DATE_FIELD, DUE_DATE_IN_PAST);
    }
    if todo.is_completed {
        errors.add(IS_COMPLETED_FIELD, ALREADY_COMPLETED);
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
