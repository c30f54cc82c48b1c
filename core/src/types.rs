//! Domain DTOs for the todo API.
//!
//! # Design
//! These types mirror the server's schema but are defined independently, so
//! the client never links against axum. Integration tests catch any schema
//! drift between the two crates.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single todo item, as sent to and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i32,
    pub name: String,
    pub due_date: DateTime<Utc>,
    pub is_completed: bool,
}

/// Error body returned with 400 and 500 responses.
///
/// `errors` is only populated for validation failures and maps each rejected
/// field to its messages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Problem {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub status: u16,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub errors: BTreeMap<String, Vec<String>>,
}
