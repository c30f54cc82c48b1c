//! Error types for the todo API client.
//!
//! # Design
//! `NotFound` and `Validation` get dedicated variants because callers act on
//! them directly: the first means "no such todo", the second carries the
//! per-field messages the server rejected a create with. All other non-2xx
//! responses land in `HttpError` with the raw status code and body.

use std::collections::BTreeMap;

use thiserror::Error;

/// Errors returned by `TodoClient` build and parse methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404 — the requested todo does not exist.
    #[error("resource not found")]
    NotFound,

    /// The server rejected the payload; field name to messages.
    #[error("validation failed: {}", .0.keys().cloned().collect::<Vec<_>>().join(", "))]
    Validation(BTreeMap<String, Vec<String>>),

    /// The server returned some other unexpected status.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}
