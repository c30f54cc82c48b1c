//! HTTP-facing error type and the problem-details body.
//!
//! # Design
//! Handlers and middleware return `Result<_, ApiError>`; the conversion to a
//! response lives here so status codes are decided in one place. A missing
//! to-do is a bare 404 with no body. Everything else that carries a body uses
//! the `application/problem+json` shape (`type`, `title`, `status`, optional
//! `detail` and `errors`).

use std::collections::BTreeMap;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use http_body_util::LengthLimitError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

use crate::service::ServiceError;
use crate::validation::ValidationErrors;

pub const PROBLEM_CONTENT_TYPE: &str = "application/problem+json";

const BAD_REQUEST_TYPE: &str = "https://tools.ietf.org/html/rfc9110#section-15.5.1";
const CONTENT_TOO_LARGE_TYPE: &str = "https://tools.ietf.org/html/rfc9110#section-15.5.14";
const SERVER_ERROR_TYPE: &str = "https://tools.ietf.org/html/rfc9110#section-15.6.1";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("to-do {0} not found")]
    NotFound(i32),

    #[error("one or more validation errors occurred")]
    Validation(ValidationErrors),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("failed to read request body: {0}")]
    Body(#[from] axum::Error),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, Vec<String>>,
}

impl ProblemDetails {
    pub fn new(kind: &str, title: &str, status: StatusCode) -> Self {
        Self {
            kind: kind.to_string(),
            title: title.to_string(),
            status: status.as_u16(),
            detail: None,
            errors: BTreeMap::new(),
        }
    }

    pub fn validation(errors: ValidationErrors) -> Self {
        Self {
            errors: errors.into_map(),
            ..Self::new(
                BAD_REQUEST_TYPE,
                "One or more validation errors occurred.",
                StatusCode::BAD_REQUEST,
            )
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (
            status,
            [(header::CONTENT_TYPE, PROBLEM_CONTENT_TYPE)],
            Json(self),
        )
            .into_response()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND.into_response(),
            ApiError::Validation(errors) => ProblemDetails::validation(errors).into_response(),
            ApiError::Service(err) => {
                error!(error = %err, "to-do lookup failed");
                ProblemDetails::new(
                    SERVER_ERROR_TYPE,
                    "An error occurred while processing your request.",
                    StatusCode::INTERNAL_SERVER_ERROR,
                )
                .with_detail(err.to_string())
                .into_response()
            }
            ApiError::Body(err) => {
                let inner = err.into_inner();
                warn!(error = %inner, "could not buffer request body");
                if inner.is::<LengthLimitError>() {
                    ProblemDetails::new(
                        CONTENT_TOO_LARGE_TYPE,
                        "Request body too large.",
                        StatusCode::PAYLOAD_TOO_LARGE,
                    )
                    .into_response()
                } else {
                    ProblemDetails::new(
                        BAD_REQUEST_TYPE,
                        "Failed to read request body.",
                        StatusCode::BAD_REQUEST,
                    )
                    .with_detail(inner.to_string())
                    .into_response()
                }
            }
        }
    }
}
