//! Request interceptors.
//!
//! Order, outermost first:
//! 1. [`rewrite_request_uri`] renames `.../tasks/...` to `/todos/...` before
//!    routing sees the request.
//! 2. [`log_request`] records the start and end of every request.
//! 3. [`validate_todo`] is scoped to `POST /todos` and runs before the handler.

use std::time::Instant;

use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::{header, uri::PathAndQuery, HeaderMap, Method, StatusCode, Uri},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::model::Todo;
use crate::validation::validate_new_todo;

/// Largest body the create filter will buffer. Matches axum's default `Json` limit.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

const REWRITE_FROM: &str = "tasks/";
const REWRITE_TO: &str = "/todos/";

/// Maps any path containing `tasks/<rest>` to `/todos/<rest>`, so
/// `/tasks/5`, `/api/tasks/5` and `/mytasks/5` all become `/todos/5`.
/// The first occurrence wins; paths without `tasks/` are left alone.
pub fn rewrite_path(path: &str) -> Option<String> {
    let start = path.find(REWRITE_FROM)?;
    let rest = &path[start + REWRITE_FROM.len()..];
    Some(format!("{REWRITE_TO}{rest}"))
}

/// Applies [`rewrite_path`] to the request URI, keeping the query string.
pub fn rewrite_request_uri(mut request: Request) -> Request {
    let Some(path) = rewrite_path(request.uri().path()) else {
        return request;
    };
    let path_and_query = match request.uri().query() {
        Some(query) => format!("{path}?{query}"),
        None => path,
    };

    let mut parts = request.uri().clone().into_parts();
    parts.path_and_query = match PathAndQuery::try_from(path_and_query) {
        Ok(pq) => Some(pq),
        Err(e) => {
            warn!(uri = %request.uri(), "rewritten path is not valid: {e}");
            return request;
        }
    };
    match Uri::from_parts(parts) {
        Ok(uri) => {
            debug!(from = %request.uri(), to = %uri, "rewrote request uri");
            *request.uri_mut() = uri;
        }
        Err(e) => warn!(uri = %request.uri(), "could not rebuild uri: {e}"),
    }
    request
}

/// Emits the "finished" event when dropped, so it fires however the
/// request ends: a response, a panic, or the connection going away.
struct RequestLog {
    method: Method,
    path: String,
    started: Instant,
    status: Option<StatusCode>,
}

impl RequestLog {
    fn start(method: Method, path: String) -> Self {
        info!(%method, %path, at = %Utc::now(), "started");
        Self {
            method,
            path,
            started: Instant::now(),
            status: None,
        }
    }
}

impl Drop for RequestLog {
    fn drop(&mut self) {
        let elapsed_ms = self.started.elapsed().as_millis() as u64;
        match self.status {
            Some(status) => info!(
                method = %self.method,
                path = %self.path,
                at = %Utc::now(),
                status = status.as_u16(),
                elapsed_ms,
                "finished"
            ),
            None => warn!(
                method = %self.method,
                path = %self.path,
                at = %Utc::now(),
                elapsed_ms,
                "finished without a response"
            ),
        }
    }
}

pub async fn log_request(request: Request, next: Next) -> Response {
    let mut log = RequestLog::start(request.method().clone(), request.uri().path().to_owned());
    let response = next.run(request).await;
    log.status = Some(response.status());
    response
}

/// True for `application/json` and `application/*+json`, parameters ignored.
fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let essence = value.split(';').next().unwrap_or_default().trim();
    let Some((kind, subtype)) = essence.split_once('/') else {
        return false;
    };
    kind.eq_ignore_ascii_case("application")
        && (subtype.eq_ignore_ascii_case("json")
            || subtype.to_ascii_lowercase().ends_with("+json"))
}

/// Endpoint filter for creating a to-do.
///
/// Buffers the body and, when it is declared as JSON and decodes as a
/// [`Todo`], applies the creation rules. Anything else is passed through
/// unchanged so the handler's `Json` extractor reports it (415 for a missing
/// or foreign content type, 400/422 for bad JSON).
pub async fn validate_todo(request: Request, next: Next) -> Result<Response, ApiError> {
    if !is_json_content_type(request.headers()) {
        return Ok(next.run(request).await);
    }
    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, MAX_BODY_BYTES).await?;

    if let Ok(todo) = serde_json::from_slice::<Todo>(&bytes) {
        if let Err(errors) = validate_new_todo(&todo, Utc::now()) {
            let fields: Vec<&str> = errors.fields().collect();
            debug!(id = todo.id, ?fields, "rejected new to-do");
            return Err(ApiError::Validation(errors));
        }
    }

    Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await)
}
