//! In-memory to-do HTTP service.
//!
//! # Overview
//! Four endpoints over an ordered in-memory list:
//! `GET /todos`, `GET /todos/{id}`, `POST /todos`, `DELETE /todos/{id}`.
//! Requests to `/tasks/...` are served as `/todos/...`.
//!
//! # Design
//! - [`service::TodoService`] owns the storage behind one `RwLock`.
//! - [`routes::router`] maps HTTP onto the service and attaches request
//!   logging and the creation filter from [`middleware`].
//! - [`app`] wraps the router in the path rewrite, which has to run before
//!   routing and therefore sits outside the `Router`.

pub mod config;
pub mod error;
pub mod middleware;
pub mod model;
pub mod routes;
pub mod service;
pub mod validation;

use std::{future::Future, sync::Arc};

use axum::{extract::Request, Router, ServiceExt};
use tokio::net::TcpListener;
use tower::{
    util::{MapRequest, MapRequestLayer},
    Layer,
};

pub use config::Config;
pub use error::{ApiError, ProblemDetails};
pub use model::Todo;
pub use service::{ServiceError, SharedService, TodoService};

/// The complete application: rewrite, then the routed app.
pub type App = MapRequest<Router, fn(Request) -> Request>;

/// Builds the app over a fresh, empty store.
pub fn app() -> App {
    app_with_service(Arc::new(TodoService::new()))
}

/// Builds the app over `service`, so callers can inspect or pre-seed storage.
pub fn app_with_service(service: SharedService) -> App {
    let rewrite: fn(Request) -> Request = middleware::rewrite_request_uri;
    MapRequestLayer::new(rewrite).layer(routes::router(service))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_until(listener, std::future::pending()).await
}

/// Serves until `shutdown` resolves, then drains in-flight requests.
pub async fn run_until<F>(listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = ServiceExt::<Request>::into_make_service(app());
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}
