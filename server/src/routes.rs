use axum::{
    extract::{Path, State},
    handler::Handler,
    http::{header, StatusCode},
    middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::error::ApiError;
use crate::middleware::{log_request, validate_todo};
use crate::model::Todo;
use crate::service::SharedService;

/// The route table, with request logging around every route and the
/// creation filter on `POST /todos` only.
pub fn router(service: SharedService) -> Router {
    Router::new()
        .route(
            "/todos",
            get(list_todos).post(create_todo.layer(middleware::from_fn(validate_todo))),
        )
        .route("/todos/{id}", get(get_todo).delete(delete_todo))
        .fallback(not_found)
        .layer(middleware::from_fn(log_request))
        .with_state(service)
}

async fn list_todos(State(service): State<SharedService>) -> Json<Vec<Todo>> {
    Json(service.list_todos().await)
}

async fn get_todo(
    State(service): State<SharedService>,
    Path(id): Path<i32>,
) -> Result<Json<Todo>, ApiError> {
    service
        .get_todo_by_id(id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound(id))
}

async fn create_todo(
    State(service): State<SharedService>,
    Json(todo): Json<Todo>,
) -> impl IntoResponse {
    let todo = service.add_todo(todo).await;
    let location = format!("/todos/{}", todo.id);
    (StatusCode::CREATED, [(header::LOCATION, location)], Json(todo))
}

async fn delete_todo(State(service): State<SharedService>, Path(id): Path<i32>) -> StatusCode {
    service.delete_todo_by_id(id).await;
    StatusCode::NO_CONTENT
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
