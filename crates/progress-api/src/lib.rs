pub mod auth;
pub mod error;
pub mod middleware;
pub mod progress;
pub mod users;

use std::any::Any;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use tower_http::catch_panic::CatchPanicLayer;

use progress_types::api::MessageResponse;

use crate::auth::AppState;
use crate::error::ApiError;

const WELCOME: &str = "Welcome to the API. Available routes are /create, /incrementCompleted, \
                       /updateTime, /delete, /readCompleted, /query";

/// Every route, behind the basic-auth gate.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/readCompleted", get(progress::read_completed))
        .route("/incrementCompleted", post(progress::increment_completed))
        .route("/create", post(users::create))
        .route("/updateTime", post(users::update_time))
        .route("/delete", delete(users::delete))
        .route("/query", get(users::query))
        .fallback(not_found)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_basic_auth,
        ))
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

async fn index() -> Json<MessageResponse> {
    Json(MessageResponse::new(WELCOME))
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(MessageResponse::new("Route not found.")),
    )
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    ApiError::Internal(format!("handler panicked: {}", detail)).into_response()
}

/// Treat absent and empty fields alike.
pub(crate) fn present(field: Option<String>) -> Option<String> {
    field.filter(|s| !s.is_empty())
}
