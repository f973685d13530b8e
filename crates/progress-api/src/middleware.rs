use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Basic};
use tracing::warn;

use crate::auth::AppState;
use crate::error::ApiError;

/// Check HTTP Basic credentials before any route logic runs.
pub async fn require_basic_auth(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let presented = req.headers().typed_get::<Authorization<Basic>>();

    let authorized = match (&state.credentials, presented) {
        (Some(expected), Some(auth)) => expected.matches(auth.username(), auth.password()),
        _ => false,
    };

    if !authorized {
        warn!("Rejected unauthorized {} {}", req.method(), req.uri().path());
        return ApiError::Unauthorized.into_response();
    }

    next.run(req).await
}
