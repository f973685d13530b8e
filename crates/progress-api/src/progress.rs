use axum::{
    Json,
    extract::{Query, State, rejection::{JsonRejection, QueryRejection}},
};
use tracing::debug;

use progress_db::Increment;
use progress_types::api::{CompletedResponse, IncrementRequest, MessageResponse, UsernameQuery};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::present;

/// GET /readCompleted?username=
pub async fn read_completed(
    State(state): State<AppState>,
    params: Result<Query<UsernameQuery>, QueryRejection>,
) -> Result<Json<CompletedResponse>, ApiError> {
    let Query(params) = params?;
    let username = present(params.username)
        .ok_or_else(|| ApiError::bad_request("Username not passed as parameter."))?;

    let completed = state.db.sequential().read_completed(&username).await?;
    Ok(Json(CompletedResponse { completed }))
}

/// POST /incrementCompleted
///
/// Always targets the sequential table; a `usertype` in the body is ignored.
/// An unknown username is not an error here: nothing is written and the
/// response is still 200.
pub async fn increment_completed(
    State(state): State<AppState>,
    payload: Result<Json<IncrementRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(req) = payload?;
    let username = present(req.username)
        .ok_or_else(|| ApiError::bad_request("Username not passed as a parameter."))?;

    if let Some(usertype) = req.usertype.as_deref().filter(|t| *t != "sequential") {
        debug!("Ignoring usertype '{}' on increment for {}", usertype, username);
    }

    let message = match state.db.sequential().increment_completed(&username).await? {
        Increment::Advanced | Increment::NoSuchUser => "Completed value incremented.",
        Increment::AtMaximum => "Completed value already at maximum.",
    };

    Ok(Json(MessageResponse::new(message)))
}
