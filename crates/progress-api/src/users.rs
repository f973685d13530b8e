use axum::{
    Json,
    extract::{Query, State, rejection::{JsonRejection, QueryRejection}},
};
use tracing::info;

use progress_types::api::{
    CreateUserRequest, DeleteUserRequest, MessageResponse, QueryResponse, UpdateTimeRequest,
    UsernameQuery,
};
use progress_types::models::UserType;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::present;

const INVALID_USERTYPE: &str = "Usertype must be 'sequential' or 'random'.";

fn parse_user_type(raw: &str) -> Result<UserType, ApiError> {
    raw.parse().map_err(|_| ApiError::bad_request(INVALID_USERTYPE))
}

/// POST /create
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(req) = payload?;
    let (Some(username), Some(usertype), Some(time)) =
        (present(req.username), present(req.usertype), present(req.time))
    else {
        return Err(ApiError::bad_request(
            "Username, usertype, or time not passed as a parameter.",
        ));
    };

    let user_type = parse_user_type(&usertype)?;
    let message = match user_type {
        UserType::Random => {
            state.db.random().create(&username, &time).await?;
            "Random user added successfully."
        }
        UserType::Sequential => {
            state.db.sequential().create(&username, &time).await?;
            "Sequential user added successfully."
        }
    };

    info!("Created {} user {}", user_type, username);
    Ok(Json(MessageResponse::new(message)))
}

/// DELETE /delete
pub async fn delete(
    State(state): State<AppState>,
    payload: Result<Json<DeleteUserRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(req) = payload?;
    let (Some(username), Some(usertype)) = (present(req.username), present(req.usertype)) else {
        return Err(ApiError::bad_request(
            "Username or usertype not passed as a parameter.",
        ));
    };

    let user_type = parse_user_type(&usertype)?;
    let message = match user_type {
        UserType::Random => {
            state.db.random().delete(&username).await?;
            "Random user deleted successfully."
        }
        UserType::Sequential => {
            state.db.sequential().delete(&username).await?;
            "Sequential user deleted successfully."
        }
    };

    info!("Deleted {} user {}", user_type, username);
    Ok(Json(MessageResponse::new(message)))
}

/// POST /updateTime
pub async fn update_time(
    State(state): State<AppState>,
    payload: Result<Json<UpdateTimeRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(req) = payload?;
    let (Some(username), Some(usertype), Some(time)) =
        (present(req.username), present(req.usertype), present(req.time))
    else {
        return Err(ApiError::bad_request(
            "Username, usertype or time not passed as a parameter.",
        ));
    };

    let user_type = parse_user_type(&usertype)?;
    let message = match user_type {
        UserType::Random => {
            state.db.random().update_time(&username, &time).await?;
            "Random user time updated successfully."
        }
        UserType::Sequential => {
            state.db.sequential().update_time(&username, &time).await?;
            "Sequential user time updated successfully."
        }
    };

    info!("Updated time of {} user {} to {}", user_type, username, time);
    Ok(Json(MessageResponse::new(message)))
}

/// GET /query?username=
pub async fn query(
    State(state): State<AppState>,
    params: Result<Query<UsernameQuery>, QueryRejection>,
) -> Result<Json<QueryResponse>, ApiError> {
    let Query(params) = params?;
    let username = present(params.username)
        .ok_or_else(|| ApiError::bad_request("Username not passed as parameter."))?;

    let usertype = state.db.lookup(&username).await?;
    Ok(Json(QueryResponse { usertype }))
}
