use serde::{Deserialize, Serialize};

use crate::models::UserKind;

// -- Requests --
//
// Every field is optional so that a missing field is reported with the
// route's own 400 message instead of a generic deserialization error.

#[derive(Debug, Default, Deserialize)]
pub struct CreateUserRequest {
    pub username: Option<String>,
    pub usertype: Option<String>,
    pub time: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTimeRequest {
    pub username: Option<String>,
    pub usertype: Option<String>,
    pub time: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteUserRequest {
    pub username: Option<String>,
    pub usertype: Option<String>,
}

/// `usertype` is accepted but never consulted: increments always hit the
/// sequential table.
#[derive(Debug, Default, Deserialize)]
pub struct IncrementRequest {
    pub username: Option<String>,
    pub usertype: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UsernameQuery {
    pub username: Option<String>,
}

// -- Responses --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedResponse {
    pub completed: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub usertype: UserKind,
}
