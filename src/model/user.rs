use crate::util::common::millis_to_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Serialize, FromRow, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub title: String,
    pub is_moderator: bool,
    pub is_admin: bool,
    pub created_at: i64,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Author {
    pub username: String,
    pub title: String,
    pub is_moderator: bool,
    pub is_admin: bool,
    pub joined: DateTime<Utc>,
}

impl From<&User> for Author {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            title: user.title.clone(),
            is_moderator: user.is_moderator,
            is_admin: user.is_admin,
            joined: millis_to_datetime(user.created_at),
        }
    }
}

/// The identity attached to a request by the session middleware.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}
