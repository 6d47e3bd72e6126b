use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use validator::Validate;

string_enum! {
    /// Role
    ///
    /// RBAC level of an account. `author` is assigned at registration;
    /// `editor` and `admin` can manage categories, pages and comments.
    Role("role") {
        Admin => "admin",
        Editor => "editor",
        #[default]
        Author => "author",
    }
}

/// User
///
/// Canonical account row from the `users` table. Never serialized directly:
/// the password hash must not leave the server.
#[derive(Debug, Clone, FromRow, Default)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    #[sqlx(rename = "password")]
    pub password_hash: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a new account; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// UserSummary
///
/// Identity returned next to a freshly issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UserSummary {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// UserProfile
///
/// Output schema for `GET /auth/profile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UserProfile {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: Role,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ProfileResponse {
    pub user: UserProfile,
}

/// RegisterRequest
///
/// Input payload for `POST /auth/register`. New accounts always get the `author` role.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct RegisterRequest {
    #[serde(deserialize_with = "crate::validation::trimmed")]
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,
    #[serde(deserialize_with = "crate::validation::trimmed")]
    #[validate(
        email(message = "Valid email required"),
        length(max = 100, message = "Email must be at most 100 characters")
    )]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// LoginRequest
///
/// Input payload for `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct LoginRequest {
    #[serde(deserialize_with = "crate::validation::trimmed")]
    #[validate(email(message = "Valid email required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// AuthResponse
///
/// Returned by both register and login.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: UserSummary,
}
