//! User domain models and DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::ids::UserId;

/// A row of the `users` table.
///
/// `password_hash` is `None` for accounts that only authenticate through an
/// external identity provider. `legacy_role` is the pre-RBAC single role
/// column, read only by the legacy role migration.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct UserRecord {
    pub id: UserId,
    pub email: Option<String>,
    pub pseudo: Option<String>,
    pub password_hash: Option<String>,
    pub legacy_role: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for the `users` table. The email is stored as given.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub email: Option<String>,
    pub pseudo: Option<String>,
    pub password_hash: Option<String>,
    pub legacy_role: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub pseudo: Option<String>,
}

/// Public projection of a user. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub email: Option<String>,
    pub pseudo: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<UserRecord> for UserResponse {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            email: user.email,
            pseudo: user.pseudo,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUserResponse {
    pub user: UserResponse,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
}
