//! User Model

use serde::{Deserialize, Serialize};

use super::role::RoleBrief;
use crate::util::format_timestamp;

/// Back-office / floor user entity
///
/// The password hash never serializes; administrative export is the
/// single deliberate exception and reads the field directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub name: String,
    pub username: String,
    /// Argon2 hash
    #[serde(skip_serializing)]
    #[serde(default)]
    pub password: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create user payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub name: String,
    pub username: String,
    pub password: String,
}

/// Update user payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Replace a user's role assignments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncRolesRequest {
    pub roles_ids: Vec<i64>,
}

/// Canonical user response shape (password excluded)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResource {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<RoleBrief>>,
}

impl From<User> for UserResource {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            username: user.username,
            created_at: format_timestamp(user.created_at),
            updated_at: format_timestamp(user.updated_at),
            roles: None,
        }
    }
}

impl UserResource {
    pub fn with_roles(mut self, roles: Vec<RoleBrief>) -> Self {
        self.roles = Some(roles);
        self
    }
}
