//! Permission Model

use serde::{Deserialize, Serialize};

use crate::util::format_timestamp;

/// Permission entity — a `<context>.<ability>` string such as `table.update`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Permission {
    pub id: i64,
    pub name: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Canonical permission response shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionResource {
    pub id: i64,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Permission> for PermissionResource {
    fn from(permission: Permission) -> Self {
        Self {
            id: permission.id,
            name: permission.name,
            created_at: format_timestamp(permission.created_at),
            updated_at: format_timestamp(permission.updated_at),
        }
    }
}
