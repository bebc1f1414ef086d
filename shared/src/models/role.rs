//! Role Model

use serde::{Deserialize, Serialize};

use super::permission::PermissionResource;
use crate::util::format_timestamp;

/// Role entity (RBAC 角色)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create role payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleCreate {
    pub name: String,
}

/// Update role payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleUpdate {
    pub name: String,
}

/// Replace a role's permission assignments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncPermissionsRequest {
    pub permission_ids: Vec<i64>,
}

/// Embedded role subset for related resources
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct RoleBrief {
    pub id: i64,
    pub name: String,
}

/// Canonical role response shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleResource {
    pub id: i64,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<PermissionResource>>,
}

impl From<Role> for RoleResource {
    fn from(role: Role) -> Self {
        Self {
            id: role.id,
            name: role.name,
            created_at: format_timestamp(role.created_at),
            updated_at: format_timestamp(role.updated_at),
            permissions: None,
        }
    }
}

impl RoleResource {
    pub fn with_permissions(mut self, permissions: Vec<PermissionResource>) -> Self {
        self.permissions = Some(permissions);
        self
    }
}
