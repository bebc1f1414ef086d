//! Category Model

use serde::{Deserialize, Serialize};

use crate::util::format_timestamp;

/// Food category entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create category payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCreate {
    pub name: String,
}

/// Update category payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryUpdate {
    pub name: String,
}

/// Embedded category subset for related resources
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CategoryBrief {
    pub id: i64,
    pub name: String,
}

/// Canonical category response shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryResource {
    pub id: i64,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Category> for CategoryResource {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            created_at: format_timestamp(category.created_at),
            updated_at: format_timestamp(category.updated_at),
        }
    }
}
