//! Food Model

use serde::{Deserialize, Serialize};

use super::category::CategoryBrief;
use crate::util::format_timestamp;

/// Menu item entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Food {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
    /// Whole-percentage discount, 0-100; 0 means no reduction
    pub discount: i64,
    /// Relative path of the stored image asset
    pub image: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create food payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodCreate {
    pub category_id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub discount: i64,
}

/// Update food payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodUpdate {
    pub category_id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub discount: Option<i64>,
}

/// Canonical food response shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodResource {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub discount: i64,
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryBrief>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Food> for FoodResource {
    fn from(food: Food) -> Self {
        Self {
            id: food.id,
            name: food.name,
            description: food.description,
            price: food.price,
            discount: food.discount,
            image: food.image,
            category: None,
            created_at: format_timestamp(food.created_at),
            updated_at: format_timestamp(food.updated_at),
        }
    }
}

impl FoodResource {
    pub fn with_category(mut self, category: CategoryBrief) -> Self {
        self.category = Some(category);
        self
    }
}
