//! Order and Detail Order Models

use serde::{Deserialize, Serialize};

use crate::util::format_timestamp;

/// Order `status` value: open, accepting items
pub const STATUS_OPEN: &str = "N";
/// Order `status` value: closed by checkout, terminal
pub const STATUS_CLOSED: &str = "Y";
/// `details_complete` value: every line item has been served
pub const DETAILS_COMPLETE: &str = "Y";
/// `details_complete` value: unserved work remains
pub const DETAILS_PENDING: &str = "N";

/// Order aggregate root
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    /// Customer who opened the order
    pub user_id: i64,
    pub table_id: i64,
    /// `"N"` = open, `"Y"` = closed
    pub status: String,
    /// Derived: `"Y"` once every line item is served
    pub details_complete: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    pub fn is_open(&self) -> bool {
        self.status == STATUS_OPEN
    }
}

/// A single food + quantity line within an order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DetailOrder {
    pub id: i64,
    pub order_id: i64,
    pub food_id: i64,
    pub qty: i64,
    /// Set exactly once by the serve action, never cleared
    pub served_at: Option<i64>,
    pub tips: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// One requested line item inside an order placement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailOrderInput {
    pub food_id: i64,
    pub qty: i64,
    pub tips: Option<String>,
}

/// Order placement payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub table_number: i64,
    pub details: Vec<DetailOrderInput>,
}

/// Order plus its line items, as loaded by the repository
#[derive(Debug, Clone)]
pub struct OrderWithDetails {
    pub order: Order,
    pub details: Vec<DetailOrder>,
}

/// An unserved line item on the kitchen queue
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct UnservedItem {
    pub id: i64,
    pub order_id: i64,
    pub food_id: i64,
    pub food_name: String,
    pub qty: i64,
    pub tips: Option<String>,
    pub table_number: i64,
    pub created_at: i64,
}

/// Canonical line item response shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailOrderResource {
    pub id: i64,
    pub order_id: i64,
    pub food_id: i64,
    pub qty: i64,
    pub tips: Option<String>,
    pub served_at: Option<String>,
    pub created_at: String,
}

impl From<DetailOrder> for DetailOrderResource {
    fn from(detail: DetailOrder) -> Self {
        Self {
            id: detail.id,
            order_id: detail.order_id,
            food_id: detail.food_id,
            qty: detail.qty,
            tips: detail.tips,
            served_at: detail.served_at.map(format_timestamp),
            created_at: format_timestamp(detail.created_at),
        }
    }
}

/// Canonical order response shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResource {
    pub id: i64,
    pub user_id: i64,
    pub table_id: i64,
    pub status: String,
    pub details_complete: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<DetailOrderResource>>,
}

impl From<Order> for OrderResource {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            table_id: order.table_id,
            status: order.status,
            details_complete: order.details_complete,
            created_at: format_timestamp(order.created_at),
            updated_at: format_timestamp(order.updated_at),
            details: None,
        }
    }
}

impl From<OrderWithDetails> for OrderResource {
    fn from(loaded: OrderWithDetails) -> Self {
        let mut resource = OrderResource::from(loaded.order);
        resource.details = Some(
            loaded
                .details
                .into_iter()
                .map(DetailOrderResource::from)
                .collect(),
        );
        resource
    }
}
