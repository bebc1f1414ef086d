//! Transaction Model

use serde::{Deserialize, Serialize};

use super::order::OrderResource;
use crate::util::format_timestamp;

/// Checkout record — exactly one per closed order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Transaction {
    pub id: i64,
    pub order_id: i64,
    /// Cashier who performed the checkout
    pub user_id: i64,
    pub total_price: f64,
    pub created_at: i64,
}

/// Checkout payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionCreate {
    pub order_id: i64,
}

/// Canonical transaction response shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionResource {
    pub id: i64,
    pub order_id: i64,
    pub user_id: i64,
    pub total_price: f64,
    pub created_at: String,
}

impl From<Transaction> for TransactionResource {
    fn from(tx: Transaction) -> Self {
        Self {
            id: tx.id,
            order_id: tx.order_id,
            user_id: tx.user_id,
            total_price: tx.total_price,
            created_at: format_timestamp(tx.created_at),
        }
    }
}

/// Transaction detail view with its order (and the order's line items)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionWithOrder {
    #[serde(flatten)]
    pub transaction: TransactionResource,
    pub order: OrderResource,
}
