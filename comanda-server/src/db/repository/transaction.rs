//! Transaction Repository
//!
//! Checkout is the one multi-entity write in the system and runs as a
//! single database transaction: claim the open order, price it, insert
//! the transaction row, free the table. Either all of it lands or none.

use super::{order, RepoError, RepoResult};
use crate::db::filter::{self, Condition};
use crate::money;
use shared::models::{OrderWithDetails, Transaction, AVAILABLE, STATUS_CLOSED, STATUS_OPEN};
use shared::query::ListQuery;
use shared::response::Pagination;
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;

const SELECT: &str = "SELECT id, order_id, user_id, total_price, created_at FROM transactions";
const COUNT: &str = "SELECT COUNT(*) FROM transactions";

const SEARCHABLE: &[(&str, &str)] = &[("total_price", "total_price")];

const SORTABLE: &[(&str, &str)] = &[
    ("id", "id"),
    ("order_id", "order_id"),
    ("user_id", "user_id"),
    ("total_price", "total_price"),
    ("created_at", "created_at"),
];

pub async fn list(
    pool: &SqlitePool,
    query: &ListQuery,
) -> RepoResult<(Vec<Transaction>, Option<Pagination>)> {
    let conditions: Vec<Condition> = filter::search_condition(query, SEARCHABLE)
        .into_iter()
        .collect();
    let order = filter::order_clause(query, SORTABLE);
    filter::fetch_list(pool, SELECT, COUNT, conditions, order, query).await
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Transaction>> {
    let sql = format!("{SELECT} WHERE id = ?");
    let tx = sqlx::query_as::<_, Transaction>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(tx)
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Transaction>> {
    let sql = format!("{SELECT} ORDER BY created_at");
    let rows = sqlx::query_as::<_, Transaction>(&sql)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Transaction with its (closed) order and line items
pub async fn find_with_order(
    pool: &SqlitePool,
    id: i64,
) -> RepoResult<Option<(Transaction, OrderWithDetails)>> {
    let Some(tx) = find_by_id(pool, id).await? else {
        return Ok(None);
    };
    let order = order::find_with_details(pool, tx.order_id)
        .await?
        .ok_or_else(|| RepoError::Database("Transaction order missing".into()))?;
    Ok(Some((tx, order)))
}

/// Close an open order: compute the total, record the transaction, flip
/// the order to closed and free its table — atomically.
///
/// The conditional status flip doubles as the double-checkout guard: a
/// concurrent second checkout affects zero rows and reports the order as
/// not found, it never charges twice.
pub async fn checkout(
    pool: &SqlitePool,
    order_id: i64,
    cashier_id: i64,
) -> RepoResult<Transaction> {
    let mut tx = pool.begin().await?;
    let now = now_millis();

    // Claim the open order; losing the race means there is nothing open
    let claimed = sqlx::query(
        "UPDATE orders SET status = ?, updated_at = ? WHERE id = ? AND status = ?",
    )
    .bind(STATUS_CLOSED)
    .bind(now)
    .bind(order_id)
    .bind(STATUS_OPEN)
    .execute(&mut *tx)
    .await?;
    if claimed.rows_affected() == 0 {
        return Err(RepoError::NotFound("Order not found.".into()));
    }

    // Price every line item with its food's current price and discount
    let lines: Vec<(f64, i64, i64)> = sqlx::query_as(
        "SELECT f.price, f.discount, d.qty \
         FROM detail_orders d \
         JOIN foods f ON d.food_id = f.id \
         WHERE d.order_id = ?",
    )
    .bind(order_id)
    .fetch_all(&mut *tx)
    .await?;

    let total_price = money::order_total(lines);

    let transaction_id = snowflake_id();
    sqlx::query(
        "INSERT INTO transactions (id, order_id, user_id, total_price, created_at) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(transaction_id)
    .bind(order_id)
    .bind(cashier_id)
    .bind(total_price)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    // Free the table the order was occupying
    sqlx::query(
        "UPDATE tables SET available = ?, updated_at = ? \
         WHERE id = (SELECT table_id FROM orders WHERE id = ?)",
    )
    .bind(AVAILABLE)
    .bind(now)
    .bind(order_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    find_by_id(pool, transaction_id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to record transaction".into()))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM transactions WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound("Transaction not found.".into()));
    }
    Ok(true)
}

/// Insert a row verbatim (spreadsheet import); row data is trusted
pub async fn insert_imported(
    pool: &SqlitePool,
    order_id: i64,
    user_id: i64,
    total_price: f64,
) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO transactions (id, order_id, user_id, total_price, created_at) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(snowflake_id())
    .bind(order_id)
    .bind(user_id)
    .bind(total_price)
    .bind(now_millis())
    .execute(pool)
    .await?;
    Ok(())
}
