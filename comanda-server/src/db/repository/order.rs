//! Order Repository
//!
//! The order aggregate carries the consistency core: at most one open
//! order per table (partial unique index + upsert), `details_complete`
//! recomputed after every serve, and the table-occupancy precondition on
//! placement.

use super::{RepoError, RepoResult};
use crate::db::filter;
use shared::models::{
    DetailOrder, DetailOrderInput, Order, OrderWithDetails, UnservedItem, DETAILS_COMPLETE,
    DETAILS_PENDING, OCCUPIED, STATUS_OPEN,
};
use shared::query::ListQuery;
use shared::response::Pagination;
use shared::util::{now_millis, snowflake_id};
use sqlx::{Sqlite, SqlitePool, Transaction};

const SELECT: &str =
    "SELECT id, user_id, table_id, status, details_complete, created_at, updated_at FROM orders";
const COUNT: &str = "SELECT COUNT(*) FROM orders";

const DETAIL_SELECT: &str =
    "SELECT id, order_id, food_id, qty, served_at, tips, created_at, updated_at FROM detail_orders";

const SORTABLE: &[(&str, &str)] = &[
    ("id", "id"),
    ("status", "status"),
    ("details_complete", "details_complete"),
    ("created_at", "created_at"),
    ("updated_at", "updated_at"),
];

pub async fn list(
    pool: &SqlitePool,
    query: &ListQuery,
) -> RepoResult<(Vec<Order>, Option<Pagination>)> {
    let order = filter::order_clause(query, SORTABLE);
    filter::fetch_list(pool, SELECT, COUNT, Vec::new(), order, query).await
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let sql = format!("{SELECT} WHERE id = ?");
    let order = sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(order)
}

pub async fn details_of(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<DetailOrder>> {
    let sql = format!("{DETAIL_SELECT} WHERE order_id = ? ORDER BY created_at");
    let details = sqlx::query_as::<_, DetailOrder>(&sql)
        .bind(order_id)
        .fetch_all(pool)
        .await?;
    Ok(details)
}

pub async fn find_with_details(
    pool: &SqlitePool,
    id: i64,
) -> RepoResult<Option<OrderWithDetails>> {
    let Some(order) = find_by_id(pool, id).await? else {
        return Ok(None);
    };
    let details = details_of(pool, order.id).await?;
    Ok(Some(OrderWithDetails { order, details }))
}

/// Current open order of a table, with its line items
pub async fn find_open_by_table(
    pool: &SqlitePool,
    table_id: i64,
) -> RepoResult<Option<OrderWithDetails>> {
    let sql = format!("{SELECT} WHERE table_id = ? AND status = ?");
    let order = sqlx::query_as::<_, Order>(&sql)
        .bind(table_id)
        .bind(STATUS_OPEN)
        .fetch_optional(pool)
        .await?;

    let Some(order) = order else {
        return Ok(None);
    };
    let details = details_of(pool, order.id).await?;
    Ok(Some(OrderWithDetails { order, details }))
}

/// All unserved line items under open orders, oldest first (kitchen queue)
pub async fn unserved_queue(pool: &SqlitePool) -> RepoResult<Vec<UnservedItem>> {
    let items = sqlx::query_as::<_, UnservedItem>(
        "SELECT d.id, d.order_id, d.food_id, f.name AS food_name, d.qty, d.tips, \
         t.number AS table_number, d.created_at \
         FROM detail_orders d \
         JOIN orders o ON d.order_id = o.id \
         JOIN foods f ON d.food_id = f.id \
         JOIN tables t ON o.table_id = t.id \
         WHERE o.status = ? AND d.served_at IS NULL \
         ORDER BY d.created_at",
    )
    .bind(STATUS_OPEN)
    .fetch_all(pool)
    .await?;
    Ok(items)
}

/// Place an order on an occupied table.
///
/// Re-uses the table's open order when one exists, otherwise creates it.
/// The whole placement is one database transaction; the partial unique
/// index on `(table_id) WHERE status = 'N'` makes concurrent placements
/// converge on a single open order instead of racing a second one in.
pub async fn place(
    pool: &SqlitePool,
    user_id: i64,
    table_number: i64,
    details: &[DetailOrderInput],
) -> RepoResult<OrderWithDetails> {
    // The table must exist and already be seated
    let table: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM tables WHERE number = ? AND available = ?")
            .bind(table_number)
            .bind(OCCUPIED)
            .fetch_optional(pool)
            .await?;
    let Some((table_id,)) = table else {
        return Err(RepoError::Business("Table is not found or not ready.".into()));
    };

    // Every requested food must resolve
    for detail in details {
        let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM foods WHERE id = ?")
            .bind(detail.food_id)
            .fetch_optional(pool)
            .await?;
        if exists.is_none() {
            return Err(RepoError::Validation(format!(
                "Food {} does not exist",
                detail.food_id
            )));
        }
    }

    let now = now_millis();

    // The transaction opens with the write so it takes the writer lock up
    // front instead of upgrading a stale read snapshot mid-way.
    let mut tx = pool.begin().await?;

    // Open order, or claim the slot; the conflict target is the partial
    // unique index, so a lost race simply falls through to the re-select.
    sqlx::query(
        "INSERT INTO orders (id, user_id, table_id, status, details_complete, created_at, updated_at) \
         VALUES (?, ?, ?, 'N', 'N', ?, ?) \
         ON CONFLICT (table_id) WHERE status = 'N' DO NOTHING",
    )
    .bind(snowflake_id())
    .bind(user_id)
    .bind(table_id)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    let sql = format!("{SELECT} WHERE table_id = ? AND status = ?");
    let order = sqlx::query_as::<_, Order>(&sql)
        .bind(table_id)
        .bind(STATUS_OPEN)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to open order".into()))?;

    // New unserved work exists again
    sqlx::query("UPDATE orders SET details_complete = ?, updated_at = ? WHERE id = ?")
        .bind(DETAILS_PENDING)
        .bind(now)
        .bind(order.id)
        .execute(&mut *tx)
        .await?;

    for detail in details {
        sqlx::query(
            "INSERT INTO detail_orders (id, order_id, food_id, qty, tips, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(snowflake_id())
        .bind(order.id)
        .bind(detail.food_id)
        .bind(detail.qty)
        .bind(detail.tips.as_deref())
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    find_with_details(pool, order.id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to load placed order".into()))
}

async fn recompute_details_complete(
    tx: &mut Transaction<'_, Sqlite>,
    order_id: i64,
    now: i64,
) -> RepoResult<()> {
    // Only open orders count; a closed order keeps its final flag
    let unserved: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM detail_orders d \
         JOIN orders o ON d.order_id = o.id \
         WHERE d.order_id = ? AND o.status = ? AND d.served_at IS NULL",
    )
    .bind(order_id)
    .bind(STATUS_OPEN)
    .fetch_one(&mut **tx)
    .await?;

    if unserved == 0 {
        sqlx::query("UPDATE orders SET details_complete = ?, updated_at = ? WHERE id = ?")
            .bind(DETAILS_COMPLETE)
            .bind(now)
            .bind(order_id)
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}

/// Mark a line item as served and refresh the order's completion flag.
///
/// The timestamp is written once: re-serving an already-served item keeps
/// the original `served_at`.
pub async fn serve_detail(
    pool: &SqlitePool,
    order_id: i64,
    detail_id: i64,
) -> RepoResult<OrderWithDetails> {
    let detail: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM detail_orders WHERE id = ? AND order_id = ?")
            .bind(detail_id)
            .bind(order_id)
            .fetch_optional(pool)
            .await?;
    if detail.is_none() {
        return Err(RepoError::NotFound("Detail order not found.".into()));
    }

    let now = now_millis();
    let mut tx = pool.begin().await?;
    sqlx::query(
        "UPDATE detail_orders SET served_at = ?, updated_at = ? \
         WHERE id = ? AND order_id = ? AND served_at IS NULL",
    )
    .bind(now)
    .bind(now)
    .bind(detail_id)
    .bind(order_id)
    .execute(&mut *tx)
    .await?;

    recompute_details_complete(&mut tx, order_id, now).await?;

    tx.commit().await?;

    find_with_details(pool, order_id)
        .await?
        .ok_or_else(|| RepoError::NotFound("Order not found.".into()))
}

/// Hard delete; line items cascade with the order
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM orders WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound("Order not found.".into()));
    }
    Ok(true)
}

/// Hard delete one line item. An order left with zero items remains a
/// valid open order.
pub async fn delete_detail(pool: &SqlitePool, order_id: i64, detail_id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM detail_orders WHERE id = ? AND order_id = ?")
        .bind(detail_id)
        .bind(order_id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound("Detail order not found.".into()));
    }
    Ok(true)
}
