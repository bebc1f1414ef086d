//! Dining Table Repository

use super::{RepoError, RepoResult};
use crate::db::filter::{self, Condition};
use shared::models::{DiningTable, DiningTableCreate, DiningTableUpdate, AVAILABLE, OCCUPIED};
use shared::query::ListQuery;
use shared::response::Pagination;
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;

const SELECT: &str = "SELECT id, number, available, created_at, updated_at FROM tables";
const COUNT: &str = "SELECT COUNT(*) FROM tables";

/// Sortable fields exposed on the collection endpoint
const SORTABLE: &[(&str, &str)] = &[
    ("id", "id"),
    ("number", "number"),
    ("available", "available"),
    ("created_at", "created_at"),
    ("updated_at", "updated_at"),
];

pub async fn list(
    pool: &SqlitePool,
    query: &ListQuery,
    number: Option<i64>,
    available: Option<&str>,
) -> RepoResult<(Vec<DiningTable>, Option<Pagination>)> {
    let mut conditions = Vec::new();
    if let Some(number) = number {
        conditions.push(Condition::eq_int("number", number));
    }
    if let Some(available) = available {
        conditions.push(Condition::eq_text("available", available.to_uppercase()));
    }

    let order = filter::order_clause(query, SORTABLE);
    filter::fetch_list(pool, SELECT, COUNT, conditions, order, query).await
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<DiningTable>> {
    let sql = format!("{SELECT} WHERE id = ?");
    let table = sqlx::query_as::<_, DiningTable>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(table)
}

pub async fn find_by_number(pool: &SqlitePool, number: i64) -> RepoResult<Option<DiningTable>> {
    let sql = format!("{SELECT} WHERE number = ?");
    let table = sqlx::query_as::<_, DiningTable>(&sql)
        .bind(number)
        .fetch_optional(pool)
        .await?;
    Ok(table)
}

pub async fn create(pool: &SqlitePool, data: DiningTableCreate) -> RepoResult<DiningTable> {
    if find_by_number(pool, data.number).await?.is_some() {
        return Err(RepoError::Duplicate(format!(
            "Table {} already exists",
            data.number
        )));
    }

    let id = snowflake_id();
    let now = now_millis();
    sqlx::query(
        "INSERT INTO tables (id, number, available, created_at, updated_at) VALUES (?, ?, 'Y', ?, ?)",
    )
    .bind(id)
    .bind(data.number)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create table".into()))
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: DiningTableUpdate,
) -> RepoResult<DiningTable> {
    let existing = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound("Table not found.".into()))?;

    if let Some(number) = data.number
        && number != existing.number
        && find_by_number(pool, number).await?.is_some()
    {
        return Err(RepoError::Duplicate(format!(
            "Table {number} already exists"
        )));
    }

    let available = data.available.map(|a| a.to_uppercase());
    let now = now_millis();
    let rows = sqlx::query(
        "UPDATE tables SET number = COALESCE(?1, number), available = COALESCE(?2, available), updated_at = ?3 WHERE id = ?4",
    )
    .bind(data.number)
    .bind(available)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound("Table not found.".into()));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound("Table not found.".into()))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM tables WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound("Table not found.".into()));
    }
    Ok(true)
}

/// Seat a table: conditional flip `Y → N`.
///
/// Exactly one of two concurrent seat attempts wins — the loser sees zero
/// affected rows and gets the busy error.
pub async fn seat(pool: &SqlitePool, number: i64) -> RepoResult<DiningTable> {
    let rows = sqlx::query(
        "UPDATE tables SET available = ?, updated_at = ? WHERE number = ? AND available = ?",
    )
    .bind(OCCUPIED)
    .bind(now_millis())
    .bind(number)
    .bind(AVAILABLE)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return match find_by_number(pool, number).await? {
            Some(_) => Err(RepoError::Business("The table is busy.".into())),
            None => Err(RepoError::NotFound("Table not found.".into())),
        };
    }

    find_by_number(pool, number)
        .await?
        .ok_or_else(|| RepoError::NotFound("Table not found.".into()))
}

/// Free a table. Idempotent: releasing an already-free or unknown table
/// is a no-op, not an error.
pub async fn release(pool: &SqlitePool, number: i64) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE tables SET available = ?, updated_at = ? WHERE number = ? AND available = ?",
    )
    .bind(AVAILABLE)
    .bind(now_millis())
    .bind(number)
    .bind(OCCUPIED)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Seat `number` and/or free `old_number` as one atomic unit.
///
/// Used by the floor kiosk: seat only, release only (logout), or a full
/// reassignment — in which case no reader ever observes a half-applied
/// move.
pub async fn set_table(
    pool: &SqlitePool,
    number: Option<i64>,
    old_number: Option<i64>,
) -> RepoResult<()> {
    if let Some(number) = number {
        let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM tables WHERE number = ?")
            .bind(number)
            .fetch_optional(pool)
            .await?;
        if exists.is_none() {
            return Err(RepoError::NotFound("Table not found.".into()));
        }
    }

    let mut tx = pool.begin().await?;
    let now = now_millis();

    if let Some(number) = number {
        let rows = sqlx::query(
            "UPDATE tables SET available = ?, updated_at = ? WHERE number = ? AND available = ?",
        )
        .bind(OCCUPIED)
        .bind(now)
        .bind(number)
        .bind(AVAILABLE)
        .execute(&mut *tx)
        .await?;
        if rows.rows_affected() == 0 {
            return Err(RepoError::Business("The table is busy.".into()));
        }
    }

    if let Some(old_number) = old_number {
        sqlx::query(
            "UPDATE tables SET available = ?, updated_at = ? WHERE number = ? AND available = ?",
        )
        .bind(AVAILABLE)
        .bind(now)
        .bind(old_number)
        .bind(OCCUPIED)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}
