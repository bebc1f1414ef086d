//! Permission Repository
//!
//! Permissions are read-mostly: seeded at first start, listed and
//! exported/imported by the back office, never edited over the API.

use super::RepoResult;
use crate::db::filter;
use shared::models::Permission;
use shared::query::ListQuery;
use shared::response::Pagination;
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;

const SELECT: &str = "SELECT id, name, created_at, updated_at FROM permissions";
const COUNT: &str = "SELECT COUNT(*) FROM permissions";

const SEARCHABLE: &[(&str, &str)] = &[("name", "name")];

const SORTABLE: &[(&str, &str)] = &[
    ("id", "id"),
    ("name", "name"),
    ("created_at", "created_at"),
    ("updated_at", "updated_at"),
];

pub async fn list(
    pool: &SqlitePool,
    query: &ListQuery,
) -> RepoResult<(Vec<Permission>, Option<Pagination>)> {
    let conditions = filter::search_condition(query, SEARCHABLE)
        .into_iter()
        .collect();
    let order = filter::order_clause(query, SORTABLE);
    filter::fetch_list(pool, SELECT, COUNT, conditions, order, query).await
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Permission>> {
    let sql = format!("{SELECT} ORDER BY name");
    let permissions = sqlx::query_as::<_, Permission>(&sql).fetch_all(pool).await?;
    Ok(permissions)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Permission>> {
    let sql = format!("{SELECT} WHERE id = ?");
    let permission = sqlx::query_as::<_, Permission>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(permission)
}

/// Insert a row verbatim (spreadsheet import); duplicates are left to the
/// store's uniqueness constraint
pub async fn insert_imported(pool: &SqlitePool, name: &str) -> RepoResult<()> {
    sqlx::query("INSERT INTO permissions (id, name, created_at, updated_at) VALUES (?, ?, ?, ?)")
        .bind(snowflake_id())
        .bind(name)
        .bind(now_millis())
        .bind(now_millis())
        .execute(pool)
        .await?;
    Ok(())
}
