//! Category Repository

use super::{RepoError, RepoResult};
use crate::db::filter;
use shared::models::{Category, CategoryCreate, CategoryUpdate};
use shared::query::ListQuery;
use shared::response::Pagination;
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;

const SELECT: &str = "SELECT id, name, created_at, updated_at FROM categories";
const COUNT: &str = "SELECT COUNT(*) FROM categories";

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
) -> RepoResult<(Vec<Category>, Option<Pagination>)> {
    let conditions = filter::search_condition(query, SEARCHABLE)
        .into_iter()
        .collect();
    let order = filter::order_clause(query, SORTABLE);
    filter::fetch_list(pool, SELECT, COUNT, conditions, order, query).await
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Category>> {
    let sql = format!("{SELECT} ORDER BY name");
    let categories = sqlx::query_as::<_, Category>(&sql).fetch_all(pool).await?;
    Ok(categories)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Category>> {
    let sql = format!("{SELECT} WHERE id = ?");
    let category = sqlx::query_as::<_, Category>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(category)
}

pub async fn find_by_name(pool: &SqlitePool, name: &str) -> RepoResult<Option<Category>> {
    let sql = format!("{SELECT} WHERE name = ? LIMIT 1");
    let category = sqlx::query_as::<_, Category>(&sql)
        .bind(name)
        .fetch_optional(pool)
        .await?;
    Ok(category)
}

pub async fn create(pool: &SqlitePool, data: CategoryCreate) -> RepoResult<Category> {
    if find_by_name(pool, &data.name).await?.is_some() {
        return Err(RepoError::Duplicate(format!(
            "Category '{}' already exists",
            data.name
        )));
    }

    let id = snowflake_id();
    let now = now_millis();
    sqlx::query("INSERT INTO categories (id, name, created_at, updated_at) VALUES (?, ?, ?, ?)")
        .bind(id)
        .bind(&data.name)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create category".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: CategoryUpdate) -> RepoResult<Category> {
    if let Some(found) = find_by_name(pool, &data.name).await?
        && found.id != id
    {
        return Err(RepoError::Duplicate(format!(
            "Category '{}' already exists",
            data.name
        )));
    }

    let rows = sqlx::query("UPDATE categories SET name = ?, updated_at = ? WHERE id = ?")
        .bind(&data.name)
        .bind(now_millis())
        .bind(id)
        .execute(pool)
        .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound("Category not found.".into()));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound("Category not found.".into()))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM categories WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound("Category not found.".into()));
    }
    Ok(true)
}

/// Insert a row verbatim (spreadsheet import); row data is trusted
pub async fn insert_imported(pool: &SqlitePool, name: &str) -> RepoResult<()> {
    sqlx::query("INSERT INTO categories (id, name, created_at, updated_at) VALUES (?, ?, ?, ?)")
        .bind(snowflake_id())
        .bind(name)
        .bind(now_millis())
        .bind(now_millis())
        .execute(pool)
        .await?;
    Ok(())
}
