//! User Repository
//!
//! Also hosts the per-request authorization query: a user's effective
//! permission set is the union over their roles' permissions, resolved
//! fresh from the store each time the gate asks.

use std::collections::HashSet;

use super::{RepoError, RepoResult};
use crate::db::filter;
use shared::models::{RoleBrief, SyncRolesRequest, User, UserCreate, UserUpdate};
use shared::query::ListQuery;
use shared::response::Pagination;
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;

const SELECT: &str = "SELECT id, name, username, password, created_at, updated_at FROM users";
const COUNT: &str = "SELECT COUNT(*) FROM users";

const SEARCHABLE: &[(&str, &str)] = &[("name", "name"), ("username", "username")];

const SORTABLE: &[(&str, &str)] = &[
    ("id", "id"),
    ("name", "name"),
    ("username", "username"),
    ("created_at", "created_at"),
    ("updated_at", "updated_at"),
];

pub async fn list(
    pool: &SqlitePool,
    query: &ListQuery,
) -> RepoResult<(Vec<User>, Option<Pagination>)> {
    let conditions = filter::search_condition(query, SEARCHABLE)
        .into_iter()
        .collect();
    let order = filter::order_clause(query, SORTABLE);
    filter::fetch_list(pool, SELECT, COUNT, conditions, order, query).await
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<User>> {
    let sql = format!("{SELECT} ORDER BY name");
    let users = sqlx::query_as::<_, User>(&sql).fetch_all(pool).await?;
    Ok(users)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<User>> {
    let sql = format!("{SELECT} WHERE id = ?");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> RepoResult<Option<User>> {
    let sql = format!("{SELECT} WHERE username = ? LIMIT 1");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// `data.password` must already be hashed by the caller
pub async fn create(pool: &SqlitePool, data: UserCreate) -> RepoResult<User> {
    if find_by_username(pool, &data.username).await?.is_some() {
        return Err(RepoError::Duplicate(format!(
            "Username '{}' already exists",
            data.username
        )));
    }

    let id = snowflake_id();
    let now = now_millis();
    sqlx::query(
        "INSERT INTO users (id, name, username, password, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.username)
    .bind(&data.password)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create user".into()))
}

/// `data.password`, when present, must already be hashed by the caller
pub async fn update(pool: &SqlitePool, id: i64, data: UserUpdate) -> RepoResult<User> {
    if let Some(username) = &data.username
        && let Some(found) = find_by_username(pool, username).await?
        && found.id != id
    {
        return Err(RepoError::Duplicate(format!(
            "Username '{username}' already exists"
        )));
    }

    let rows = sqlx::query(
        "UPDATE users SET name = COALESCE(?1, name), username = COALESCE(?2, username), \
         password = COALESCE(?3, password), updated_at = ?4 WHERE id = ?5",
    )
    .bind(data.name)
    .bind(data.username)
    .bind(data.password)
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound("User not found.".into()));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound("User not found.".into()))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound("User not found.".into()));
    }
    Ok(true)
}

/// Roles assigned to a user
pub async fn roles_of(pool: &SqlitePool, user_id: i64) -> RepoResult<Vec<RoleBrief>> {
    let roles = sqlx::query_as::<_, RoleBrief>(
        "SELECT r.id, r.name FROM roles r \
         JOIN role_user ru ON ru.role_id = r.id \
         WHERE ru.user_id = ? ORDER BY r.name",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(roles)
}

/// Replace a user's role assignments with exactly the given set
pub async fn sync_roles(
    pool: &SqlitePool,
    user_id: i64,
    data: &SyncRolesRequest,
) -> RepoResult<Vec<RoleBrief>> {
    if find_by_id(pool, user_id).await?.is_none() {
        return Err(RepoError::NotFound("User not found.".into()));
    }

    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM role_user WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    for role_id in &data.roles_ids {
        let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM roles WHERE id = ?")
            .bind(role_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(RepoError::NotFound(format!("Role {role_id} not found")));
        }
        sqlx::query("INSERT OR IGNORE INTO role_user (role_id, user_id) VALUES (?, ?)")
            .bind(role_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    roles_of(pool, user_id).await
}

/// Effective permission set: union over the user's roles
pub async fn permissions_for(pool: &SqlitePool, user_id: i64) -> RepoResult<HashSet<String>> {
    let names: Vec<(String,)> = sqlx::query_as(
        "SELECT DISTINCT p.name FROM permissions p \
         JOIN permission_role pr ON pr.permission_id = p.id \
         JOIN role_user ru ON ru.role_id = pr.role_id \
         WHERE ru.user_id = ?",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(names.into_iter().map(|(name,)| name).collect())
}

/// Insert a row verbatim (spreadsheet import); the password column is
/// carried as-is, this is the administrative export/import round-trip
pub async fn insert_imported(
    pool: &SqlitePool,
    name: &str,
    username: &str,
    password: &str,
) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO users (id, name, username, password, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(snowflake_id())
    .bind(name)
    .bind(username)
    .bind(password)
    .bind(now_millis())
    .bind(now_millis())
    .execute(pool)
    .await?;
    Ok(())
}
