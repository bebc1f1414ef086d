//! Role Repository

use super::{RepoError, RepoResult};
use crate::db::filter;
use shared::models::{Permission, Role, RoleCreate, RoleUpdate, SyncPermissionsRequest};
use shared::query::ListQuery;
use shared::response::Pagination;
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;

const SELECT: &str = "SELECT id, name, created_at, updated_at FROM roles";
const COUNT: &str = "SELECT COUNT(*) FROM roles";

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
) -> RepoResult<(Vec<Role>, Option<Pagination>)> {
    let conditions = filter::search_condition(query, SEARCHABLE)
        .into_iter()
        .collect();
    let order = filter::order_clause(query, SORTABLE);
    filter::fetch_list(pool, SELECT, COUNT, conditions, order, query).await
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Role>> {
    let sql = format!("{SELECT} ORDER BY name");
    let roles = sqlx::query_as::<_, Role>(&sql).fetch_all(pool).await?;
    Ok(roles)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Role>> {
    let sql = format!("{SELECT} WHERE id = ?");
    let role = sqlx::query_as::<_, Role>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(role)
}

pub async fn find_by_name(pool: &SqlitePool, name: &str) -> RepoResult<Option<Role>> {
    let sql = format!("{SELECT} WHERE name = ? LIMIT 1");
    let role = sqlx::query_as::<_, Role>(&sql)
        .bind(name)
        .fetch_optional(pool)
        .await?;
    Ok(role)
}

pub async fn create(pool: &SqlitePool, data: RoleCreate) -> RepoResult<Role> {
    if find_by_name(pool, &data.name).await?.is_some() {
        return Err(RepoError::Duplicate(format!(
            "Role '{}' already exists",
            data.name
        )));
    }

    let id = snowflake_id();
    let now = now_millis();
    sqlx::query("INSERT INTO roles (id, name, created_at, updated_at) VALUES (?, ?, ?, ?)")
        .bind(id)
        .bind(&data.name)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create role".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: RoleUpdate) -> RepoResult<Role> {
    if let Some(found) = find_by_name(pool, &data.name).await?
        && found.id != id
    {
        return Err(RepoError::Duplicate(format!(
            "Role '{}' already exists",
            data.name
        )));
    }

    let rows = sqlx::query("UPDATE roles SET name = ?, updated_at = ? WHERE id = ?")
        .bind(&data.name)
        .bind(now_millis())
        .bind(id)
        .execute(pool)
        .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound("Role not found.".into()));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound("Role not found.".into()))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM roles WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound("Role not found.".into()));
    }
    Ok(true)
}

/// Permissions granted to a role
pub async fn permissions_of(pool: &SqlitePool, role_id: i64) -> RepoResult<Vec<Permission>> {
    let permissions = sqlx::query_as::<_, Permission>(
        "SELECT p.id, p.name, p.created_at, p.updated_at FROM permissions p \
         JOIN permission_role pr ON pr.permission_id = p.id \
         WHERE pr.role_id = ? ORDER BY p.name",
    )
    .bind(role_id)
    .fetch_all(pool)
    .await?;
    Ok(permissions)
}

/// Replace a role's permission grants with exactly the given set
pub async fn sync_permissions(
    pool: &SqlitePool,
    role_id: i64,
    data: &SyncPermissionsRequest,
) -> RepoResult<Vec<Permission>> {
    if find_by_id(pool, role_id).await?.is_none() {
        return Err(RepoError::NotFound("Role not found.".into()));
    }

    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM permission_role WHERE role_id = ?")
        .bind(role_id)
        .execute(&mut *tx)
        .await?;

    for permission_id in &data.permission_ids {
        let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM permissions WHERE id = ?")
            .bind(permission_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(RepoError::NotFound(format!(
                "Permission {permission_id} not found"
            )));
        }
        sqlx::query("INSERT OR IGNORE INTO permission_role (permission_id, role_id) VALUES (?, ?)")
            .bind(permission_id)
            .bind(role_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    permissions_of(pool, role_id).await
}

/// Insert a row verbatim (spreadsheet import); row data is trusted
pub async fn insert_imported(pool: &SqlitePool, name: &str) -> RepoResult<()> {
    sqlx::query("INSERT INTO roles (id, name, created_at, updated_at) VALUES (?, ?, ?, ?)")
        .bind(snowflake_id())
        .bind(name)
        .bind(now_millis())
        .bind(now_millis())
        .execute(pool)
        .await?;
    Ok(())
}
