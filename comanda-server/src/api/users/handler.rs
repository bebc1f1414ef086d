//! User API Handlers

use axum::body::Bytes;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::password;
use crate::core::ServerState;
use crate::db::repository::user;
use crate::transfer::{self, ExportQuery};
use crate::utils::validation;
use crate::utils::{ok, ok_empty, AppError, AppResult};
use shared::models::{RoleBrief, SyncRolesRequest, UserCreate, UserResource, UserUpdate};
use shared::query::ListQuery;
use shared::util::format_timestamp;
use shared::{ApiResponse, ListPayload};

async fn to_resource(state: &ServerState, found: shared::models::User) -> AppResult<UserResource> {
    let roles = user::roles_of(&state.pool, found.id)
        .await
        .map_err(AppError::from)?;
    Ok(UserResource::from(found).with_roles(roles))
}

/// GET /api/users - 获取所有用户
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<ListPayload<UserResource>>>> {
    let (users, pagination) = user::list(&state.pool, &query)
        .await
        .map_err(AppError::from)?;

    let mut items = Vec::with_capacity(users.len());
    for found in users {
        items.push(to_resource(&state, found).await?);
    }

    Ok(ok(
        "Success to get users collection.",
        ListPayload::from_parts(items, pagination),
    ))
}

/// POST /api/users - 创建用户
pub async fn create(
    State(state): State<ServerState>,
    Json(mut payload): Json<UserCreate>,
) -> AppResult<(StatusCode, Json<ApiResponse<UserResource>>)> {
    validation::user_create(&payload)?;

    payload.password = password::hash_password(&payload.password)
        .map_err(|e| AppError::internal(format!("Hashing failed: {e}")))?;

    let created = user::create(&state.pool, payload)
        .await
        .map_err(AppError::from)?;
    let resource = to_resource(&state, created).await?;

    Ok((StatusCode::CREATED, ok("Success to create user.", resource)))
}

/// GET /api/users/{id} - 用户详情
pub async fn show(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<UserResource>>> {
    let found = user::find_by_id(&state.pool, id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found("User not found."))?;

    let resource = to_resource(&state, found).await?;
    Ok(ok("Success to get user details.", resource))
}

/// PUT /api/users/{id} - 更新用户
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(mut payload): Json<UserUpdate>,
) -> AppResult<Json<ApiResponse<UserResource>>> {
    validation::user_update(&payload)?;

    if let Some(plain) = payload.password.take() {
        payload.password = Some(
            password::hash_password(&plain)
                .map_err(|e| AppError::internal(format!("Hashing failed: {e}")))?,
        );
    }

    let updated = user::update(&state.pool, id, payload)
        .await
        .map_err(AppError::from)?;
    let resource = to_resource(&state, updated).await?;

    Ok(ok("Success to update user data.", resource))
}

/// PUT /api/users/{id}/roles - 同步用户角色
pub async fn sync_roles(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<SyncRolesRequest>,
) -> AppResult<Json<ApiResponse<Vec<RoleBrief>>>> {
    let roles = user::sync_roles(&state.pool, id, &payload)
        .await
        .map_err(AppError::from)?;

    Ok(ok("Success to synchronize user's roles.", roles))
}

/// DELETE /api/users/{id} - 删除用户
pub async fn destroy(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    user::delete(&state.pool, id).await.map_err(AppError::from)?;

    Ok(ok_empty("Success to delete user data."))
}

/// Fixed CSV column set for the user sheet.
/// The password hash is included here on purpose: this is the one
/// administrative surface that round-trips it.
#[derive(Debug, Serialize, Deserialize)]
struct UserCsvRow {
    id: i64,
    name: String,
    username: String,
    password: String,
    created_at: String,
    updated_at: String,
}

/// GET /api/users/export?type=csv - 导出
pub async fn export(
    State(state): State<ServerState>,
    Query(query): Query<ExportQuery>,
) -> AppResult<Response> {
    query.require_csv()?;

    let users = user::find_all(&state.pool).await.map_err(AppError::from)?;
    let rows = users.into_iter().map(|u| UserCsvRow {
        id: u.id,
        name: u.name,
        username: u.username,
        password: u.password,
        created_at: format_timestamp(u.created_at),
        updated_at: format_timestamp(u.updated_at),
    });

    let bytes = transfer::export_csv(rows)?;
    Ok(transfer::csv_attachment("users.csv", bytes))
}

/// Imported rows carry the already-hashed password from an export
#[derive(Debug, Deserialize)]
struct UserImportRow {
    name: String,
    username: String,
    password: String,
}

/// POST /api/users/import - 导入
pub async fn import(
    State(state): State<ServerState>,
    body: Bytes,
) -> AppResult<Json<ApiResponse<()>>> {
    let rows: Vec<UserImportRow> = transfer::import_csv(&body)?;

    for row in rows {
        user::insert_imported(&state.pool, &row.name, &row.username, &row.password)
            .await
            .map_err(AppError::from)?;
    }

    Ok(ok_empty("Success to import users data."))
}
