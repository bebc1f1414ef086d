//! Role API Handlers

use axum::body::Bytes;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::db::repository::role;
use crate::transfer::{self, ExportQuery};
use crate::utils::validation;
use crate::utils::{ok, ok_empty, AppError, AppResult};
use shared::models::{
    PermissionResource, RoleCreate, RoleResource, RoleUpdate, SyncPermissionsRequest,
};
use shared::query::ListQuery;
use shared::util::format_timestamp;
use shared::{ApiResponse, ListPayload};

async fn to_resource(state: &ServerState, found: shared::models::Role) -> AppResult<RoleResource> {
    let permissions = role::permissions_of(&state.pool, found.id)
        .await
        .map_err(AppError::from)?
        .into_iter()
        .map(PermissionResource::from)
        .collect();
    Ok(RoleResource::from(found).with_permissions(permissions))
}

/// GET /api/roles - 获取所有角色
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<ListPayload<RoleResource>>>> {
    let (roles, pagination) = role::list(&state.pool, &query)
        .await
        .map_err(AppError::from)?;

    let mut items = Vec::with_capacity(roles.len());
    for found in roles {
        items.push(to_resource(&state, found).await?);
    }

    Ok(ok(
        "Success to get roles collection.",
        ListPayload::from_parts(items, pagination),
    ))
}

/// POST /api/roles - 创建角色
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<RoleCreate>,
) -> AppResult<(StatusCode, Json<ApiResponse<RoleResource>>)> {
    validation::role_name(&payload.name)?;

    let created = role::create(&state.pool, payload)
        .await
        .map_err(AppError::from)?;
    let resource = to_resource(&state, created).await?;

    Ok((StatusCode::CREATED, ok("Success to create role.", resource)))
}

/// GET /api/roles/{id} - 角色详情
pub async fn show(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<RoleResource>>> {
    let found = role::find_by_id(&state.pool, id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found("Role not found."))?;

    let resource = to_resource(&state, found).await?;
    Ok(ok("Success to get role details.", resource))
}

/// PUT /api/roles/{id} - 更新角色
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<RoleUpdate>,
) -> AppResult<Json<ApiResponse<RoleResource>>> {
    validation::role_name(&payload.name)?;

    let updated = role::update(&state.pool, id, payload)
        .await
        .map_err(AppError::from)?;
    let resource = to_resource(&state, updated).await?;

    Ok(ok("Success to update role data.", resource))
}

/// PUT /api/roles/{id}/permissions - 同步角色权限
pub async fn sync_permissions(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<SyncPermissionsRequest>,
) -> AppResult<Json<ApiResponse<Vec<PermissionResource>>>> {
    let permissions = role::sync_permissions(&state.pool, id, &payload)
        .await
        .map_err(AppError::from)?
        .into_iter()
        .map(PermissionResource::from)
        .collect();

    Ok(ok("Success to synchronize role's permissions.", permissions))
}

/// DELETE /api/roles/{id} - 删除角色
pub async fn destroy(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    role::delete(&state.pool, id).await.map_err(AppError::from)?;

    Ok(ok_empty("Success to delete role data."))
}

/// Fixed CSV column set for the role sheet
#[derive(Debug, Serialize, Deserialize)]
struct RoleCsvRow {
    id: i64,
    name: String,
    created_at: String,
    updated_at: String,
}

/// GET /api/roles/export?type=csv - 导出
pub async fn export(
    State(state): State<ServerState>,
    Query(query): Query<ExportQuery>,
) -> AppResult<Response> {
    query.require_csv()?;

    let roles = role::find_all(&state.pool).await.map_err(AppError::from)?;
    let rows = roles.into_iter().map(|r| RoleCsvRow {
        id: r.id,
        name: r.name,
        created_at: format_timestamp(r.created_at),
        updated_at: format_timestamp(r.updated_at),
    });

    let bytes = transfer::export_csv(rows)?;
    Ok(transfer::csv_attachment("roles.csv", bytes))
}

#[derive(Debug, Deserialize)]
struct RoleImportRow {
    name: String,
}

/// POST /api/roles/import - 导入
pub async fn import(
    State(state): State<ServerState>,
    body: Bytes,
) -> AppResult<Json<ApiResponse<()>>> {
    let rows: Vec<RoleImportRow> = transfer::import_csv(&body)?;

    for row in rows {
        role::insert_imported(&state.pool, &row.name)
            .await
            .map_err(AppError::from)?;
    }

    Ok(ok_empty("Success to import roles data."))
}
