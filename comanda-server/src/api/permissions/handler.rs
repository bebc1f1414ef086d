//! Permission API Handlers

use axum::body::Bytes;
use axum::{
    extract::{Path, Query, State},
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::db::repository::permission;
use crate::transfer::{self, ExportQuery};
use crate::utils::{ok, ok_empty, AppError, AppResult};
use shared::models::PermissionResource;
use shared::query::ListQuery;
use shared::util::format_timestamp;
use shared::{ApiResponse, ListPayload};

/// GET /api/permissions - 获取所有权限
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<ListPayload<PermissionResource>>>> {
    let (permissions, pagination) = permission::list(&state.pool, &query)
        .await
        .map_err(AppError::from)?;

    let items = permissions
        .into_iter()
        .map(PermissionResource::from)
        .collect();
    Ok(ok(
        "Success to get permissions collection.",
        ListPayload::from_parts(items, pagination),
    ))
}

/// GET /api/permissions/{id} - 权限详情
pub async fn show(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<PermissionResource>>> {
    let found = permission::find_by_id(&state.pool, id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found("Permission not found."))?;

    Ok(ok(
        "Success to get permission details.",
        PermissionResource::from(found),
    ))
}

/// Fixed CSV column set for the permission sheet
#[derive(Debug, Serialize, Deserialize)]
struct PermissionCsvRow {
    id: i64,
    name: String,
    created_at: String,
    updated_at: String,
}

/// GET /api/permissions/export?type=csv - 导出
pub async fn export(
    State(state): State<ServerState>,
    Query(query): Query<ExportQuery>,
) -> AppResult<Response> {
    query.require_csv()?;

    let permissions = permission::find_all(&state.pool)
        .await
        .map_err(AppError::from)?;
    let rows = permissions.into_iter().map(|p| PermissionCsvRow {
        id: p.id,
        name: p.name,
        created_at: format_timestamp(p.created_at),
        updated_at: format_timestamp(p.updated_at),
    });

    let bytes = transfer::export_csv(rows)?;
    Ok(transfer::csv_attachment("permissions.csv", bytes))
}

#[derive(Debug, Deserialize)]
struct PermissionImportRow {
    name: String,
}

/// POST /api/permissions/import - 导入
pub async fn import(
    State(state): State<ServerState>,
    body: Bytes,
) -> AppResult<Json<ApiResponse<()>>> {
    let rows: Vec<PermissionImportRow> = transfer::import_csv(&body)?;

    for row in rows {
        permission::insert_imported(&state.pool, &row.name)
            .await
            .map_err(AppError::from)?;
    }

    Ok(ok_empty("Success to import permissions data."))
}
