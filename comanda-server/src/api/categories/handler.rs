//! Category API Handlers

use axum::body::Bytes;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::db::repository::category;
use crate::transfer::{self, ExportQuery};
use crate::utils::validation;
use crate::utils::{ok, ok_empty, AppError, AppResult};
use shared::models::{CategoryCreate, CategoryResource, CategoryUpdate};
use shared::query::ListQuery;
use shared::util::format_timestamp;
use shared::{ApiResponse, ListPayload};

/// GET /api/categories - 获取所有分类
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<ListPayload<CategoryResource>>>> {
    let (categories, pagination) = category::list(&state.pool, &query)
        .await
        .map_err(AppError::from)?;

    let items = categories.into_iter().map(CategoryResource::from).collect();
    Ok(ok(
        "Success to get categories collection.",
        ListPayload::from_parts(items, pagination),
    ))
}

/// POST /api/categories - 创建分类
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CategoryCreate>,
) -> AppResult<(StatusCode, Json<ApiResponse<CategoryResource>>)> {
    validation::category_name(&payload.name)?;

    let created = category::create(&state.pool, payload)
        .await
        .map_err(AppError::from)?;

    Ok((
        StatusCode::CREATED,
        ok(
            "Success to create category.",
            CategoryResource::from(created),
        ),
    ))
}

/// GET /api/categories/{id} - 分类详情
pub async fn show(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<CategoryResource>>> {
    let found = category::find_by_id(&state.pool, id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found("Category not found."))?;

    Ok(ok(
        "Success to get category details.",
        CategoryResource::from(found),
    ))
}

/// PUT /api/categories/{id} - 更新分类
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<CategoryUpdate>,
) -> AppResult<Json<ApiResponse<CategoryResource>>> {
    validation::category_name(&payload.name)?;

    let updated = category::update(&state.pool, id, payload)
        .await
        .map_err(AppError::from)?;

    Ok(ok(
        "Success to update category data.",
        CategoryResource::from(updated),
    ))
}

/// DELETE /api/categories/{id} - 删除分类
pub async fn destroy(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    category::delete(&state.pool, id)
        .await
        .map_err(AppError::from)?;

    Ok(ok_empty("Success to delete category data."))
}

/// Fixed CSV column set for the category sheet
#[derive(Debug, Serialize, Deserialize)]
struct CategoryCsvRow {
    id: i64,
    name: String,
    created_at: String,
    updated_at: String,
}

/// GET /api/categories/export?type=csv - 导出
pub async fn export(
    State(state): State<ServerState>,
    Query(query): Query<ExportQuery>,
) -> AppResult<Response> {
    query.require_csv()?;

    let categories = category::find_all(&state.pool)
        .await
        .map_err(AppError::from)?;
    let rows = categories.into_iter().map(|c| CategoryCsvRow {
        id: c.id,
        name: c.name,
        created_at: format_timestamp(c.created_at),
        updated_at: format_timestamp(c.updated_at),
    });

    let bytes = transfer::export_csv(rows)?;
    Ok(transfer::csv_attachment("categories.csv", bytes))
}

#[derive(Debug, Deserialize)]
struct CategoryImportRow {
    name: String,
}

/// POST /api/categories/import - 导入
pub async fn import(
    State(state): State<ServerState>,
    body: Bytes,
) -> AppResult<Json<ApiResponse<()>>> {
    let rows: Vec<CategoryImportRow> = transfer::import_csv(&body)?;

    for row in rows {
        category::insert_imported(&state.pool, &row.name)
            .await
            .map_err(AppError::from)?;
    }

    Ok(ok_empty("Success to import categories data."))
}
