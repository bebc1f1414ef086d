//! Food API Handlers

use axum::body::Bytes;
use axum::extract::Multipart;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::db::repository::food;
use crate::transfer::{self, ExportQuery};
use crate::utils::validation;
use crate::utils::{ok, ok_empty, AppError, AppResult};
use shared::models::{FoodCreate, FoodResource, FoodUpdate};
use shared::query::ListQuery;
use shared::util::{format_timestamp, now_millis};
use shared::{ApiResponse, ListPayload};

/// Image folder name under the images directory
const IMAGE_FOLDER: &str = "foods";

/// Collection query: base list parameters plus the food extras
#[derive(Debug, Deserialize)]
pub struct FoodQuery {
    #[serde(flatten)]
    pub list: ListQuery,
    /// `categories=1,2,3` — restrict to these category ids
    pub categories: Option<String>,
    /// `filter=new|random|popular|name|price` — preset ordering
    pub filter: Option<String>,
}

impl FoodQuery {
    /// Malformed ids are dropped silently, like every other invalid
    /// list parameter.
    fn category_ids(&self) -> Vec<i64> {
        self.categories
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .filter_map(|part| part.trim().parse().ok())
                    .collect()
            })
            .unwrap_or_default()
    }
}

async fn to_resource(state: &ServerState, food: shared::models::Food) -> AppResult<FoodResource> {
    let category = food::category_of(&state.pool, &food)
        .await
        .map_err(AppError::from)?;
    let resource = FoodResource::from(food);
    Ok(match category {
        Some(category) => resource.with_category(category),
        None => resource,
    })
}

/// GET /api/foods - 获取所有菜品
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<FoodQuery>,
) -> AppResult<Json<ApiResponse<ListPayload<FoodResource>>>> {
    let (foods, pagination) = food::list(
        &state.pool,
        &query.list,
        &query.category_ids(),
        query.filter.as_deref(),
    )
    .await
    .map_err(AppError::from)?;

    let mut items = Vec::with_capacity(foods.len());
    for item in foods {
        items.push(to_resource(&state, item).await?);
    }

    Ok(ok(
        "Success to get foods collection.",
        ListPayload::from_parts(items, pagination),
    ))
}

/// POST /api/foods - 创建菜品
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<FoodCreate>,
) -> AppResult<(StatusCode, Json<ApiResponse<FoodResource>>)> {
    validation::food_create(&payload)?;

    let created = food::create(&state.pool, payload, None)
        .await
        .map_err(AppError::from)?;
    let resource = to_resource(&state, created).await?;

    Ok((
        StatusCode::CREATED,
        ok("Success to save the food data.", resource),
    ))
}

/// GET /api/foods/{id} - 菜品详情
pub async fn show(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<FoodResource>>> {
    let found = food::find_by_id(&state.pool, id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found("Food not found."))?;

    let resource = to_resource(&state, found).await?;
    Ok(ok("Success to get food details.", resource))
}

/// PUT /api/foods/{id} - 更新菜品
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<FoodUpdate>,
) -> AppResult<Json<ApiResponse<FoodResource>>> {
    validation::food_update(&payload)?;

    let updated = food::update(&state.pool, id, payload)
        .await
        .map_err(AppError::from)?;
    let resource = to_resource(&state, updated).await?;

    Ok(ok("Success to update food data.", resource))
}

/// Remove a stored image asset; a missing file is not an error
fn remove_image_asset(state: &ServerState, image: &str) {
    let path = state.images_dir().join(image);
    if let Err(e) = std::fs::remove_file(&path)
        && e.kind() != std::io::ErrorKind::NotFound
    {
        tracing::warn!(image = %image, error = %e, "Failed to remove image asset");
    }
}

/// PUT /api/foods/{id}/image - 更新菜品图片 (multipart `image` 字段)
pub async fn update_image(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<FoodResource>>> {
    let mut stored: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("image") {
            continue;
        }

        let file_name = field
            .file_name()
            .map(|n| n.to_string())
            .ok_or_else(|| AppError::validation("image file name is missing"))?;
        let data = field.bytes().await?;
        let ext = validation::image_upload(&file_name, data.len())?;

        let final_name = format!("{}.{ext}", now_millis());
        let relative = format!("{IMAGE_FOLDER}/{final_name}");
        let destination = state.images_dir().join(&relative);
        std::fs::write(&destination, &data)
            .map_err(|e| AppError::internal(format!("Failed to store image: {e}")))?;

        stored = Some(relative);
        break;
    }

    let stored = stored.ok_or_else(|| AppError::validation("image is required"))?;

    let previous = food::update_image(&state.pool, id, &stored)
        .await
        .map_err(AppError::from)?;
    if let Some(previous) = previous {
        remove_image_asset(&state, &previous);
    }

    let found = food::find_by_id(&state.pool, id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found("Food not found."))?;
    let resource = to_resource(&state, found).await?;

    Ok(ok("Success to update food image.", resource))
}

/// DELETE /api/foods/{id} - 删除菜品（连同图片资源）
pub async fn destroy(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    let image = food::delete(&state.pool, id).await.map_err(AppError::from)?;
    if let Some(image) = image {
        remove_image_asset(&state, &image);
    }

    Ok(ok_empty("Success to delete food data."))
}

/// Fixed CSV column set for the food sheet
#[derive(Debug, Serialize, Deserialize)]
struct FoodCsvRow {
    id: i64,
    category_id: i64,
    name: String,
    description: String,
    price: f64,
    discount: i64,
    image: Option<String>,
    created_at: String,
    updated_at: String,
}

/// GET /api/foods/export?type=csv - 导出
pub async fn export(
    State(state): State<ServerState>,
    Query(query): Query<ExportQuery>,
) -> AppResult<Response> {
    query.require_csv()?;

    let foods = food::find_all(&state.pool).await.map_err(AppError::from)?;
    let rows = foods.into_iter().map(|f| FoodCsvRow {
        id: f.id,
        category_id: f.category_id,
        name: f.name,
        description: f.description,
        price: f.price,
        discount: f.discount,
        image: f.image,
        created_at: format_timestamp(f.created_at),
        updated_at: format_timestamp(f.updated_at),
    });

    let bytes = transfer::export_csv(rows)?;
    Ok(transfer::csv_attachment("foods.csv", bytes))
}

/// Imported rows carry the business fields; ids and timestamps are
/// assigned on insert.
#[derive(Debug, Deserialize)]
struct FoodImportRow {
    category_id: i64,
    name: String,
    description: String,
    price: f64,
    discount: i64,
    image: Option<String>,
}

/// POST /api/foods/import - 导入
pub async fn import(
    State(state): State<ServerState>,
    body: Bytes,
) -> AppResult<Json<ApiResponse<()>>> {
    let rows: Vec<FoodImportRow> = transfer::import_csv(&body)?;

    for row in rows {
        food::insert_imported(
            &state.pool,
            row.category_id,
            &row.name,
            &row.description,
            row.price,
            row.discount,
            row.image.as_deref(),
        )
        .await
        .map_err(AppError::from)?;
    }

    Ok(ok_empty("Success to import foods data."))
}
