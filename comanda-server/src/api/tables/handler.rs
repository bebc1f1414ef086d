//! Dining Table API Handlers

use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::auth::password;
use crate::core::ServerState;
use crate::db::repository::{dining_table, order, user};
use crate::utils::validation;
use crate::utils::{ok, ok_empty, AppError, AppResult};
use shared::models::{
    DiningTableCreate, DiningTableResource, DiningTableUpdate, OrderResource, SetTableRequest,
};
use shared::query::ListQuery;
use shared::{ApiResponse, ListPayload};

/// Fixed delay for the in-handler re-authentication, same as login
const AUTH_FIXED_DELAY_MS: u64 = 500;

/// Entity-specific equality filters on the collection endpoint
#[derive(Debug, Deserialize)]
pub struct TableQuery {
    #[serde(flatten)]
    pub list: ListQuery,
    pub number: Option<String>,
    pub available: Option<String>,
}

impl TableQuery {
    /// A non-numeric `number` is dropped silently, like every other
    /// invalid list parameter.
    fn number(&self) -> Option<i64> {
        self.number.as_deref().and_then(|raw| raw.trim().parse().ok())
    }
}

/// GET /api/tables - 获取所有桌台
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<TableQuery>,
) -> AppResult<Json<ApiResponse<ListPayload<DiningTableResource>>>> {
    let (tables, pagination) = dining_table::list(
        &state.pool,
        &query.list,
        query.number(),
        query.available.as_deref(),
    )
    .await
    .map_err(AppError::from)?;

    let items = tables.into_iter().map(DiningTableResource::from).collect();
    Ok(ok(
        "Success to get tables collection.",
        ListPayload::from_parts(items, pagination),
    ))
}

/// POST /api/tables - 创建桌台
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<DiningTableCreate>,
) -> AppResult<(StatusCode, Json<ApiResponse<DiningTableResource>>)> {
    validation::table_create(&payload)?;

    let table = dining_table::create(&state.pool, payload)
        .await
        .map_err(AppError::from)?;

    Ok((
        StatusCode::CREATED,
        ok("Success to create table.", DiningTableResource::from(table)),
    ))
}

/// GET /api/tables/{id}/order - 桌台当前未结订单
pub async fn get_order(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Option<OrderResource>>>> {
    let open_order = order::find_open_by_table(&state.pool, id)
        .await
        .map_err(AppError::from)?;

    Ok(ok(
        "Success to get order details.",
        open_order.map(OrderResource::from),
    ))
}

/// PUT /api/tables/{id} - 更新桌台
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<DiningTableUpdate>,
) -> AppResult<Json<ApiResponse<DiningTableResource>>> {
    validation::table_update(&payload)?;

    let table = dining_table::update(&state.pool, id, payload)
        .await
        .map_err(AppError::from)?;

    Ok(ok(
        "Success to update table data.",
        DiningTableResource::from(table),
    ))
}

/// DELETE /api/tables/{id} - 删除桌台
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    dining_table::delete(&state.pool, id)
        .await
        .map_err(AppError::from)?;

    Ok(ok_empty("Success to delete table data."))
}

/// Re-authenticate the acting user and check the table permission.
/// Mirrors the login flow: fixed delay + unified error message.
async fn authorize_set_table(state: &ServerState, username: &str, pass: &str) -> AppResult<()> {
    let found = user::find_by_username(&state.pool, username)
        .await
        .map_err(AppError::from)?;

    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    let Some(found) = found else {
        return Err(AppError::invalid_credentials());
    };

    let password_valid = password::verify_password(&found.password, pass)
        .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))?;
    if !password_valid {
        return Err(AppError::invalid_credentials());
    }

    let granted = user::permissions_for(&state.pool, found.id)
        .await
        .map_err(AppError::from)?;
    if !granted.contains("table.update") {
        return Err(AppError::forbidden(
            "User does not have the right permissions.",
        ));
    }

    Ok(())
}

/// POST /api/tables/set - 入座 / 释放 / 换桌
///
/// `number` seats that table (fails when busy), `old_number` frees the
/// previous one; both together are an atomic reassignment.
pub async fn set_table(
    State(state): State<ServerState>,
    Json(payload): Json<SetTableRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    validation::set_table(&payload)?;

    authorize_set_table(&state, &payload.username, &payload.password).await?;

    dining_table::set_table(&state.pool, payload.number, payload.old_number)
        .await
        .map_err(AppError::from)?;

    Ok(ok_empty("Success to set table."))
}
