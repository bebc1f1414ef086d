//! Order API Handlers

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::order;
use crate::utils::validation;
use crate::utils::{ok, ok_empty, AppError, AppResult};
use shared::models::{OrderCreate, OrderResource, UnservedItem};
use shared::query::ListQuery;
use shared::{ApiResponse, ListPayload};

/// GET /api/orders - 获取所有订单
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<ListPayload<OrderResource>>>> {
    let (orders, pagination) = order::list(&state.pool, &query)
        .await
        .map_err(AppError::from)?;

    let items = orders.into_iter().map(OrderResource::from).collect();
    Ok(ok(
        "Success to get orders collection.",
        ListPayload::from_parts(items, pagination),
    ))
}

/// GET /api/orders/queue - 厨房待上菜队列
pub async fn queue(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<Vec<UnservedItem>>>> {
    let items = order::unserved_queue(&state.pool)
        .await
        .map_err(AppError::from)?;

    Ok(ok("Success to get orders collection.", items))
}

/// POST /api/orders - 下单
///
/// Re-uses the table's open order when one exists; the placement is
/// atomic and the at-most-one-open-order invariant holds under races.
pub async fn store(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<OrderCreate>,
) -> AppResult<(StatusCode, Json<ApiResponse<OrderResource>>)> {
    validation::order_create(&payload)?;

    let placed = order::place(
        &state.pool,
        current_user.id,
        payload.table_number,
        &payload.details,
    )
    .await
    .map_err(AppError::from)?;

    Ok((
        StatusCode::CREATED,
        ok("Success to make an order.", OrderResource::from(placed)),
    ))
}

/// GET /api/orders/{id} - 订单详情
pub async fn show(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<OrderResource>>> {
    let loaded = order::find_with_details(&state.pool, id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found("Order not found."))?;

    Ok(ok(
        "Success to get order details.",
        OrderResource::from(loaded),
    ))
}

/// PATCH /api/orders/{id}/details/{detail_id}/serve - 上菜
pub async fn serve(
    State(state): State<ServerState>,
    Path((id, detail_id)): Path<(i64, i64)>,
) -> AppResult<Json<ApiResponse<OrderResource>>> {
    let loaded = order::serve_detail(&state.pool, id, detail_id)
        .await
        .map_err(AppError::from)?;

    Ok(ok(
        "Success to update detail order data.",
        OrderResource::from(loaded),
    ))
}

/// DELETE /api/orders/{id} - 删除订单
pub async fn destroy(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    order::delete(&state.pool, id).await.map_err(AppError::from)?;

    Ok(ok_empty("Success to delete order data."))
}

/// DELETE /api/orders/{id}/details/{detail_id} - 删除订单行
pub async fn destroy_detail(
    State(state): State<ServerState>,
    Path((id, detail_id)): Path<(i64, i64)>,
) -> AppResult<Json<ApiResponse<()>>> {
    order::delete_detail(&state.pool, id, detail_id)
        .await
        .map_err(AppError::from)?;

    Ok(ok_empty("Success to delete detail order data."))
}
