//! Transaction API Handlers

use axum::body::Bytes;
use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::transaction;
use crate::transfer::{self, ExportQuery};
use crate::utils::validation;
use crate::utils::{ok, ok_empty, AppError, AppResult};
use shared::models::{
    OrderResource, TransactionCreate, TransactionResource, TransactionWithOrder,
};
use shared::query::ListQuery;
use shared::util::format_timestamp;
use shared::{ApiResponse, ListPayload};

/// GET /api/transactions - 获取所有交易
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<ListPayload<TransactionResource>>>> {
    let (transactions, pagination) = transaction::list(&state.pool, &query)
        .await
        .map_err(AppError::from)?;

    let items = transactions
        .into_iter()
        .map(TransactionResource::from)
        .collect();
    Ok(ok(
        "Success to get transactions collection.",
        ListPayload::from_parts(items, pagination),
    ))
}

/// POST /api/transactions - 结账
///
/// Creates the transaction, closes the order and frees the table as a
/// single atomic unit.
pub async fn store(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<TransactionCreate>,
) -> AppResult<(StatusCode, Json<ApiResponse<TransactionResource>>)> {
    validation::transaction_create(&payload)?;

    let created = transaction::checkout(&state.pool, payload.order_id, current_user.id)
        .await
        .map_err(AppError::from)?;

    Ok((
        StatusCode::CREATED,
        ok(
            "Success to make a transaction.",
            TransactionResource::from(created),
        ),
    ))
}

/// GET /api/transactions/{id} - 交易详情（含订单和订单行）
pub async fn show(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<TransactionWithOrder>>> {
    let (found, order) = transaction::find_with_order(&state.pool, id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found("Transaction not found."))?;

    Ok(ok(
        "Success to get transaction details.",
        TransactionWithOrder {
            transaction: TransactionResource::from(found),
            order: OrderResource::from(order),
        },
    ))
}

/// DELETE /api/transactions/{id} - 删除交易
pub async fn destroy(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    transaction::delete(&state.pool, id)
        .await
        .map_err(AppError::from)?;

    Ok(ok_empty("Success to delete transaction."))
}

/// Fixed CSV column set for the transaction sheet
#[derive(Debug, Serialize, Deserialize)]
struct TransactionCsvRow {
    id: i64,
    order_id: i64,
    user_id: i64,
    total_price: f64,
    created_at: String,
}

/// GET /api/transactions/export?type=csv - 导出
pub async fn export(
    State(state): State<ServerState>,
    Query(query): Query<ExportQuery>,
) -> AppResult<Response> {
    query.require_csv()?;

    let transactions = transaction::find_all(&state.pool)
        .await
        .map_err(AppError::from)?;

    let rows = transactions.into_iter().map(|tx| TransactionCsvRow {
        id: tx.id,
        order_id: tx.order_id,
        user_id: tx.user_id,
        total_price: tx.total_price,
        created_at: format_timestamp(tx.created_at),
    });

    let bytes = transfer::export_csv(rows)?;
    Ok(transfer::csv_attachment("transactions.csv", bytes))
}

/// Imported rows carry the business fields; ids and timestamps are
/// assigned on insert.
#[derive(Debug, Deserialize)]
struct TransactionImportRow {
    order_id: i64,
    user_id: i64,
    total_price: f64,
}

/// POST /api/transactions/import - 导入
pub async fn import(
    State(state): State<ServerState>,
    body: Bytes,
) -> AppResult<Json<ApiResponse<()>>> {
    let rows: Vec<TransactionImportRow> = transfer::import_csv(&body)?;

    for row in rows {
        transaction::insert_imported(&state.pool, row.order_id, row.user_id, row.total_price)
            .await
            .map_err(AppError::from)?;
    }

    Ok(ok_empty("Success to import transactions data."))
}
