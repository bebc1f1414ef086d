//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 认证相关接口
//! - [`tables`] - 桌台管理接口
//! - [`orders`] - 订单管理接口
//! - [`transactions`] - 交易/结账接口
//! - [`foods`] - 菜品管理接口
//! - [`categories`] - 分类管理接口
//! - [`users`] - 用户管理接口
//! - [`roles`] - 角色管理接口
//! - [`permissions`] - 权限查询接口

pub mod auth;
pub mod categories;
pub mod foods;
pub mod health;
pub mod orders;
pub mod permissions;
pub mod roles;
pub mod tables;
pub mod transactions;
pub mod users;

use axum::{middleware, Router};

use crate::core::ServerState;

/// Compose the full API router. Everything under `/api` except login and
/// health passes the authentication middleware first.
pub fn router(state: ServerState) -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router(state.clone()))
        .merge(tables::router(state.clone()))
        .merge(orders::router(state.clone()))
        .merge(transactions::router(state.clone()))
        .merge(foods::router(state.clone()))
        .merge(categories::router(state.clone()))
        .merge(users::router(state.clone()))
        .merge(roles::router(state.clone()))
        .merge(permissions::router(state.clone()))
        .layer(middleware::from_fn_with_state(
            state,
            crate::auth::require_auth,
        ))
}

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};
