//! Auth API 模块

mod handler;

use axum::{routing::get, routing::post, Router};

use crate::core::ServerState;

pub fn router(_state: ServerState) -> Router<ServerState> {
    Router::new().nest("/api/auth", routes())
}

fn routes() -> Router<ServerState> {
    // login 在认证中间件的公共路径清单里；其余需要登录
    Router::new()
        .route("/login", post(handler::login))
        .route("/me", get(handler::me))
        .route("/refresh", post(handler::refresh))
        .route("/logout", post(handler::logout))
}
