//! Permission API 模块
//!
//! 权限目录只读：列表/详情/导出/导入，不提供增删改接口。

mod handler;

use axum::{middleware, routing::get, routing::post, Router};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router(state: ServerState) -> Router<ServerState> {
    Router::new().nest("/api/permissions", routes(state))
}

fn routes(state: ServerState) -> Router<ServerState> {
    let index_routes = Router::new()
        .route("/", get(handler::list))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission("permission.index"),
        ));

    let show_routes = Router::new()
        .route("/{id}", get(handler::show))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission("permission.show"),
        ));

    let export_routes = Router::new()
        .route("/export", get(handler::export))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission("permission.export"),
        ));

    let import_routes = Router::new()
        .route("/import", post(handler::import))
        .layer(middleware::from_fn_with_state(
            state,
            require_permission("permission.import"),
        ));

    index_routes
        .merge(show_routes)
        .merge(export_routes)
        .merge(import_routes)
}
