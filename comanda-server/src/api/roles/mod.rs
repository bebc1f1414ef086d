//! Role API 模块

mod handler;

use axum::{middleware, routing::delete, routing::get, routing::post, routing::put, Router};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router(state: ServerState) -> Router<ServerState> {
    Router::new().nest("/api/roles", routes(state))
}

fn routes(state: ServerState) -> Router<ServerState> {
    let index_routes = Router::new()
        .route("/", get(handler::list))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission("role.index"),
        ));

    let show_routes = Router::new()
        .route("/{id}", get(handler::show))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission("role.show"),
        ));

    let create_routes = Router::new()
        .route("/", post(handler::create))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission("role.create"),
        ));

    let update_routes = Router::new()
        .route("/{id}", put(handler::update))
        .route("/{id}/permissions", put(handler::sync_permissions))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission("role.update"),
        ));

    let delete_routes = Router::new()
        .route("/{id}", delete(handler::destroy))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission("role.delete"),
        ));

    let export_routes = Router::new()
        .route("/export", get(handler::export))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission("role.export"),
        ));

    let import_routes = Router::new()
        .route("/import", post(handler::import))
        .layer(middleware::from_fn_with_state(
            state,
            require_permission("role.import"),
        ));

    index_routes
        .merge(show_routes)
        .merge(create_routes)
        .merge(update_routes)
        .merge(delete_routes)
        .merge(export_routes)
        .merge(import_routes)
}
