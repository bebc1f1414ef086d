//! Dining Table API 模块

mod handler;

use axum::{middleware, routing::get, routing::post, Router};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router(state: ServerState) -> Router<ServerState> {
    Router::new().nest("/api/tables", routes(state))
}

fn routes(state: ServerState) -> Router<ServerState> {
    let index_routes = Router::new()
        .route("/", get(handler::list))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission("table.index"),
        ));

    let show_routes = Router::new()
        .route("/{id}/order", get(handler::get_order))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission("table.show"),
        ));

    let create_routes = Router::new()
        .route("/", post(handler::create))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission("table.create"),
        ));

    let update_routes = Router::new()
        .route("/{id}", axum::routing::put(handler::update))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission("table.update"),
        ));

    let delete_routes = Router::new()
        .route("/{id}", axum::routing::delete(handler::delete))
        .layer(middleware::from_fn_with_state(
            state,
            require_permission("table.delete"),
        ));

    // `/set` re-authenticates the acting user in the handler itself
    // (floor kiosk flow), so it carries no permission layer here.
    let set_routes = Router::new().route("/set", post(handler::set_table));

    index_routes
        .merge(show_routes)
        .merge(create_routes)
        .merge(update_routes)
        .merge(delete_routes)
        .merge(set_routes)
}
