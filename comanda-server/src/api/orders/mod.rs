//! Order API 模块

mod handler;

use axum::{middleware, routing::delete, routing::get, routing::patch, routing::post, Router};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router(state: ServerState) -> Router<ServerState> {
    Router::new().nest("/api/orders", routes(state))
}

fn routes(state: ServerState) -> Router<ServerState> {
    let index_routes = Router::new()
        .route("/", get(handler::list))
        .route("/queue", get(handler::queue))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission("order.index"),
        ));

    let show_routes = Router::new()
        .route("/{id}", get(handler::show))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission("order.show"),
        ));

    let create_routes = Router::new()
        .route("/", post(handler::store))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission("order.create"),
        ));

    let update_routes = Router::new()
        .route("/{id}/details/{detail_id}/serve", patch(handler::serve))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission("order.update"),
        ));

    let delete_routes = Router::new()
        .route("/{id}", delete(handler::destroy))
        .route("/{id}/details/{detail_id}", delete(handler::destroy_detail))
        .layer(middleware::from_fn_with_state(
            state,
            require_permission("order.delete"),
        ));

    index_routes
        .merge(show_routes)
        .merge(create_routes)
        .merge(update_routes)
        .merge(delete_routes)
}
