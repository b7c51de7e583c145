//! Picklist API 模块

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

use crate::auth::require_role;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/picklists", routes())
}

fn routes() -> Router<ServerState> {
    // 软删除条目仅限管理员
    let admin_routes = Router::new()
        .route("/{name}/items/{item_id}", delete(handler::remove_item))
        .layer(middleware::from_fn(require_role("admin")));

    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{name}", get(handler::get_by_name))
        .route("/{name}/items", post(handler::add_item))
        .merge(admin_routes)
}
