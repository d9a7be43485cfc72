//! Menu API module (staff side)
//!
//! Everything is scoped to the caller's restaurant. Reads need
//! `menu:read`, mutations `menu:manage`.
//!
//! | Path | Methods |
//! |------|---------|
//! | /api/staff/menu/tree | GET |
//! | /api/staff/menu/categories[/{id}] | GET, POST / GET, PUT, DELETE |
//! | /api/staff/menu/subcategories[/{id}] | same (`?category_id=`) |
//! | /api/staff/menu/attributes[/{id}] | same |
//! | /api/staff/menu/addons[/{id}] | same |
//! | /api/staff/menu/items[/{id}] | same (`?subcategory_id=`) |
//! | /api/staff/menu/combos[/{id}] | same |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use shared::models::ActorKind;

use crate::auth::{require_actor, require_permission};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/staff/menu", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/tree", get(handler::tree))
        .route("/categories", get(handler::category_list))
        .route("/categories/{id}", get(handler::category_get))
        .route("/subcategories", get(handler::subcategory_list))
        .route("/subcategories/{id}", get(handler::subcategory_get))
        .route("/attributes", get(handler::attribute_list))
        .route("/attributes/{id}", get(handler::attribute_get))
        .route("/addons", get(handler::addon_list))
        .route("/addons/{id}", get(handler::addon_get))
        .route("/items", get(handler::item_list))
        .route("/items/{id}", get(handler::item_get))
        .route("/combos", get(handler::combo_list))
        .route("/combos/{id}", get(handler::combo_get))
        .layer(middleware::from_fn(require_permission("menu:read")));

    let manage_routes = Router::new()
        .route("/categories", post(handler::category_create))
        .route(
            "/categories/{id}",
            put(handler::category_update).delete(handler::category_delete),
        )
        .route("/subcategories", post(handler::subcategory_create))
        .route(
            "/subcategories/{id}",
            put(handler::subcategory_update).delete(handler::subcategory_delete),
        )
        .route("/attributes", post(handler::attribute_create))
        .route(
            "/attributes/{id}",
            put(handler::attribute_update).delete(handler::attribute_delete),
        )
        .route("/addons", post(handler::addon_create))
        .route(
            "/addons/{id}",
            put(handler::addon_update).delete(handler::addon_delete),
        )
        .route("/items", post(handler::item_create))
        .route(
            "/items/{id}",
            put(handler::item_update).delete(handler::item_delete),
        )
        .route("/combos", post(handler::combo_create))
        .route(
            "/combos/{id}",
            put(handler::combo_update).delete(handler::combo_delete),
        )
        .layer(middleware::from_fn(require_permission("menu:manage")));

    read_routes
        .merge(manage_routes)
        .layer(middleware::from_fn(require_actor(ActorKind::Staff)))
}
