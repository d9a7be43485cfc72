//! Restaurant API module
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/public/restaurants/register | POST | none |
//! | /api/public/restaurants | GET | none |
//! | /api/public/restaurants/along-route | GET | none |
//! | /api/public/restaurants/nearby | GET | none |
//! | /api/public/restaurants/{id} | GET | none |
//! | /api/public/restaurants/{id}/menu | GET | none |
//! | /api/admin/restaurants | GET | restaurants:read |
//! | /api/admin/restaurants/{id} | GET | restaurants:read |
//! | /api/admin/restaurants/{id}/{approve,reject,suspend,reinstate} | POST | restaurants:manage |
//! | /api/staff/restaurant | GET, PUT | restaurant:settings |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use shared::models::ActorKind;

use crate::auth::{require_actor, require_permission};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .nest("/api/public/restaurants", public_routes())
        .nest("/api/admin/restaurants", admin_routes())
        .nest("/api/staff/restaurant", staff_routes())
}

fn public_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list_approved))
        .route("/register", post(handler::register))
        .route("/along-route", get(handler::along_route))
        .route("/nearby", get(handler::nearby))
        .route("/{id}", get(handler::get_approved))
        .route("/{id}/menu", get(handler::public_menu))
}

fn admin_routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::admin_list))
        .route("/{id}", get(handler::admin_get))
        .layer(middleware::from_fn(require_permission("restaurants:read")));

    let manage_routes = Router::new()
        .route("/{id}/approve", post(handler::approve))
        .route("/{id}/reject", post(handler::reject))
        .route("/{id}/suspend", post(handler::suspend))
        .route("/{id}/reinstate", post(handler::reinstate))
        .layer(middleware::from_fn(require_permission("restaurants:manage")));

    read_routes
        .merge(manage_routes)
        .layer(middleware::from_fn(require_actor(ActorKind::Admin)))
}

fn staff_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::own).put(handler::update_own))
        .layer(middleware::from_fn(require_permission("restaurant:settings")))
        .layer(middleware::from_fn(require_actor(ActorKind::Staff)))
}
