//! Order request API module
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/customer/order-requests | GET, POST | customer |
//! | /api/customer/order-requests/{id} | GET | customer |
//! | /api/customer/order-requests/{id}/cancel | POST | customer |
//! | /api/customer/order-requests/{id}/place | POST | customer |
//! | /api/staff/order-requests | GET | orders:respond |
//! | /api/staff/order-requests/{id} | GET | orders:respond |
//! | /api/staff/order-requests/{id}/{confirm,reject,wait} | POST | orders:respond |

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
        .nest("/api/customer/order-requests", customer_routes())
        .nest("/api/staff/order-requests", staff_routes())
}

fn customer_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::customer_list).post(handler::create))
        .route("/{id}", get(handler::customer_get))
        .route("/{id}/cancel", post(handler::cancel))
        .route("/{id}/place", post(handler::place))
        .layer(middleware::from_fn(require_actor(ActorKind::Customer)))
}

fn staff_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::staff_list))
        .route("/{id}", get(handler::staff_get))
        .route("/{id}/confirm", post(handler::confirm))
        .route("/{id}/reject", post(handler::reject))
        .route("/{id}/wait", post(handler::wait))
        .layer(middleware::from_fn(require_permission("orders:respond")))
        .layer(middleware::from_fn(require_actor(ActorKind::Staff)))
}
