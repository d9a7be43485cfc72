//! Coupon API module
//!
//! Super-admins manage platform-wide coupons, staff manage their
//! restaurant's coupons. Both need `coupons:manage` in their own set.
//!
//! | Path | Method |
//! |------|--------|
//! | /api/{admin,staff}/coupons | GET, POST |
//! | /api/{admin,staff}/coupons/{id} | GET, PUT, DELETE |

mod handler;

use axum::{Router, middleware, routing::get};
use shared::models::ActorKind;

use crate::auth::{require_actor, require_permission};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .nest("/api/admin/coupons", routes(ActorKind::Admin))
        .nest("/api/staff/coupons", routes(ActorKind::Staff))
}

fn routes(kind: ActorKind) -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .layer(middleware::from_fn(require_permission("coupons:manage")))
        .layer(middleware::from_fn(require_actor(kind)))
}
