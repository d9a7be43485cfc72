//! Cart API module
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/customer/cart | GET, DELETE | customer |
//! | /api/customer/cart/lines | POST | customer |
//! | /api/customer/cart/lines/{line_id} | PUT, DELETE | customer |
//! | /api/customer/cart/coupon | POST, DELETE | customer |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use shared::models::ActorKind;

use crate::auth::require_actor;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/customer/cart", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::get_cart).delete(handler::clear))
        .route("/lines", post(handler::add_line))
        .route(
            "/lines/{line_id}",
            put(handler::update_line).delete(handler::remove_line),
        )
        .route(
            "/coupon",
            post(handler::apply_coupon).delete(handler::remove_coupon),
        )
        .layer(middleware::from_fn(require_actor(ActorKind::Customer)))
}
