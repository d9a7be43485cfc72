//! Report API module
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/admin/reports/summary | GET | reports:view |
//! | /api/staff/reports/summary?from=&to= | GET | reports:view |

mod handler;

use axum::{Router, middleware, routing::get};
use shared::models::ActorKind;

use crate::auth::{require_actor, require_permission};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    let admin = Router::new()
        .route("/summary", get(handler::admin_summary))
        .layer(middleware::from_fn(require_permission("reports:view")))
        .layer(middleware::from_fn(require_actor(ActorKind::Admin)));

    let staff = Router::new()
        .route("/summary", get(handler::restaurant_summary))
        .layer(middleware::from_fn(require_permission("reports:view")))
        .layer(middleware::from_fn(require_actor(ActorKind::Staff)));

    Router::new()
        .nest("/api/admin/reports", admin)
        .nest("/api/staff/reports", staff)
}
