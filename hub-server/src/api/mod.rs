//! API routes
//!
//! # Structure
//!
//! Routes are grouped per actor class; each class's tree sits behind its
//! `require_actor` guard.
//!
//! | Prefix | Caller |
//! |--------|--------|
//! | `/api/public/...` | anyone |
//! | `/api/admin/...` | super-admins |
//! | `/api/staff/...` | restaurant staff |
//! | `/api/customer/...` | customers |
//!
//! - [`health`] - liveness and database status
//! - [`auth`] - login, logout, registration, `me`
//! - [`restaurants`] - onboarding, moderation, profile, discovery
//! - [`roles`] - admin and staff roles, permission catalogues
//! - [`accounts`] - admin, staff and customer accounts
//! - [`menu`] - staff menu management
//! - [`cart`] - customer cart
//! - [`coupons`] - platform and restaurant coupons
//! - [`order_requests`] - request workflow
//! - [`orders`] - placed orders
//! - [`reports`] - dashboards

pub mod accounts;
pub mod auth;
pub mod cart;
pub mod coupons;
pub mod health;
pub mod menu;
pub mod order_requests;
pub mod orders;
pub mod reports;
pub mod restaurants;
pub mod roles;

use std::time::Duration;

use axum::{Router, middleware};
use http::{HeaderName, HeaderValue};
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::require_auth;
use crate::core::ServerState;

pub use shared::error::{AppError, AppResult};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// All routes, without middleware or state
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(restaurants::router())
        .merge(roles::router())
        .merge(accounts::router())
        .merge(menu::router())
        .merge(cart::router())
        .merge(coupons::router())
        .merge(order_requests::router())
        .merge(orders::router())
        .merge(reports::router())
}

/// Fully configured application
///
/// Used by the HTTP server and by oneshot tests.
pub fn build_app(state: ServerState) -> Router {
    let timeout = Duration::from_millis(state.config.request_timeout_ms);

    build_router()
        // Injects CurrentUser; skips public paths
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
        .layer(TimeoutLayer::new(timeout))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        // Router layers wrap outward: the ID is set before it is propagated
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
}
