//! Authentication and authorization
//!
//! - [`JwtService`] - token issue and validation
//! - [`CurrentUser`] - principal injected into requests
//! - [`require_auth`] - bearer token + session check
//! - [`require_actor`] - keeps each actor class on its own route tree
//! - [`require_permission`] - RBAC guard
//! - [`LoginLimiter`] - login attempt limiting

pub mod jwt;
pub mod middleware;
pub mod password;
pub mod permissions;
pub mod rate_limit;
pub mod session;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{require_actor, require_auth, require_permission};
pub use rate_limit::LoginLimiter;
pub use session::{Principal, authenticate_token, close_session, open_session};
