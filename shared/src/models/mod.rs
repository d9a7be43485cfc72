//! Data models
//!
//! Shared between hub-server and API consumers.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` snowflakes, timestamps are UTC epoch milliseconds.

pub mod account;
pub mod cart;
pub mod coupon;
pub mod discovery;
pub mod menu;
pub mod order;
pub mod order_request;
pub mod rbac;
pub mod report;
pub mod restaurant;
pub mod session;

// Re-exports
pub use account::*;
pub use cart::*;
pub use coupon::*;
pub use discovery::*;
pub use menu::*;
pub use order::*;
pub use order_request::*;
pub use rbac::*;
pub use report::*;
pub use restaurant::*;
pub use session::*;
