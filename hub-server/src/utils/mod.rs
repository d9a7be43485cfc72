//! Utility module
//!
//! - [`logger`] - tracing setup and log retention
//! - [`money`] - decimal money arithmetic
//! - [`time`] - opening hours and local time

pub mod logger;
pub mod money;
pub mod time;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCode};
