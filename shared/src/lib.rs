//! Shared types for the ordering hub
//!
//! Common types used by the server and by API consumers: unified error
//! codes and response envelopes, data models, live event payloads and
//! small utilities.

pub mod error;
pub mod live;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use live::{LiveEvent, LiveEventKind};
