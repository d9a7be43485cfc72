//! Core module - configuration, state, runtime
//!
//! - [`Config`] - environment configuration
//! - [`ServerState`] - shared handler state
//! - [`Server`] - HTTP / Socket.IO server
//! - [`tasks`] - background task registry

pub mod config;
pub mod server;
pub mod state;
pub mod tasks;

pub use config::Config;
pub use server::Server;
pub use state::ServerState;
