//! Hub Server - multi-tenant restaurant ordering platform
//!
//! # Overview
//!
//! One process serves three actor classes over HTTP and Socket.IO:
//!
//! - **Super-admins** onboard and moderate restaurants
//! - **Restaurant staff** manage menus and answer order requests
//! - **Customers** browse, fill a cart, request and place orders
//!
//! # Module layout
//!
//! ```text
//! hub-server/src/
//! ├── core/          # config, state, server, background tasks
//! ├── auth/          # JWT, sessions, RBAC middleware
//! ├── api/           # HTTP routes and handlers
//! ├── db/            # SQLite pool, migrations, repositories
//! ├── ordering/      # cart, coupons, time slots, request workflow
//! ├── geo/           # restaurant discovery
//! ├── live/          # live push (Socket.IO)
//! └── utils/         # logging, money, time
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod geo;
pub mod live;
pub mod ordering;
pub mod utils;

// Re-exports
pub use api::build_app;
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use live::LiveHub;
pub use utils::{ApiResponse, AppError, AppResult, ErrorCode};

pub use utils::logger::{cleanup_old_logs, init_logger, init_logger_with_file};

// Security logging macro
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// Load `.env`, read the configuration and install the logger
pub fn setup_environment() -> anyhow::Result<Config> {
    dotenv::dotenv().ok();

    let config = Config::from_env()?;
    std::fs::create_dir_all(config.log_dir())?;
    init_logger_with_file(
        Some(&config.log_level),
        Some(config.log_json),
        Some(&config.log_dir()),
    )?;
    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
    __  __      __
   / / / /_  __/ /_
  / /_/ / / / / __ \
 / __  / /_/ / /_/ /
/_/ /_/\__,_/_.___/
    "#
    );
}
