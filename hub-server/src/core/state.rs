//! Shared server state

use std::sync::Arc;
use std::time::Duration;

use shared::error::{AppError, AppResult};

use crate::auth::password::hash_password;
use crate::auth::{JwtService, LoginLimiter};
use crate::core::Config;
use crate::db::{DbService, seed};
use crate::live::LiveHub;
use crate::ordering::time_slot::SlotRules;

/// Server state, cloned into every handler
///
/// | Field | Meaning |
/// |-------|---------|
/// | config | Immutable configuration |
/// | db | SQLite pool |
/// | jwt_service | Token issue / validation |
/// | live | Live event fan-out |
/// | login_limiter | Login attempt windows |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub db: DbService,
    pub jwt_service: Arc<JwtService>,
    pub live: LiveHub,
    pub login_limiter: LoginLimiter,
}

impl ServerState {
    fn assemble(config: Config, db: DbService) -> Self {
        Self {
            jwt_service: Arc::new(JwtService::with_config(config.jwt.clone())),
            live: LiveHub::new(),
            login_limiter: LoginLimiter::new(config.login_max_attempts, Duration::from_secs(60)),
            db,
            config,
        }
    }

    /// Open the database, run migrations and create the bootstrap admin
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        std::fs::create_dir_all(&config.work_dir).map_err(|e| {
            AppError::internal(format!("Failed to create work dir {}: {e}", config.work_dir))
        })?;

        let db = DbService::new(&config.database_url).await?;
        let state = Self::assemble(config.clone(), db);
        state.bootstrap_admin().await?;
        Ok(state)
    }

    /// State over a private in-memory database
    pub async fn for_tests(config: Config) -> AppResult<Self> {
        let db = DbService::in_memory().await?;
        let state = Self::assemble(config, db);
        state.bootstrap_admin().await?;
        Ok(state)
    }

    async fn bootstrap_admin(&self) -> AppResult<()> {
        let (Some(email), Some(password)) = (
            self.config.bootstrap_admin_email.as_deref(),
            self.config.bootstrap_admin_password.as_deref(),
        ) else {
            return Ok(());
        };
        let hash = hash_password(password)?;
        seed::ensure_bootstrap_admin(&self.db.pool, email, &hash).await?;
        Ok(())
    }

    pub fn pool(&self) -> &sqlx::SqlitePool {
        &self.db.pool
    }

    pub fn slot_rules(&self) -> SlotRules {
        SlotRules {
            min_lead_minutes: self.config.order_min_lead_minutes,
            max_days_ahead: self.config.order_max_days_ahead,
        }
    }
}
