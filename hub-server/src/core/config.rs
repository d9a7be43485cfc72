use crate::auth::{JwtConfig, JwtError};

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | ./data | Working directory (database, logs) |
/// | DATABASE_URL | sqlite:<WORK_DIR>/hub.db | SQLite database |
/// | HTTP_PORT | 3000 | HTTP port |
/// | ENVIRONMENT | development | development / staging / production |
/// | LOG_LEVEL | info | Default log level |
/// | LOG_JSON | false | JSON console output |
/// | MAX_SESSIONS_PER_ACTOR | 3 | Concurrent sessions kept per account |
/// | ORDER_MIN_LEAD_MINUTES | 15 | Earliest scheduled slot |
/// | ORDER_MAX_DAYS_AHEAD | 7 | Latest scheduled slot |
/// | ORDER_REQUEST_CONFIRM_TTL_MINUTES | 30 | Confirmed requests expire after this |
/// | SWEEP_INTERVAL_SECS | 60 | Background sweeper period |
/// | REQUEST_TIMEOUT_MS | 30000 | HTTP request timeout |
/// | LOGIN_MAX_ATTEMPTS | 10 | Login attempts per minute and client |
/// | BOOTSTRAP_ADMIN_EMAIL / BOOTSTRAP_ADMIN_PASSWORD | - | First super-admin |
///
/// JWT settings are read by [`JwtConfig::from_env`].
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: String,
    pub database_url: String,
    pub http_port: u16,
    pub environment: String,
    pub log_level: String,
    pub log_json: bool,
    pub jwt: JwtConfig,
    pub max_sessions_per_actor: u32,
    pub order_min_lead_minutes: i64,
    pub order_max_days_ahead: i64,
    pub confirm_ttl_minutes: i64,
    pub sweep_interval_secs: u64,
    pub request_timeout_ms: u64,
    pub login_max_attempts: u32,
    pub bootstrap_admin_email: Option<String>,
    pub bootstrap_admin_password: Option<String>,
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Load configuration from the environment
    ///
    /// Unset variables fall back to their defaults; only the JWT secret can
    /// fail (too short, or missing in a release build).
    pub fn from_env() -> Result<Self, JwtError> {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into());
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| format!("sqlite:{}/hub.db", work_dir.trim_end_matches('/')));

        Ok(Self {
            database_url,
            http_port: env_or("HTTP_PORT", 3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: env_or("LOG_JSON", false),
            jwt: JwtConfig::from_env()?,
            max_sessions_per_actor: env_or("MAX_SESSIONS_PER_ACTOR", 3),
            order_min_lead_minutes: env_or("ORDER_MIN_LEAD_MINUTES", 15),
            order_max_days_ahead: env_or("ORDER_MAX_DAYS_AHEAD", 7),
            confirm_ttl_minutes: env_or("ORDER_REQUEST_CONFIRM_TTL_MINUTES", 30),
            sweep_interval_secs: env_or("SWEEP_INTERVAL_SECS", 60),
            request_timeout_ms: env_or("REQUEST_TIMEOUT_MS", 30_000),
            login_max_attempts: env_or("LOGIN_MAX_ATTEMPTS", 10),
            bootstrap_admin_email: env_opt("BOOTSTRAP_ADMIN_EMAIL"),
            bootstrap_admin_password: env_opt("BOOTSTRAP_ADMIN_PASSWORD"),
            work_dir,
        })
    }

    /// Deterministic configuration for tests (in-memory database, fixed secret)
    pub fn for_tests() -> Self {
        Self {
            work_dir: std::env::temp_dir().to_string_lossy().into_owned(),
            database_url: "sqlite::memory:".into(),
            http_port: 0,
            environment: "test".into(),
            log_level: "warn".into(),
            log_json: false,
            jwt: JwtConfig::with_secret("test-secret-that-is-long-enough-for-hs256"),
            max_sessions_per_actor: 3,
            order_min_lead_minutes: 15,
            order_max_days_ahead: 7,
            confirm_ttl_minutes: 30,
            sweep_interval_secs: 60,
            request_timeout_ms: 30_000,
            login_max_attempts: 1000,
            bootstrap_admin_email: None,
            bootstrap_admin_password: None,
        }
    }

    /// Override the working directory and port
    pub fn with_overrides(mut self, work_dir: impl Into<String>, http_port: u16) -> Self {
        self.work_dir = work_dir.into();
        self.http_port = http_port;
        self
    }

    pub fn log_dir(&self) -> String {
        format!("{}/logs", self.work_dir.trim_end_matches('/'))
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}
