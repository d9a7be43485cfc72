//! Background task management
//!
//! - [`TaskKind::Listener`] - event relays (live forwarder)
//! - [`TaskKind::Periodic`] - timers (request expiry, session purge, log cleanup)

use futures::FutureExt;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::ServerState;
use crate::db::repository::session as session_repo;
use crate::ordering::workflow;
use crate::utils::logger::{LOG_RETENTION_DAYS, cleanup_old_logs};
use shared::util::now_millis;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Listener,
    Periodic,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Listener => write!(f, "Listener"),
            TaskKind::Periodic => write!(f, "Periodic"),
        }
    }
}

struct RegisteredTask {
    name: &'static str,
    handle: JoinHandle<()>,
}

/// Owns every background task and their shared shutdown token
pub struct BackgroundTasks {
    tasks: Vec<RegisteredTask>,
    shutdown: CancellationToken,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Spawn a task; panics are caught and logged
    pub fn spawn<F>(&mut self, name: &'static str, kind: TaskKind, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let shutdown = self.shutdown.clone();
        let wrapped = async move {
            match AssertUnwindSafe(future).catch_unwind().await {
                Ok(()) if !shutdown.is_cancelled() => {
                    tracing::warn!(task = %name, kind = %kind, "Background task completed unexpectedly");
                }
                Ok(()) => {}
                Err(panic) => {
                    let msg = panic
                        .downcast_ref::<&str>()
                        .map(|s| (*s).to_string())
                        .or_else(|| panic.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "Unknown panic".to_string());
                    tracing::error!(task = %name, kind = %kind, panic = %msg, "Background task panicked");
                }
            }
        };

        self.tasks.push(RegisteredTask {
            name,
            handle: tokio::spawn(wrapped),
        });
        tracing::debug!(task = %name, kind = %kind, "Registered background task");
    }

    /// Run `tick` every `period` until shutdown
    pub fn spawn_periodic<F, Fut>(&mut self, name: &'static str, period: Duration, mut tick: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let shutdown = self.shutdown.clone();
        self.spawn(name, TaskKind::Periodic, async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => return,
                    _ = interval.tick() => tick().await,
                }
            }
        });
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Cancel every task and wait for it to finish
    pub async fn shutdown(self) {
        tracing::info!("Shutting down {} background tasks...", self.tasks.len());
        self.shutdown.cancel();

        for task in self.tasks {
            match task.handle.await {
                Ok(()) => tracing::debug!(task = %task.name, "Task completed"),
                Err(e) if e.is_cancelled() => tracing::debug!(task = %task.name, "Task cancelled"),
                Err(e) => tracing::error!(task = %task.name, error = ?e, "Task panicked"),
            }
        }
        tracing::info!("All background tasks stopped");
    }
}

impl Default for BackgroundTasks {
    fn default() -> Self {
        Self::new()
    }
}

/// Register the periodic maintenance jobs
pub fn register_maintenance(tasks: &mut BackgroundTasks, state: &ServerState) {
    let sweep = Duration::from_secs(state.config.sweep_interval_secs.max(1));

    let s = state.clone();
    tasks.spawn_periodic("order_request_expiry", sweep, move || {
        let s = s.clone();
        async move {
            let cutoff = now_millis() - s.config.confirm_ttl_minutes * 60_000;
            match workflow::expire_stale(&s, cutoff).await {
                Ok(0) => {}
                Ok(n) => tracing::info!(expired = n, "Expired stale confirmed order requests"),
                Err(e) => tracing::error!(error = %e, "Order request expiry sweep failed"),
            }
        }
    });

    let s = state.clone();
    tasks.spawn_periodic("session_purge", Duration::from_secs(600), move || {
        let s = s.clone();
        async move {
            match session_repo::purge_expired(s.pool(), now_millis()).await {
                Ok(0) => {}
                Ok(n) => tracing::info!(purged = n, "Purged expired sessions"),
                Err(e) => tracing::error!(error = %e, "Session purge failed"),
            }
        }
    });

    let limiter = state.login_limiter.clone();
    tasks.spawn_periodic("login_limiter_cleanup", Duration::from_secs(300), move || {
        let limiter = limiter.clone();
        async move {
            limiter.cleanup();
        }
    });

    let log_dir = state.config.log_dir();
    tasks.spawn_periodic("log_cleanup", Duration::from_secs(24 * 3600), move || {
        let log_dir = log_dir.clone();
        async move {
            match cleanup_old_logs(&log_dir, LOG_RETENTION_DAYS) {
                Ok(0) => {}
                Ok(n) => tracing::info!(removed = n, "Removed old log files"),
                Err(e) => tracing::warn!(error = %e, "Log cleanup failed"),
            }
        }
    });
}
