//! Server Implementation
//!
//! Binds the HTTP listener, mounts the Socket.IO layer, starts the
//! background tasks and shuts everything down on Ctrl-C.

use std::net::SocketAddr;

use shared::error::{AppError, AppResult};
use socketioxide::SocketIo;

use crate::api::build_app;
use crate::core::tasks::{BackgroundTasks, TaskKind, register_maintenance};
use crate::core::{Config, ServerState};
use crate::live::socket;

/// HTTP Server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    pub async fn run(&self) -> AppResult<()> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config).await?,
        };

        let (io_layer, io) = SocketIo::new_layer();
        socket::register(&io, state.clone());

        let mut tasks = BackgroundTasks::new();
        tasks.spawn(
            "live_forwarder",
            TaskKind::Listener,
            socket::forward(io, state.live.clone(), tasks.shutdown_token()),
        );
        register_maintenance(&mut tasks, &state);
        tracing::info!(tasks = tasks.len(), "Background tasks started");

        let app = build_app(state.clone()).layer(io_layer);

        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
        tracing::info!(
            "Ordering hub listening on {} ({})",
            addr,
            self.config.environment
        );

        let shutdown = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
            tracing::info!("Shutting down...");
        };

        let served = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| AppError::internal(format!("Server error: {e}")));

        tasks.shutdown().await;
        served
    }
}
