use hub_server::{Server, print_banner, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment (.env, config, logger)
    let config = setup_environment()?;

    print_banner();
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        "Hub server starting..."
    );
    if config.is_development() && config.bootstrap_admin_email.is_none() {
        tracing::warn!("BOOTSTRAP_ADMIN_EMAIL not set, no super-admin will be created");
    }

    // 2. Serve until Ctrl-C (state and background tasks are set up by run)
    let server = Server::new(config);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
