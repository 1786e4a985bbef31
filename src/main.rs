use anyhow::Context;
use biolink_core::{app_config, build_router, db::mask_connection_string, initialize_app_state};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before the filter reads RUST_LOG
    dotenv::dotenv().ok();

    let config = app_config::config();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.rust_log.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting biolink-core on {} ({})",
        config.bind_address, config.environment
    );
    info!(
        "Database URL: {}",
        mask_connection_string(&config.database_url)
    );

    let state = match initialize_app_state().await {
        Ok(state) => {
            info!("Database connection pool initialized successfully");
            state
        },
        Err(e) => {
            error!("Failed to initialize application state: {}", e);
            anyhow::bail!("initialization failed: {}", e);
        },
    };

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address))?;

    info!("Listening on {}", config.bind_address);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
