//! Message Ingest Server - Main Entry Point

use anyhow::Result;
use tracing::{error, info};

use mi_server::{api, config, db, observability};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env()?;

    // Initialize tracing and metrics; keep the guard alive until exit
    let _otel_guard = observability::init(&config);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting Message Ingest Server"
    );

    if !config.has_webhook_secret() {
        error!("WEBHOOK_SECRET is not set or empty. Service will not be ready.");
    }

    // Initialize database
    let db_pool = db::create_pool(&config.database_url).await?;
    db::init_schema(&db_pool).await?;

    // Build application state and router
    let bind_address = config.bind_address.clone();
    let state = api::AppState::new(db_pool.clone(), config);
    let app = api::create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!(address = %bind_address, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db_pool.close().await;
    info!("Server shutdown complete");

    Ok(())
}

/// Resolve on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Received shutdown signal, cleaning up...");
}
