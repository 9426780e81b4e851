use std::process::ExitCode;

use lorekeeper::{AppState, Config, app, db};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_target(false)
        .compact()
        .with_env_filter(filter)
        .init();
}

/// Resolve on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received SIGINT, starting graceful shutdown"),
        () = terminate => tracing::info!("Received SIGTERM, starting graceful shutdown"),
    }
}

async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let db = db::connect(&config.database_url).await?;
    let state = AppState::new(db.clone(), config.page_size_cap());

    let addr = config.bind_address()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");
    tracing::info!("Health check available at http://{addr}/health");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("HTTP server closed");
    db.close().await?;
    tracing::info!("Graceful shutdown completed");
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::load();
    init_logging();

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "Failed to start server");
            ExitCode::FAILURE
        }
    }
}
