//! # vcts-api — Binary Entry Point
//!
//! Starts the Axum HTTP server. Binds to `PORT` (default 8080).

use vcts_api::AppState;
use vcts_suite::Settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::from_env().map_err(|e| {
        tracing::error!("invalid configuration: {e}");
        e
    })?;
    let port = settings.port;
    match &settings.allure_api {
        Some(url) => tracing::info!(allure_api = %url, "report publishing enabled"),
        None => tracing::warn!("ALLURE_API not set, report publishing disabled"),
    }
    if settings.offline {
        tracing::info!("offline mode: contexts resolve from bundled snapshots only");
    }

    let state = AppState::new(settings)?;
    let app = vcts_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("vcts API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
