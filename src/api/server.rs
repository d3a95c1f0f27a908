//! HTTP server startup.

use tokio::net::TcpListener;
use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::utils::shutdown_signal;

use super::handlers::AppState;
use super::routes::create_app;

/// Bind the configured address and serve until a shutdown signal arrives.
pub async fn serve(state: AppState, config: &Config) -> Result<()> {
    let addr = config.bind_addr();
    let listener = TcpListener::bind(addr.as_str()).await?;
    info!("Character Cards API running on {}", listener.local_addr()?);

    let router = create_app(state, config);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
