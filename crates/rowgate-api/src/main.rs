use std::sync::Arc;

use anyhow::Context;
use rowgate::Database;
use rowgate_api::{ApiConfig, PgCustomerStore, router};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let config = ApiConfig::from_env().context("loading configuration")?;
    let db = Database::connect(config.database.clone())
        .await
        .context("connecting to the database")?;
    let store = Arc::new(PgCustomerStore::new(db));

    let listener = tokio::net::TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("binding {}", config.listen))?;
    tracing::info!(listen = %config.listen, "rowgate-api listening");

    axum::serve(listener, router(Arc::clone(&store)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    store.close().await;
    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
    }
}
