//! Places server binary.
//!
//! This is the main entry point that wires together configuration,
//! logging, the storage backend, and the HTTP/real-time server.
//!
//! # Startup Sequence
//!
//! 1. Load `.env` into the environment, if present
//! 2. Load configuration from the environment
//! 3. Initialize structured logging (tracing)
//! 4. Open the storage backend (`PostgreSQL` lazily, or in-memory)
//! 5. Start bootstrapping the `places` table in the background
//! 6. Serve until `Ctrl-C`, then close the pool

mod config;
mod error;

use std::sync::Arc;

use places_api::AppState;
use places_db::{MemoryPlaceStore, PgPlaceStore, PlaceStore, PostgresPool};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, Settings, StorageConfig};
use crate::error::AppError;

/// Application entry point for the places server.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the storage URL cannot
/// be parsed, or the server cannot bind.
#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Seed the environment from `.env`.
    let dotenv_path = dotenv::dotenv().ok();

    // 2-3. Load configuration, then initialize structured logging so a
    // bad variable is reported through it.
    let settings = Settings::from_env();
    init_tracing(settings.as_ref().map_or(LogFormat::Pretty, |s| s.log_format));
    info!(
        dotenv = ?dotenv_path,
        "places-server starting"
    );
    let settings = settings.inspect_err(|e| error!(error = %e, "Invalid configuration"))?;
    info!(
        host = settings.server.host,
        port = settings.server.port,
        allowed_origin = ?settings.allowed_origin,
        "Configuration loaded"
    );

    // 4-5. Open storage.
    let (store, pool) = open_store(&settings.storage)?;

    // 6. Serve.
    let state = Arc::new(AppState::new(store, settings.allowed_origin.clone()));
    let result = places_api::start_server(&settings.server, state).await;

    if let Some(pool) = pool {
        pool.close().await;
    }
    result?;

    info!("places-server shutdown complete");
    Ok(())
}

/// Install the global tracing subscriber.
fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

/// Build the configured store.
///
/// `PostgreSQL` pools connect lazily. The table bootstrap is started on a
/// background task, and every store operation retries it until it
/// succeeds: an unreachable database is logged, not fatal, and requests
/// fail with `500` until it becomes reachable.
fn open_store(
    storage: &StorageConfig,
) -> Result<(Arc<dyn PlaceStore>, Option<PostgresPool>), AppError> {
    match storage {
        StorageConfig::Memory => {
            info!("Using in-memory place store");
            Ok((Arc::new(MemoryPlaceStore::new()), None))
        }
        StorageConfig::Postgres(pg) => {
            let pool = PostgresPool::connect_lazy(pg)?;
            info!(
                max_connections = pg.max_connections,
                "Using PostgreSQL place store"
            );

            let store = PgPlaceStore::new(pool.clone());
            let bootstrap = store.clone();
            tokio::spawn(async move {
                if let Err(e) = bootstrap.ensure_schema().await {
                    error!(error = %e, "Storage unreachable at startup, retrying on first use");
                }
            });

            Ok((Arc::new(store), Some(pool)))
        }
    }
}
