//! HTTP server lifecycle management.
//!
//! Provides [`bind_with_fallback`], which claims the configured port or,
//! if something else already holds it, an OS-assigned ephemeral port,
//! and [`serve`], which runs the Axum server until a shutdown signal.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::router::build_router;
use crate::state::AppState;

/// Configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The host address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// The TCP port to listen on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 5000,
        }
    }
}

impl ServerConfig {
    /// The socket address this configuration names.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if `host:port` is not a valid address.
    pub fn addr(&self) -> Result<SocketAddr, ServerError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ServerError::Bind(format!("invalid address: {e}")))
    }
}

/// Bind the configured address, falling back to an ephemeral port.
///
/// Only "address in use" triggers the fallback; any other bind failure
/// is returned as is.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the address is invalid, the bind
/// fails for another reason, or the fallback bind fails too.
pub async fn bind_with_fallback(config: &ServerConfig) -> Result<TcpListener, ServerError> {
    let addr = config.addr()?;

    match TcpListener::bind(addr).await {
        Ok(listener) => Ok(listener),
        Err(e) if e.kind() == io::ErrorKind::AddrInUse => {
            warn!(port = config.port, "Port already in use, trying an ephemeral port");
            let fallback = SocketAddr::new(addr.ip(), 0);
            let listener = TcpListener::bind(fallback)
                .await
                .map_err(|e| ServerError::Bind(format!("bind failed on {fallback}: {e}")))?;
            if let Ok(bound) = listener.local_addr() {
                info!(port = bound.port(), "Bound fallback port");
            }
            Ok(listener)
        }
        Err(e) => Err(ServerError::Bind(format!("bind failed on {addr}: {e}"))),
    }
}

/// Serve requests on `listener` until `shutdown` completes.
///
/// In-flight requests are allowed to finish before this returns.
///
/// # Errors
///
/// Returns [`ServerError::Serve`] if the server hits a fatal I/O error.
pub async fn serve<F>(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener
        .local_addr()
        .map_err(|e| ServerError::Serve(format!("no local address: {e}")))?;
    info!(%addr, "Places server listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ServerError::Serve(format!("serve error: {e}")))?;

    info!("Places server stopped");
    Ok(())
}

/// Bind (with fallback) and serve until `Ctrl-C`.
///
/// # Errors
///
/// Returns an error if binding or serving fails.
pub async fn start_server(config: &ServerConfig, state: Arc<AppState>) -> Result<(), ServerError> {
    let listener = bind_with_fallback(config).await?;
    serve(listener, state, shutdown_signal()).await
}

/// Resolve when the process receives `Ctrl-C`.
///
/// If the signal handler cannot be installed this never resolves, so
/// the server keeps running rather than stopping at once.
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    }
}

/// Errors that can occur when starting or running the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to the network address.
    #[error("bind error: {0}")]
    Bind(String),

    /// The server encountered a fatal error while serving.
    #[error("serve error: {0}")]
    Serve(String),
}
