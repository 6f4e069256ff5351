//! Error types for the places server binary.
//!
//! [`AppError`] is the top-level error type that wraps every failure
//! `main` can hit during startup or while serving.

/// Top-level error for the places server binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: crate::config::ConfigError,
    },

    /// The storage backend could not be set up.
    #[error("storage error: {source}")]
    Storage {
        /// The underlying data layer error.
        #[from]
        source: places_db::DbError,
    },

    /// The HTTP server failed to bind or serve.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: places_api::ServerError,
    },
}
