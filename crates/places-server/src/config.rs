//! Configuration for the places server.
//!
//! All configuration is loaded from environment variables (a `.env` file,
//! if present, is loaded into the environment first by `main`).

use core::str::FromStr;
use std::time::Duration;

use places_api::{AllowedOrigin, ServerConfig};
use places_db::PostgresConfig;

/// Connection string that selects the in-memory store.
const MEMORY_URL: &str = "memory://";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable is set but its value cannot be used.
    #[error("invalid {name}: {message}")]
    Invalid {
        /// The environment variable.
        name: &'static str,
        /// What was wrong with it.
        message: String,
    },
}

/// Where places are stored.
#[derive(Debug, Clone)]
pub enum StorageConfig {
    /// In-process map; contents are lost on exit.
    Memory,
    /// `PostgreSQL` pool settings.
    Postgres(PostgresConfig),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    Pretty,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("expected `pretty` or `json`, got {other:?}")),
        }
    }
}

/// Complete server configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Listen address.
    pub server: ServerConfig,
    /// Storage backend.
    pub storage: StorageConfig,
    /// Origin allowed to open the real-time channel.
    pub allowed_origin: AllowedOrigin,
    /// Log output format.
    pub log_format: LogFormat,
}

impl Settings {
    /// Load configuration from environment variables.
    ///
    /// Variables (all optional):
    /// - `DATABASE_URL` -- storage connection string (default
    ///   `postgresql://localhost:5432/places`; `memory://` for in-memory)
    /// - `DATABASE_MAX_CONNECTIONS` -- pool size (default 10)
    /// - `DATABASE_CONNECT_TIMEOUT_SECS` -- wait for a pooled connection
    ///   (default 5)
    /// - `DATABASE_IDLE_TIMEOUT_SECS` -- idle connection lifetime (default 300)
    /// - `CLIENT_URL` -- allowed real-time origin (default
    ///   `http://localhost:8000`; `*` for any)
    /// - `HOST` -- listen address (default `0.0.0.0`)
    /// - `PORT` -- listen port (default 5000)
    /// - `LOG_FORMAT` -- `pretty` or `json` (default `pretty`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .unwrap_or_else(|| "postgresql://localhost:5432/places".to_owned());

        let storage = if database_url == MEMORY_URL {
            StorageConfig::Memory
        } else {
            let mut pg = PostgresConfig::new(&database_url);
            if let Some(max) = parse_opt(&lookup, "DATABASE_MAX_CONNECTIONS")? {
                pg = pg.with_max_connections(max);
            }
            if let Some(secs) = parse_opt(&lookup, "DATABASE_CONNECT_TIMEOUT_SECS")? {
                pg = pg.with_connect_timeout(Duration::from_secs(secs));
            }
            if let Some(secs) = parse_opt(&lookup, "DATABASE_IDLE_TIMEOUT_SECS")? {
                pg = pg.with_idle_timeout(Duration::from_secs(secs));
            }
            StorageConfig::Postgres(pg)
        };

        let client_url =
            lookup("CLIENT_URL").unwrap_or_else(|| "http://localhost:8000".to_owned());

        let server = ServerConfig {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_owned()),
            port: parse_var(&lookup, "PORT", 5000)?,
        };

        Ok(Self {
            server,
            storage,
            allowed_origin: AllowedOrigin::parse(&client_url),
            log_format: parse_var(&lookup, "LOG_FORMAT", LogFormat::Pretty)?,
        })
    }
}

/// Read and parse an optional variable, using `default` when unset.
fn parse_var<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: core::fmt::Display,
{
    Ok(parse_opt(lookup, name)?.unwrap_or(default))
}

/// Read and parse an optional variable.
fn parse_opt<F, T>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: core::fmt::Display,
{
    lookup(name)
        .map(|raw| {
            raw.trim().parse().map_err(|e| ConfigError::Invalid {
                name,
                message: format!("{raw:?}: {e}"),
            })
        })
        .transpose()
}
