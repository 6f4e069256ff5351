//! Error types for the data layer.
//!
//! All errors are propagated via [`DbError`], which wraps the underlying
//! [`sqlx`] errors and the store's own not-found and schema conditions.

use places_types::{PlaceId, SchemaViolation};

/// Errors that can occur in the data layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// No place with this identifier exists.
    #[error("place not found: {0}")]
    NotFound(PlaceId),

    /// A value broke the place schema, or a stored row could not be decoded.
    #[error("invalid place: {0}")]
    Invalid(String),

    /// A `PostgreSQL` operation failed (connectivity or write fault).
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<SchemaViolation> for DbError {
    fn from(violation: SchemaViolation) -> Self {
        Self::Invalid(violation.to_string())
    }
}

impl DbError {
    /// Whether this error means the requested place does not exist.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
