//! Data layer for the places service.
//!
//! [`PlaceStore`] is the storage contract the HTTP layer programs
//! against. Two backends implement it:
//!
//! ```text
//! PlaceStore (trait)
//!     |
//!     +-- PgPlaceStore      (PostgreSQL, `places` table)
//!     |       +-- PostgresPool / PostgresConfig
//!     |
//!     +-- MemoryPlaceStore  (in-process, `memory://`)
//! ```
//!
//! # Modules
//!
//! - [`store`] -- The [`PlaceStore`] trait and [`ListFilter`]
//! - [`place_store`] -- `PostgreSQL` implementation
//! - [`memory`] -- In-memory implementation
//! - [`postgres`] -- `PostgreSQL` connection pool and configuration
//! - [`error`] -- Shared error types

pub mod error;
pub mod memory;
pub mod place_store;
pub mod postgres;
pub mod store;

// Re-export primary types for convenience.
pub use error::DbError;
pub use memory::MemoryPlaceStore;
pub use place_store::{PgPlaceStore, PlaceRow};
pub use postgres::{PostgresConfig, PostgresPool};
pub use store::{ALL_CATEGORIES, ListFilter, PlaceStore};
