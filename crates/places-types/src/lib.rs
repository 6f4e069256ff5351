//! Shared type definitions for the places service.
//!
//! This crate is the single source of truth for the types that cross a
//! boundary: HTTP bodies, database records, and real-time channel frames.
//! Types defined here flow downstream to `TypeScript` via `ts-rs` for the
//! map frontend.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for places and subscribers
//! - [`enums`] -- The closed [`Category`] set
//! - [`structs`] -- [`Place`] and its create/update request bodies
//! - [`events`] -- Real-time channel messages

pub mod enums;
pub mod events;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{Category, UnknownCategory};
pub use events::{ChannelEvent, ClientMessage};
pub use ids::{PlaceId, SubscriberId};
pub use structs::{NewPlace, Place, PlaceUpdate, SchemaViolation};
