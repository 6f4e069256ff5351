//! HTTP + real-time API server for the places service.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **REST endpoints** (`/api/places`) for creating, reading, updating,
//!   deleting, and visiting places
//! - **`WebSocket` endpoint** (`/ws`) that pushes `place-added`,
//!   `place-updated`, `place-deleted`, and `place-visited` events and
//!   relays `user-action` messages between clients
//!
//! # Architecture
//!
//! ```text
//! handler --> PlaceService --(1) commit--> PlaceStore
//!                         \--(2) publish-> Notifier --> Subscription (per socket)
//! ```
//!
//! The store and the notifier are constructed by the caller and injected
//! through [`AppState`]; the router never reaches for globals.

pub mod error;
pub mod handlers;
pub mod notifier;
pub mod router;
pub mod server;
pub mod service;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use notifier::{Envelope, Notifier, Subscription};
pub use router::build_router;
pub use server::{ServerConfig, ServerError, bind_with_fallback, serve, shutdown_signal, start_server};
pub use service::PlaceService;
pub use state::AppState;
pub use ws::AllowedOrigin;
