//! Shared application state for the places API server.
//!
//! [`AppState`] is built once at startup from an injected store and
//! handed to every handler through Axum's `State` extractor. Nothing in
//! this crate is a process-wide global.

use std::sync::Arc;

use places_db::PlaceStore;

use crate::notifier::Notifier;
use crate::service::PlaceService;
use crate::ws::AllowedOrigin;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Place operations with change notification.
    pub places: PlaceService,
    /// The real-time fan-out hub (also held by `places`).
    pub notifier: Notifier,
    /// Which browser origin may open the real-time channel.
    pub allowed_origin: AllowedOrigin,
}

impl AppState {
    /// Wire a store to a fresh notifier.
    pub fn new(store: Arc<dyn PlaceStore>, allowed_origin: AllowedOrigin) -> Self {
        let notifier = Notifier::new();
        Self {
            places: PlaceService::new(store, notifier.clone()),
            notifier,
            allowed_origin,
        }
    }
}
