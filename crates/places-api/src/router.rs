//! Axum router construction for the places API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled for cross-origin frontend access.

use std::sync::Arc;

use axum::Router;
use axum::http::Method;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the places server.
///
/// The router includes:
/// - `GET /ws` -- real-time channel
/// - `GET /api/health` -- liveness
/// - `GET|POST /api/places` -- list, create
/// - `GET|PUT|DELETE /api/places/{id}` -- read, update, delete
/// - `POST /api/places/{id}/visit` -- record a visit
///
/// REST CORS allows any origin. The real-time channel enforces its own
/// single allowed origin (see [`ws::AllowedOrigin`]).
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_channel))
        // REST API
        .route("/api/health", get(handlers::health))
        .route(
            "/api/places",
            get(handlers::list_places).post(handlers::create_place),
        )
        .route(
            "/api/places/{id}",
            get(handlers::get_place)
                .put(handlers::update_place)
                .delete(handlers::delete_place),
        )
        .route("/api/places/{id}/visit", post(handlers::visit_place))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
