//! REST API endpoint handlers.
//!
//! Each handler parses its parameters, makes one [`PlaceService`] call,
//! and returns the result as JSON. Every failure becomes a `500` through
//! [`ApiError`].
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/health` | Liveness and subscriber count |
//! | `GET` | `/api/places` | List places (`?category=<cat\|all>`) |
//! | `POST` | `/api/places` | Create a place |
//! | `GET` | `/api/places/:id` | Get one place, or `null` |
//! | `PUT` | `/api/places/:id` | Update supplied fields |
//! | `DELETE` | `/api/places/:id` | Delete a place |
//! | `POST` | `/api/places/:id/visit` | Increment the visit counter |
//!
//! [`PlaceService`]: crate::service::PlaceService

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use places_db::{DbError, ListFilter};
use places_types::{NewPlace, Place, PlaceId, PlaceUpdate};

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

/// Query parameters for the `GET /api/places` endpoint.
#[derive(Debug, serde::Deserialize)]
pub struct PlacesQuery {
    /// Exact category to match; `all` or absent for every place.
    pub category: Option<String>,
}

// ---------------------------------------------------------------------------
// GET /api/health
// ---------------------------------------------------------------------------

/// Report liveness and how many real-time subscribers are connected.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "subscribers": state.notifier.subscriber_count().await,
    }))
}

// ---------------------------------------------------------------------------
// GET /api/places
// ---------------------------------------------------------------------------

/// List places, optionally restricted to one category.
pub async fn list_places(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PlacesQuery>,
) -> Result<Json<Vec<Place>>, ApiError> {
    let filter = ListFilter::from_query(params.category.as_deref());
    Ok(Json(state.places.list(&filter).await?))
}

// ---------------------------------------------------------------------------
// GET /api/places/:id
// ---------------------------------------------------------------------------

/// Return one place, or JSON `null` when the id is unknown.
pub async fn get_place(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<Json<Option<Place>>, ApiError> {
    let id = parse_id(&id_str)?;
    match state.places.get(id).await {
        Ok(place) => Ok(Json(Some(place))),
        Err(DbError::NotFound(_)) => Ok(Json(None)),
        Err(e) => Err(e.into()),
    }
}

// ---------------------------------------------------------------------------
// POST /api/places
// ---------------------------------------------------------------------------

/// Create a place and announce it as `place-added`.
pub async fn create_place(
    State(state): State<Arc<AppState>>,
    body: Result<Json<NewPlace>, JsonRejection>,
) -> Result<Json<Place>, ApiError> {
    let Json(body) = body?;
    Ok(Json(state.places.create(body).await?))
}

// ---------------------------------------------------------------------------
// PUT /api/places/:id
// ---------------------------------------------------------------------------

/// Update the supplied fields and announce `place-updated`.
pub async fn update_place(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
    body: Result<Json<PlaceUpdate>, JsonRejection>,
) -> Result<Json<Place>, ApiError> {
    let id = parse_id(&id_str)?;
    let Json(body) = body?;
    Ok(Json(state.places.update(id, body).await?))
}

// ---------------------------------------------------------------------------
// DELETE /api/places/:id
// ---------------------------------------------------------------------------

/// Delete a place and announce `place-deleted`.
///
/// Succeeds for unknown ids too, without announcing anything.
pub async fn delete_place(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_id(&id_str)?;
    state.places.delete(id).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

// ---------------------------------------------------------------------------
// POST /api/places/:id/visit
// ---------------------------------------------------------------------------

/// Record a visit and announce `place-visited`.
pub async fn visit_place(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<Json<Place>, ApiError> {
    let id = parse_id(&id_str)?;
    Ok(Json(state.places.visit(id).await?))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a place id from a path segment.
fn parse_id(s: &str) -> Result<PlaceId, ApiError> {
    s.parse::<PlaceId>()
        .map_err(|e| ApiError::InvalidId(format!("{s}: {e}")))
}
