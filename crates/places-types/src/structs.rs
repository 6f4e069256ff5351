//! Core entity and request body structs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::Category;
use crate::ids::PlaceId;

// ---------------------------------------------------------------------------
// Place
// ---------------------------------------------------------------------------

/// A geotagged point of interest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Place {
    /// Store-assigned identifier. Never reassigned.
    pub id: PlaceId,
    /// Display name. Never empty.
    pub name: String,
    /// What kind of place this is.
    pub category: Category,
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lng: f64,
    /// Free-form description.
    pub description: Option<String>,
    /// User rating. Zero when never rated.
    pub rating: f64,
    /// Number of recorded visits. Only ever incremented.
    pub visit_count: u64,
    /// When the place was created.
    pub created_at: DateTime<Utc>,
    /// When the place's fields were last changed.
    pub updated_at: DateTime<Utc>,
}

impl Place {
    /// Build a fresh record from a create request.
    ///
    /// The visit counter starts at zero and both timestamps are `now`.
    pub fn create(id: PlaceId, new: NewPlace, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: new.name,
            category: new.category,
            lat: new.lat,
            lng: new.lng,
            description: new.description,
            rating: new.rating.unwrap_or(0.0),
            visit_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite every field the update supplies and refresh `updated_at`.
    ///
    /// `id`, `created_at`, and `visit_count` are left untouched.
    pub fn apply(&mut self, update: PlaceUpdate, now: DateTime<Utc>) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(lat) = update.lat {
            self.lat = lat;
        }
        if let Some(lng) = update.lng {
            self.lng = lng;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(rating) = update.rating {
            self.rating = rating;
        }
        self.updated_at = now;
    }
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Body of `POST /api/places`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NewPlace {
    /// Display name.
    pub name: String,
    /// What kind of place this is.
    pub category: Category,
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lng: f64,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Initial rating; zero when absent.
    #[serde(default)]
    pub rating: Option<f64>,
}

impl NewPlace {
    /// Check the schema rules a stored place must satisfy.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaViolation`] if the name is blank or a coordinate
    /// is not a finite number.
    pub fn validate(&self) -> Result<(), SchemaViolation> {
        check_name(&self.name)?;
        check_coordinate("lat", self.lat)?;
        check_coordinate("lng", self.lng)?;
        Ok(())
    }
}

/// Body of `PUT /api/places/{id}`.
///
/// Every field is optional: absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlaceUpdate {
    /// New display name.
    #[serde(default)]
    pub name: Option<String>,
    /// New category.
    #[serde(default)]
    pub category: Option<Category>,
    /// New latitude.
    #[serde(default)]
    pub lat: Option<f64>,
    /// New longitude.
    #[serde(default)]
    pub lng: Option<f64>,
    /// New description.
    #[serde(default)]
    pub description: Option<String>,
    /// New rating.
    #[serde(default)]
    pub rating: Option<f64>,
}

impl PlaceUpdate {
    /// Check the schema rules for the fields this update supplies.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaViolation`] if a supplied name is blank or a
    /// supplied coordinate is not a finite number.
    pub fn validate(&self) -> Result<(), SchemaViolation> {
        if let Some(name) = &self.name {
            check_name(name)?;
        }
        if let Some(lat) = self.lat {
            check_coordinate("lat", lat)?;
        }
        if let Some(lng) = self.lng {
            check_coordinate("lng", lng)?;
        }
        Ok(())
    }
}

/// A value breaks a rule of the place schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaViolation {
    /// `name` is required and must not be blank.
    #[error("name is required")]
    MissingName,

    /// A coordinate is NaN or infinite.
    #[error("{field} must be a finite number")]
    NonFiniteCoordinate {
        /// Which coordinate (`lat` or `lng`).
        field: &'static str,
    },
}

fn check_name(name: &str) -> Result<(), SchemaViolation> {
    if name.trim().is_empty() {
        return Err(SchemaViolation::MissingName);
    }
    Ok(())
}

const fn check_coordinate(field: &'static str, value: f64) -> Result<(), SchemaViolation> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SchemaViolation::NonFiniteCoordinate { field })
    }
}
