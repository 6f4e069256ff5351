//! The storage contract for places.
//!
//! [`PlaceStore`] is the seam between the HTTP layer and a concrete
//! backend. Every operation touches a single record (or, for `list`, a
//! single filtered scan) and either returns the affected record or fails
//! with a [`DbError`].

use async_trait::async_trait;
use places_types::{NewPlace, Place, PlaceId, PlaceUpdate};

use crate::error::DbError;

/// The query value that disables category filtering.
pub const ALL_CATEGORIES: &str = "all";

/// Filter for [`PlaceStore::list`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    /// Exact category string to match, or `None` for every place.
    ///
    /// Kept as a raw string: a value outside the category set is not an
    /// error, it simply matches nothing.
    pub category: Option<String>,
}

impl ListFilter {
    /// A filter that matches every place.
    pub const fn all() -> Self {
        Self { category: None }
    }

    /// Build a filter from the `category` query parameter.
    ///
    /// An absent parameter and the literal `all` both mean no filter.
    pub fn from_query(category: Option<&str>) -> Self {
        Self {
            category: category
                .filter(|c| *c != ALL_CATEGORIES)
                .map(str::to_owned),
        }
    }

    /// Whether a place passes this filter.
    pub fn matches(&self, place: &Place) -> bool {
        self.category
            .as_deref()
            .is_none_or(|c| place.category.as_str() == c)
    }
}

/// Create, read, update, and delete operations on the places collection.
#[async_trait]
pub trait PlaceStore: Send + Sync {
    /// List places passing `filter`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] on a storage fault.
    async fn list(&self, filter: &ListFilter) -> Result<Vec<Place>, DbError>;

    /// Fetch one place.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotFound`] if no place has this id.
    async fn get(&self, id: PlaceId) -> Result<Place, DbError>;

    /// Insert a new place with a fresh id, zero visits, and both
    /// timestamps set to now.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Invalid`] if `new` breaks the schema.
    async fn create(&self, new: NewPlace) -> Result<Place, DbError>;

    /// Overwrite the fields `update` supplies and refresh `updatedAt`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotFound`] if no place has this id, or
    /// [`DbError::Invalid`] if `update` breaks the schema.
    async fn update(&self, id: PlaceId, update: PlaceUpdate) -> Result<Place, DbError>;

    /// Remove a place and return what was removed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotFound`] if no place has this id.
    async fn delete(&self, id: PlaceId) -> Result<Place, DbError>;

    /// Atomically add one to the visit counter.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotFound`] if no place has this id.
    async fn visit(&self, id: PlaceId) -> Result<Place, DbError>;
}
