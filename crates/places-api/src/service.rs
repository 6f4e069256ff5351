//! Place operations with change notification.
//!
//! Every write follows the same two steps: commit through the
//! [`PlaceStore`], then publish the committed record through the
//! [`Notifier`]. A failed commit publishes nothing. Publication cannot
//! fail the request and never undoes a commit; subscribers get the event
//! at most once. Two concurrent writers may have their events delivered
//! in the opposite order to their commits.

use std::sync::Arc;

use places_db::{DbError, ListFilter, PlaceStore};
use places_types::{ChannelEvent, NewPlace, Place, PlaceId, PlaceUpdate};

use crate::notifier::Notifier;

/// Commit-then-notify front for the place store.
#[derive(Clone)]
pub struct PlaceService {
    store: Arc<dyn PlaceStore>,
    notifier: Notifier,
}

impl PlaceService {
    /// Wrap a store; changes are published through `notifier`.
    pub fn new(store: Arc<dyn PlaceStore>, notifier: Notifier) -> Self {
        Self { store, notifier }
    }

    /// List places passing `filter`.
    ///
    /// # Errors
    ///
    /// Propagates the store's [`DbError`].
    pub async fn list(&self, filter: &ListFilter) -> Result<Vec<Place>, DbError> {
        self.store.list(filter).await
    }

    /// Fetch one place.
    ///
    /// # Errors
    ///
    /// Propagates the store's [`DbError`], including `NotFound`.
    pub async fn get(&self, id: PlaceId) -> Result<Place, DbError> {
        self.store.get(id).await
    }

    /// Create a place and publish `place-added`.
    ///
    /// # Errors
    ///
    /// Propagates the store's [`DbError`]; nothing is published.
    pub async fn create(&self, new: NewPlace) -> Result<Place, DbError> {
        let place = self.store.create(new).await?;
        tracing::info!(id = %place.id, name = %place.name, "Place created");
        self.notifier.publish(ChannelEvent::PlaceAdded(place.clone()));
        Ok(place)
    }

    /// Update a place and publish `place-updated`.
    ///
    /// # Errors
    ///
    /// Propagates the store's [`DbError`]; nothing is published.
    pub async fn update(&self, id: PlaceId, update: PlaceUpdate) -> Result<Place, DbError> {
        let place = self.store.update(id, update).await?;
        tracing::info!(%id, "Place updated");
        self.notifier.publish(ChannelEvent::PlaceUpdated(place.clone()));
        Ok(place)
    }

    /// Delete a place and publish `place-deleted`.
    ///
    /// Deleting an unknown id is not an error: it returns `None` and
    /// publishes nothing.
    ///
    /// # Errors
    ///
    /// Propagates any store fault other than `NotFound`.
    pub async fn delete(&self, id: PlaceId) -> Result<Option<Place>, DbError> {
        match self.store.delete(id).await {
            Ok(place) => {
                tracing::info!(%id, "Place deleted");
                self.notifier.publish(ChannelEvent::PlaceDeleted(id));
                Ok(Some(place))
            }
            Err(DbError::NotFound(_)) => {
                tracing::debug!(%id, "Delete of unknown place ignored");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Record a visit and publish `place-visited`.
    ///
    /// # Errors
    ///
    /// Propagates the store's [`DbError`]; nothing is published.
    pub async fn visit(&self, id: PlaceId) -> Result<Place, DbError> {
        let place = self.store.visit(id).await?;
        tracing::info!(%id, visit_count = place.visit_count, "Place visited");
        self.notifier.publish(ChannelEvent::PlaceVisited(place.clone()));
        Ok(place)
    }
}
