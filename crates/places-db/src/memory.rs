//! In-process place store.
//!
//! Keeps every place in a [`BTreeMap`] behind a [`RwLock`]. Selected at
//! runtime with `DATABASE_URL=memory://` and used by the API tests.
//! Contents are lost on restart.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use places_types::{NewPlace, Place, PlaceId, PlaceUpdate};
use tokio::sync::RwLock;

use crate::error::DbError;
use crate::store::{ListFilter, PlaceStore};

/// A [`PlaceStore`] held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryPlaceStore {
    places: RwLock<BTreeMap<PlaceId, Place>>,
}

impl MemoryPlaceStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of places currently stored.
    pub async fn len(&self) -> usize {
        self.places.read().await.len()
    }

    /// Whether the store holds no places.
    pub async fn is_empty(&self) -> bool {
        self.places.read().await.is_empty()
    }
}

#[async_trait]
impl PlaceStore for MemoryPlaceStore {
    async fn list(&self, filter: &ListFilter) -> Result<Vec<Place>, DbError> {
        let places = self.places.read().await;
        let mut matching: Vec<Place> = places
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        matching.sort_by_key(|p| (p.created_at, p.id));
        Ok(matching)
    }

    async fn get(&self, id: PlaceId) -> Result<Place, DbError> {
        self.places
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(DbError::NotFound(id))
    }

    async fn create(&self, new: NewPlace) -> Result<Place, DbError> {
        new.validate()?;
        let place = Place::create(PlaceId::new(), new, Utc::now());
        self.places.write().await.insert(place.id, place.clone());
        Ok(place)
    }

    async fn update(&self, id: PlaceId, update: PlaceUpdate) -> Result<Place, DbError> {
        update.validate()?;
        let mut places = self.places.write().await;
        let place = places.get_mut(&id).ok_or(DbError::NotFound(id))?;
        place.apply(update, Utc::now());
        Ok(place.clone())
    }

    async fn delete(&self, id: PlaceId) -> Result<Place, DbError> {
        self.places
            .write()
            .await
            .remove(&id)
            .ok_or(DbError::NotFound(id))
    }

    async fn visit(&self, id: PlaceId) -> Result<Place, DbError> {
        let mut places = self.places.write().await;
        let place = places.get_mut(&id).ok_or(DbError::NotFound(id))?;
        place.visit_count = place.visit_count.saturating_add(1);
        Ok(place.clone())
    }
}
