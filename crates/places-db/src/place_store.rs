//! `PostgreSQL`-backed place store.
//!
//! Every operation is a single statement against the `places` table.
//! Writes use `RETURNING` so the caller gets the committed row back
//! without a second round-trip.
//!
//! The table is created lazily: the first operation applies pending
//! migrations, and a failed attempt is retried by the next operation
//! until one succeeds.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use places_types::{Category, NewPlace, Place, PlaceId, PlaceUpdate};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::error::DbError;
use crate::postgres::PostgresPool;
use crate::store::{ListFilter, PlaceStore};

/// Column list shared by every query that returns a full row.
const PLACE_COLUMNS: &str =
    "id, name, category, lat, lng, description, rating, visit_count, created_at, updated_at";

/// Opens once some initialization succeeds. Failures are not remembered.
#[derive(Clone, Default)]
struct SchemaGate(Arc<OnceCell<()>>);

impl SchemaGate {
    async fn ensure<F, Fut>(&self, init: F) -> Result<(), DbError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), DbError>>,
    {
        self.0.get_or_try_init(init).await?;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.0.initialized()
    }
}

/// Operations on the `places` table.
///
/// Clones share the pool and the bootstrap state.
#[derive(Clone)]
pub struct PgPlaceStore {
    pool: PostgresPool,
    schema: SchemaGate,
}

impl PgPlaceStore {
    /// Create a store bound to a connection pool.
    ///
    /// Nothing touches the database until the first operation.
    pub fn new(pool: PostgresPool) -> Self {
        Self {
            pool,
            schema: SchemaGate::default(),
        }
    }

    /// The pool this store runs its queries on.
    pub const fn pool(&self) -> &PostgresPool {
        &self.pool
    }

    /// Apply pending migrations unless an earlier call already has.
    ///
    /// Every operation calls this first. On failure the next call tries
    /// again, so the store recovers once the database is reachable.
    ///
    /// # Errors
    ///
    /// Returns the connection or migration error of this attempt.
    pub async fn ensure_schema(&self) -> Result<(), DbError> {
        self.schema
            .ensure(|| self.pool.run_migrations())
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "Table bootstrap failed, will retry"))
    }

    /// Whether the `places` table has been bootstrapped.
    pub fn is_schema_ready(&self) -> bool {
        self.schema.is_open()
    }
}

#[async_trait]
impl PlaceStore for PgPlaceStore {
    async fn list(&self, filter: &ListFilter) -> Result<Vec<Place>, DbError> {
        self.ensure_schema().await?;
        let rows = sqlx::query_as::<_, PlaceRow>(&format!(
            "SELECT {PLACE_COLUMNS} FROM places
             WHERE ($1::TEXT IS NULL OR category = $1)
             ORDER BY created_at, id"
        ))
        .bind(filter.category.as_deref())
        .fetch_all(self.pool.pool())
        .await?;

        tracing::debug!(count = rows.len(), category = ?filter.category, "Listed places");
        rows.into_iter().map(Place::try_from).collect()
    }

    async fn get(&self, id: PlaceId) -> Result<Place, DbError> {
        self.ensure_schema().await?;
        let row = sqlx::query_as::<_, PlaceRow>(&format!(
            "SELECT {PLACE_COLUMNS} FROM places WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(self.pool.pool())
        .await?;

        row.ok_or(DbError::NotFound(id))?.try_into()
    }

    async fn create(&self, new: NewPlace) -> Result<Place, DbError> {
        new.validate()?;
        self.ensure_schema().await?;
        let place = Place::create(PlaceId::new(), new, Utc::now());

        let row = sqlx::query_as::<_, PlaceRow>(&format!(
            "INSERT INTO places ({PLACE_COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, 0, $8, $8)
             RETURNING {PLACE_COLUMNS}"
        ))
        .bind(place.id.into_inner())
        .bind(&place.name)
        .bind(place.category.as_str())
        .bind(place.lat)
        .bind(place.lng)
        .bind(place.description.as_deref())
        .bind(place.rating)
        .bind(place.created_at)
        .fetch_one(self.pool.pool())
        .await?;

        tracing::debug!(id = %place.id, "Inserted place");
        row.try_into()
    }

    async fn update(&self, id: PlaceId, update: PlaceUpdate) -> Result<Place, DbError> {
        update.validate()?;
        self.ensure_schema().await?;

        let row = sqlx::query_as::<_, PlaceRow>(&format!(
            "UPDATE places SET
                name = COALESCE($2, name),
                category = COALESCE($3, category),
                lat = COALESCE($4, lat),
                lng = COALESCE($5, lng),
                description = COALESCE($6, description),
                rating = COALESCE($7, rating),
                updated_at = $8
             WHERE id = $1
             RETURNING {PLACE_COLUMNS}"
        ))
        .bind(id.into_inner())
        .bind(update.name.as_deref())
        .bind(update.category.map(Category::as_str))
        .bind(update.lat)
        .bind(update.lng)
        .bind(update.description.as_deref())
        .bind(update.rating)
        .bind(Utc::now())
        .fetch_optional(self.pool.pool())
        .await?;

        row.ok_or(DbError::NotFound(id))?.try_into()
    }

    async fn delete(&self, id: PlaceId) -> Result<Place, DbError> {
        self.ensure_schema().await?;
        let row = sqlx::query_as::<_, PlaceRow>(&format!(
            "DELETE FROM places WHERE id = $1 RETURNING {PLACE_COLUMNS}"
        ))
        .bind(id.into_inner())
        .fetch_optional(self.pool.pool())
        .await?;

        row.ok_or(DbError::NotFound(id))?.try_into()
    }

    async fn visit(&self, id: PlaceId) -> Result<Place, DbError> {
        self.ensure_schema().await?;
        // Increment happens inside the statement so concurrent visits
        // never lose an update.
        let row = sqlx::query_as::<_, PlaceRow>(&format!(
            "UPDATE places SET visit_count = visit_count + 1
             WHERE id = $1
             RETURNING {PLACE_COLUMNS}"
        ))
        .bind(id.into_inner())
        .fetch_optional(self.pool.pool())
        .await?;

        row.ok_or(DbError::NotFound(id))?.try_into()
    }
}

/// A row from the `places` table.
///
/// Uses runtime types rather than compile-time checked types to
/// avoid requiring a live database during builds.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlaceRow {
    /// Primary key.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Category as stored (constrained by a `CHECK`).
    pub category: String,
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
    /// Optional description.
    pub description: Option<String>,
    /// Rating.
    pub rating: f64,
    /// Visit counter.
    pub visit_count: i64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last field update time.
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<PlaceRow> for Place {
    type Error = DbError;

    fn try_from(row: PlaceRow) -> Result<Self, Self::Error> {
        let category = row
            .category
            .parse::<Category>()
            .map_err(|e| DbError::Invalid(format!("row {}: {e}", row.id)))?;
        let visit_count = u64::try_from(row.visit_count)
            .map_err(|e| DbError::Invalid(format!("row {}: visit_count: {e}", row.id)))?;

        Ok(Self {
            id: PlaceId::from(row.id),
            name: row.name,
            category,
            lat: row.lat,
            lng: row.lng,
            description: row.description,
            rating: row.rating,
            visit_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::postgres::PostgresConfig;

    fn row() -> PlaceRow {
        let now = Utc::now();
        PlaceRow {
            id: Uuid::now_v7(),
            name: "Senso-ji".to_owned(),
            category: "temple".to_owned(),
            lat: 35.71,
            lng: 139.79,
            description: Some("Asakusa".to_owned()),
            rating: 4.8,
            visit_count: 3,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn row_converts_to_place() {
        let row = row();
        let id = row.id;
        let place = Place::try_from(row).unwrap();
        assert_eq!(place.id.into_inner(), id);
        assert_eq!(place.category, Category::Temple);
        assert_eq!(place.visit_count, 3);
    }

    #[test]
    fn unknown_category_row_is_invalid() {
        let mut row = row();
        row.category = "bar".to_owned();
        assert!(matches!(Place::try_from(row), Err(DbError::Invalid(_))));
    }

    #[test]
    fn negative_counter_row_is_invalid() {
        let mut row = row();
        row.visit_count = -1;
        assert!(matches!(Place::try_from(row), Err(DbError::Invalid(_))));
    }

    #[tokio::test]
    async fn gate_retries_until_init_succeeds() {
        let gate = SchemaGate::default();
        let counter = AtomicUsize::new(0);
        let attempts = &counter;
        let init = move || async move {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            if n == 0 {
                Err(DbError::Config("database down".to_owned()))
            } else {
                Ok(())
            }
        };

        assert!(gate.ensure(init).await.is_err());
        assert!(!gate.is_open());

        gate.ensure(init).await.unwrap();
        assert!(gate.is_open());

        // Once open, init never runs again.
        gate.ensure(init).await.unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn unreachable_database_leaves_schema_pending() {
        // Nothing listens on port 1.
        let config = PostgresConfig::new("postgresql://places@127.0.0.1:1/places")
            .with_connect_timeout(Duration::from_millis(200));
        let store = PgPlaceStore::new(PostgresPool::connect_lazy(&config).unwrap());

        assert!(store.list(&ListFilter::all()).await.is_err());
        assert!(!store.is_schema_ready());
        assert!(store.visit(PlaceId::new()).await.is_err());
        assert!(!store.is_schema_ready());
    }
}
