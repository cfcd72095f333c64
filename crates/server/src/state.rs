//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::{CacheStore, MokaCacheStore};
use crate::config::{ServerConfig, StorageBackend};
use crate::db::{self, MemoryStore, PgStore, Store};
use crate::services::{AuthService, CatalogService, CommentService, InventoryLedger, OrderService};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. The store and cache are
/// injected as trait objects so tests can swap in fakes.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn Store>,
    cache: Arc<dyn CacheStore>,
    catalog_ttl: Duration,
}

impl AppState {
    /// Create state from already-built collaborators.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, cache: Arc<dyn CacheStore>, catalog_ttl: Duration) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                store,
                cache,
                catalog_ttl,
            }),
        }
    }

    /// Build the store and cache described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` if the `PostgreSQL` pool cannot be created.
    pub async fn from_config(config: &ServerConfig) -> Result<Self, sqlx::Error> {
        let store: Arc<dyn Store> = match &config.storage {
            StorageBackend::Postgres { database_url } => {
                let pool = db::create_pool(database_url).await?;
                tracing::info!("Database pool created");
                Arc::new(PgStore::new(pool))
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; data is lost on restart");
                Arc::new(MemoryStore::new())
            }
        };
        let cache = Arc::new(MokaCacheStore::new(config.cache_capacity));

        Ok(Self::new(store, cache, config.catalog_ttl))
    }

    /// Get a reference to the persistent store.
    #[must_use]
    pub fn store(&self) -> &dyn Store {
        self.inner.store.as_ref()
    }

    /// Authentication service for this request.
    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(self.store())
    }

    /// Inventory ledger for this request.
    #[must_use]
    pub fn inventory(&self) -> InventoryLedger<'_> {
        InventoryLedger::new(self.store())
    }

    /// Order workflow for this request.
    #[must_use]
    pub fn orders(&self) -> OrderService<'_> {
        OrderService::new(self.store())
    }

    /// Cached catalog for this request.
    #[must_use]
    pub fn catalog(&self) -> CatalogService<'_> {
        CatalogService::new(
            self.store(),
            self.inner.cache.as_ref(),
            self.inner.catalog_ttl,
        )
    }

    /// Comment service for this request.
    #[must_use]
    pub fn comments(&self) -> CommentService<'_> {
        CommentService::new(self.store())
    }
}
