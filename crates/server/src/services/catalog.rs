//! Public product catalog with a read-through cache.
//!
//! The whole product list is cached as one JSON value under a fixed key.
//! Nothing invalidates it early: stock and catalog changes become visible
//! once the entry expires, so readers may see data up to one TTL old.
//!
//! A cache read or write failure fails the request instead of falling back
//! to an uncached answer.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, error, instrument};

use super::inventory::{InventoryLedger, LedgerError};
use crate::cache::{CacheError, CacheStore};
use crate::db::Store;
use crate::models::Product;

/// Cache key holding the serialized product list.
pub const CATALOG_KEY: &str = "products";

/// Default lifetime of the cached product list.
pub const DEFAULT_CATALOG_TTL: Duration = Duration::from_secs(5);

/// Errors from the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Loading products from the ledger failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// The cache store failed.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// The cached value could not be encoded or decoded.
    #[error("catalog serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Read-through view of the product list.
pub struct CatalogService<'a> {
    ledger: InventoryLedger<'a>,
    cache: &'a dyn CacheStore,
    ttl: Duration,
}

impl<'a> CatalogService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store, cache: &'a dyn CacheStore, ttl: Duration) -> Self {
        Self {
            ledger: InventoryLedger::new(store),
            cache,
            ttl,
        }
    }

    /// The product list, served from cache when a live entry exists.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Cache` if the cache cannot be read or written,
    /// and `CatalogError::Ledger` if the products cannot be loaded.
    pub async fn get_catalog(&self) -> Result<Vec<Product>, CatalogError> {
        let bytes = self.catalog_json().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// The serialized product list exactly as stored in the cache.
    ///
    /// # Errors
    ///
    /// Same as [`CatalogService::get_catalog`].
    #[instrument(skip(self))]
    pub async fn catalog_json(&self) -> Result<Vec<u8>, CatalogError> {
        if let Some(bytes) = self.cache.get(CATALOG_KEY).await? {
            debug!("catalog cache hit");
            return Ok(bytes);
        }

        debug!("catalog cache miss");
        let products = self.ledger.list_products().await?;
        let bytes = serde_json::to_vec(&products)?;

        self.cache
            .set(CATALOG_KEY, bytes.clone(), self.ttl)
            .await
            .inspect_err(|e| error!(error = %e, "failed to write catalog cache"))?;

        Ok(bytes)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::cache::MokaCacheStore;
    use crate::db::MemoryStore;
    use crate::services::testing::{admin, new_product};

    /// Cache whose writes always fail.
    struct BrokenCache;

    #[async_trait]
    impl CacheStore for BrokenCache {
        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
            Ok(None)
        }

        async fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> Result<(), CacheError> {
            Err(CacheError::Backend("connection refused".to_owned()))
        }
    }

    #[tokio::test]
    async fn test_miss_loads_and_populates() {
        let store = MemoryStore::new();
        let cache = MokaCacheStore::new(8);
        let admin = admin(&store).await;
        let ledger = InventoryLedger::new(&store);
        let product = ledger
            .create_product(&admin, &new_product("2.00", 10))
            .await
            .unwrap();

        let catalog = CatalogService::new(&store, &cache, DEFAULT_CATALOG_TTL);
        assert_eq!(catalog.get_catalog().await.unwrap(), vec![product]);
        assert!(cache.get(CATALOG_KEY).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_hit_is_stale_within_ttl_then_refreshes() {
        let store = MemoryStore::new();
        let cache = MokaCacheStore::new(8);
        let admin = admin(&store).await;
        let ledger = InventoryLedger::new(&store);
        let product = ledger
            .create_product(&admin, &new_product("2.00", 10))
            .await
            .unwrap();
        let catalog = CatalogService::new(&store, &cache, Duration::from_millis(200));

        let first = catalog.catalog_json().await.unwrap();
        ledger.reserve(product.id, 4).await.unwrap();
        ledger
            .create_product(&admin, &new_product("9.99", 1))
            .await
            .unwrap();

        // Byte-identical until the entry expires.
        assert_eq!(catalog.catalog_json().await.unwrap(), first);
        assert_eq!(catalog.get_catalog().await.unwrap()[0].stock, 10);

        tokio::time::sleep(Duration::from_millis(400)).await;

        let fresh = catalog.get_catalog().await.unwrap();
        assert_eq!(fresh.len(), 2);
        assert_eq!(fresh[0].stock, 6);
    }

    #[tokio::test]
    async fn test_empty_catalog_is_cached_too() {
        let store = MemoryStore::new();
        let cache = MokaCacheStore::new(8);
        let catalog = CatalogService::new(&store, &cache, DEFAULT_CATALOG_TTL);

        assert!(catalog.get_catalog().await.unwrap().is_empty());
        assert_eq!(cache.get(CATALOG_KEY).await.unwrap(), Some(b"[]".to_vec()));
    }

    #[tokio::test]
    async fn test_cache_write_failure_fails_request() {
        let store = MemoryStore::new();
        let catalog = CatalogService::new(&store, &BrokenCache, DEFAULT_CATALOG_TTL);

        assert!(matches!(
            catalog.get_catalog().await,
            Err(CatalogError::Cache(CacheError::Backend(_)))
        ));
    }
}
