//! Inventory ledger.
//!
//! Owns product stock and price. Catalog mutations require an [`AdminUser`];
//! orders go through [`InventoryLedger::reserve`], which never lets stock
//! drop below zero.

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, instrument};

use minimart_core::{PriceError, ProductId};

use crate::db::{RepositoryError, Store};
use crate::models::{AdminUser, NewProduct, Product};

/// Errors from the inventory ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// No live product with this id.
    #[error("product {0} not found")]
    NotFound(ProductId),

    /// Requested quantity exceeds current stock.
    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: i32, available: i32 },

    /// Quantity must be at least one unit.
    #[error("quantity must be at least 1 (got {0})")]
    InvalidQuantity(i32),

    /// `quantity × price` is above the largest order total.
    #[error(transparent)]
    InvalidTotal(#[from] PriceError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Result of a successful reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    /// The product after the decrement.
    pub product: Product,
    /// `quantity × unit price` at reservation time.
    pub total: Decimal,
}

/// Product stock and admin catalog operations.
pub struct InventoryLedger<'a> {
    store: &'a dyn Store,
}

impl<'a> InventoryLedger<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Add a product to the catalog.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Repository` if the insert fails.
    #[instrument(skip(self, admin, product), fields(admin_id = %admin.user().id))]
    pub async fn create_product(
        &self,
        admin: &AdminUser,
        product: &NewProduct,
    ) -> Result<Product, LedgerError> {
        let product = self.store.insert_product(product).await?;
        info!(product_id = %product.id, stock = product.stock, "product created");
        Ok(product)
    }

    /// Fetch a product for an administrator.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::NotFound` if the product is absent or deleted.
    pub async fn get_product(
        &self,
        _admin: &AdminUser,
        id: ProductId,
    ) -> Result<Product, LedgerError> {
        self.find(id).await
    }

    /// Soft-delete a product. Existing orders keep referencing it.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::NotFound` if the product is absent or already deleted.
    #[instrument(skip(self, admin), fields(admin_id = %admin.user().id))]
    pub async fn delete_product(&self, admin: &AdminUser, id: ProductId) -> Result<(), LedgerError> {
        if !self.store.delete_product(id).await? {
            return Err(LedgerError::NotFound(id));
        }
        info!(product_id = %id, "product deleted");
        Ok(())
    }

    /// Every live product, read straight from the store.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Repository` if the query fails.
    pub async fn list_products(&self) -> Result<Vec<Product>, LedgerError> {
        Ok(self.store.list_products().await?)
    }

    /// Look up a live product.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::NotFound` if the product is absent or deleted.
    pub async fn find(&self, id: ProductId) -> Result<Product, LedgerError> {
        self.store
            .find_product(id)
            .await?
            .ok_or(LedgerError::NotFound(id))
    }

    /// Atomically take `quantity` units and price them.
    ///
    /// The price used for the total is the one read by the same statement
    /// that decrements the stock. Prices are fixed once a product exists, so
    /// the total is checked against the current row before any stock moves.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidQuantity` for `quantity < 1`,
    /// `LedgerError::NotFound` for an unknown product,
    /// `LedgerError::InvalidTotal` when the total is out of range and
    /// `LedgerError::InsufficientStock` when stock is too low. In each case
    /// nothing is modified.
    #[instrument(skip(self))]
    pub async fn reserve(&self, id: ProductId, quantity: i32) -> Result<Reservation, LedgerError> {
        validate_quantity(quantity)?;
        self.find(id).await?.price.line_total(quantity)?;

        let product = self
            .store
            .reserve_stock(id, quantity)
            .await
            .map_err(|e| ledger_error(e, id))?;
        let total = product.price.line_total(quantity)?;

        Ok(Reservation { product, total })
    }
}

/// Reject quantities below one unit.
pub(crate) fn validate_quantity(quantity: i32) -> Result<(), LedgerError> {
    if quantity < 1 {
        return Err(LedgerError::InvalidQuantity(quantity));
    }
    Ok(())
}

/// Lift stock-related repository failures into ledger errors.
pub(crate) fn ledger_error(err: RepositoryError, id: ProductId) -> LedgerError {
    match err {
        RepositoryError::NotFound => LedgerError::NotFound(id),
        RepositoryError::InsufficientStock {
            requested,
            available,
        } => LedgerError::InsufficientStock {
            requested,
            available,
        },
        RepositoryError::Total(err) => LedgerError::InvalidTotal(err),
        other => LedgerError::Repository(other),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use minimart_core::Price;

    use super::*;
    use crate::db::MemoryStore;
    use crate::services::testing::{admin, new_product};

    #[tokio::test]
    async fn test_reserve_decrements_stock_and_prices_total() {
        let store = MemoryStore::new();
        let ledger = InventoryLedger::new(&store);
        let admin = admin(&store).await;
        let product = ledger
            .create_product(&admin, &new_product("2.00", 10))
            .await
            .unwrap();

        let reservation = ledger.reserve(product.id, 3).await.unwrap();

        assert_eq!(reservation.product.stock, 7);
        assert_eq!(reservation.total, Decimal::new(600, 2));
        assert_eq!(ledger.find(product.id).await.unwrap().stock, 7);
    }

    #[tokio::test]
    async fn test_reserve_exact_stock_empties_shelf() {
        let store = MemoryStore::new();
        let ledger = InventoryLedger::new(&store);
        let admin = admin(&store).await;
        let product = ledger
            .create_product(&admin, &new_product("1.50", 4))
            .await
            .unwrap();

        assert_eq!(ledger.reserve(product.id, 4).await.unwrap().product.stock, 0);
    }

    #[tokio::test]
    async fn test_reserve_rejects_without_mutation() {
        let store = MemoryStore::new();
        let ledger = InventoryLedger::new(&store);
        let admin = admin(&store).await;
        let product = ledger
            .create_product(&admin, &new_product("2.00", 5))
            .await
            .unwrap();

        assert!(matches!(
            ledger.reserve(product.id, 6).await,
            Err(LedgerError::InsufficientStock {
                requested: 6,
                available: 5
            })
        ));
        assert!(matches!(
            ledger.reserve(product.id, 0).await,
            Err(LedgerError::InvalidQuantity(0))
        ));
        assert!(matches!(
            ledger.reserve(ProductId::new(404), 1).await,
            Err(LedgerError::NotFound(_))
        ));
        assert_eq!(ledger.find(product.id).await.unwrap().stock, 5);
    }

    #[tokio::test]
    async fn test_reserve_rejects_out_of_range_total() {
        let store = MemoryStore::new();
        let ledger = InventoryLedger::new(&store);
        let admin = admin(&store).await;
        let product = ledger
            .create_product(&admin, &new_product("9999999999.99", 1000))
            .await
            .unwrap();

        assert!(matches!(
            ledger.reserve(product.id, 101).await,
            Err(LedgerError::InvalidTotal(PriceError::TotalTooLarge {
                quantity: 101,
                ..
            }))
        ));
        assert_eq!(ledger.find(product.id).await.unwrap().stock, 1000);

        let reservation = ledger.reserve(product.id, 100).await.unwrap();
        assert_eq!(reservation.total.to_string(), "999999999999.00");
        assert_eq!(reservation.product.stock, 900);
    }

    #[tokio::test]
    async fn test_delete_hides_product() {
        let store = MemoryStore::new();
        let ledger = InventoryLedger::new(&store);
        let admin = admin(&store).await;
        let product = ledger
            .create_product(&admin, &new_product("3.00", 1))
            .await
            .unwrap();

        ledger.delete_product(&admin, product.id).await.unwrap();

        assert!(matches!(
            ledger.get_product(&admin, product.id).await,
            Err(LedgerError::NotFound(_))
        ));
        assert!(matches!(
            ledger.delete_product(&admin, product.id).await,
            Err(LedgerError::NotFound(_))
        ));
        assert!(ledger.list_products().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_zero_price_products_are_free() {
        let store = MemoryStore::new();
        let ledger = InventoryLedger::new(&store);
        let admin = admin(&store).await;
        let product = ledger
            .create_product(&admin, &new_product("0", 2))
            .await
            .unwrap();

        assert_eq!(product.price, Price::ZERO);
        assert_eq!(ledger.reserve(product.id, 2).await.unwrap().total, Decimal::ZERO);
    }
}
