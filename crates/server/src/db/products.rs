//! `PostgreSQL` product queries.
//!
//! Deleted products keep their row (`deleted_at` is set) so historical orders
//! still reference a valid product id.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgConnection;

use minimart_core::{Price, ProductId};

use super::{PgStore, ProductRepository, RepositoryError};
use crate::models::{NewProduct, Product};

pub(super) const PRODUCT_COLUMNS: &str = "id, name, category, price, stock, created_at, updated_at";

#[derive(sqlx::FromRow)]
pub(super) struct ProductRow {
    id: i64,
    name: String,
    category: String,
    price: Decimal,
    stock: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let price = Price::new(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price in database: {e}"))
        })?;
        if row.stock < 0 {
            return Err(RepositoryError::DataCorruption(format!(
                "negative stock {} for product {}",
                row.stock, row.id
            )));
        }

        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            category: row.category,
            price,
            stock: row.stock,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Conditionally decrement stock on an existing connection.
///
/// Shared by [`ProductRepository::reserve_stock`] and order placement, which
/// runs it inside the same transaction as the order insert.
pub(super) async fn reserve_on(
    conn: &mut PgConnection,
    id: ProductId,
    quantity: i32,
) -> Result<Product, RepositoryError> {
    let updated = sqlx::query_as::<_, ProductRow>(&format!(
        "UPDATE products SET stock = stock - $2, updated_at = now() \
         WHERE id = $1 AND deleted_at IS NULL AND stock >= $2 \
         RETURNING {PRODUCT_COLUMNS}"
    ))
    .bind(id)
    .bind(quantity)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(row) = updated {
        return row.try_into();
    }

    // Nothing matched: tell a missing product apart from a short one.
    let available: Option<i32> =
        sqlx::query_scalar("SELECT stock FROM products WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

    match available {
        Some(available) => Err(RepositoryError::InsufficientStock {
            requested: quantity,
            available,
        }),
        None => Err(RepositoryError::NotFound),
    }
}

#[async_trait]
impl ProductRepository for PgStore {
    async fn insert_product(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "INSERT INTO products (name, category, price, stock) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(product.name())
        .bind(product.category())
        .bind(product.price())
        .bind(product.stock())
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE deleted_at IS NULL ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE products SET deleted_at = now(), updated_at = now() \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn reserve_stock(
        &self,
        id: ProductId,
        quantity: i32,
    ) -> Result<Product, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        reserve_on(&mut conn, id, quantity).await
    }
}
