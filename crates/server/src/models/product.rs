//! Catalog product types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use minimart_core::{Price, ProductId};

/// Maximum length of a product name.
const MAX_NAME_LENGTH: usize = 200;

/// Maximum length of a category label.
const MAX_CATEGORY_LENGTH: usize = 100;

/// A product in the catalog.
///
/// `stock` is never negative; the ledger rejects any reservation that would
/// take it below zero before touching the row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    /// Current unit price.
    pub price: Price,
    /// Units available for ordering.
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validation failures for [`NewProduct`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductInputError {
    #[error("product name cannot be empty")]
    EmptyName,
    #[error("product name must be at most 200 characters")]
    NameTooLong,
    #[error("category must be at most 100 characters")]
    CategoryTooLong,
    #[error("stock cannot be negative (got {0})")]
    NegativeStock(i32),
}

/// A validated product ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    name: String,
    category: String,
    price: Price,
    stock: i32,
}

impl NewProduct {
    /// Validate and build a new product.
    ///
    /// # Errors
    ///
    /// Returns `ProductInputError` if the name is blank or too long, the
    /// category is too long, or the stock is negative.
    pub fn new(
        name: &str,
        category: &str,
        price: Price,
        stock: i32,
    ) -> Result<Self, ProductInputError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ProductInputError::EmptyName);
        }
        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(ProductInputError::NameTooLong);
        }
        let category = category.trim();
        if category.chars().count() > MAX_CATEGORY_LENGTH {
            return Err(ProductInputError::CategoryTooLong);
        }
        if stock < 0 {
            return Err(ProductInputError::NegativeStock(stock));
        }

        Ok(Self {
            name: name.to_owned(),
            category: category.to_owned(),
            price,
            stock,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub const fn price(&self) -> Price {
        self.price
    }

    #[must_use]
    pub const fn stock(&self) -> i32 {
        self.stock
    }
}
