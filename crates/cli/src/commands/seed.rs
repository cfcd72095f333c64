//! Seed the catalog from a YAML file.
//!
//! ```yaml
//! products:
//!   - name: Widget
//!     category: tools
//!     price: "2.00"
//!     stock: 10
//! ```
//!
//! Every entry is validated before the database is touched, so a file with
//! an invalid entry inserts nothing. Rows are inserted one at a time; a
//! database error part way through keeps the rows already inserted.

use std::path::Path;

use minimart_core::Price;
use minimart_server::db::{PgStore, ProductRepository, RepositoryError};
use minimart_server::models::{NewProduct, ProductInputError};
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};

use super::{ConnectError, connect};

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{0} validation errors found")]
    Invalid(usize),

    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Products file layout.
#[derive(Debug, Deserialize)]
pub struct SeedFile {
    pub products: Vec<SeedProduct>,
}

/// One product entry.
#[derive(Debug, Deserialize)]
pub struct SeedProduct {
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub price: Price,
    pub stock: i32,
}

impl SeedFile {
    /// Validate every entry, collecting all failures.
    pub fn validate(&self) -> Result<Vec<NewProduct>, Vec<(usize, ProductInputError)>> {
        let mut valid = Vec::with_capacity(self.products.len());
        let mut errors = Vec::new();
        for (index, entry) in self.products.iter().enumerate() {
            match NewProduct::new(&entry.name, &entry.category, entry.price, entry.stock) {
                Ok(product) => valid.push(product),
                Err(e) => errors.push((index, e)),
            }
        }
        if errors.is_empty() {
            Ok(valid)
        } else {
            Err(errors)
        }
    }
}

/// Insert the products listed in `file_path`.
pub async fn products(file_path: &str) -> Result<(), SeedError> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(SeedError::FileNotFound(file_path.to_owned()));
    }

    info!(path = %file_path, "Loading products from file");

    let content = tokio::fs::read_to_string(path).await?;
    let file: SeedFile = serde_yaml::from_str(&content)?;

    let products = file.validate().map_err(|errors| {
        error!("Configuration validation failed:");
        for (index, err) in &errors {
            error!("  - entry {index}: {err}");
        }
        SeedError::Invalid(errors.len())
    })?;

    let store = PgStore::new(connect().await?);
    for product in &products {
        let created = store.insert_product(product).await?;
        info!("  Inserted {} (ID: {})", created.name, created.id);
    }

    info!("Seeding complete! {} products inserted", products.len());
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_string_and_number_prices() {
        let file: SeedFile = serde_yaml::from_str(
            "products:\n  - name: Widget\n    price: \"2.00\"\n    stock: 10\n  - name: Gadget\n    category: toys\n    price: 3\n    stock: 0\n",
        )
        .unwrap();

        let products = file.validate().unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].category(), "");
        assert_eq!(products[1].price().to_string(), "3");
    }

    #[test]
    fn test_collects_every_invalid_entry() {
        let file: SeedFile = serde_yaml::from_str(
            "products:\n  - name: \"  \"\n    price: 1\n    stock: 1\n  - name: Ok\n    price: 1\n    stock: 1\n  - name: Bad\n    price: 1\n    stock: -4\n",
        )
        .unwrap();

        let errors = file.validate().unwrap_err();
        assert_eq!(
            errors,
            vec![
                (0, ProductInputError::EmptyName),
                (2, ProductInputError::NegativeStock(-4)),
            ]
        );
    }

    #[test]
    fn test_out_of_range_price_fails_to_parse() {
        let result = serde_yaml::from_str::<SeedFile>(
            "products:\n  - name: Widget\n    price: \"1.005\"\n    stock: 1\n",
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_sample_file_is_valid() {
        let content = include_str!("../../seed/products.yaml");
        let file: SeedFile = serde_yaml::from_str(content).unwrap();
        assert!(!file.validate().unwrap().is_empty());
    }
}
