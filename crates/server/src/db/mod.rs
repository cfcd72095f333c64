//! Storage ports and adapters.
//!
//! # Ports
//!
//! Services never talk to a concrete database. They borrow a `&dyn Store`,
//! which bundles one repository trait per table:
//!
//! - [`UserRepository`] - accounts and their single session token
//! - [`ProductRepository`] - the inventory ledger's rows, including the
//!   conditional stock decrement
//! - [`OrderRepository`] - order placement (reserve + insert in one unit)
//!   and the unpaid → paid transition
//! - [`CommentRepository`] - append-only product comments
//!
//! # Adapters
//!
//! - [`PgStore`] - `PostgreSQL` via `sqlx`
//! - [`MemoryStore`] - in-process tables for local runs and tests
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p minimart-cli -- migrate
//! ```

mod comments;
pub mod memory;
mod orders;
mod products;
mod users;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use minimart_core::{
    OrderId, OrderStatus, PriceError, ProductId, SessionToken, UserId, UserLevel, Username,
};

use crate::models::{Comment, NewComment, NewProduct, NewUser, Order, Product, User};

pub use memory::MemoryStore;

/// Errors returned by storage adapters.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique username).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A conditional stock decrement matched no row because stock is too low.
    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock {
        /// Units asked for.
        requested: i32,
        /// Units on hand when the decrement was attempted.
        available: i32,
    },

    /// A conditional status update found the order in another status.
    #[error("order is {0}")]
    StatusMismatch(OrderStatus),

    /// The order total does not fit the stored amount.
    #[error("order total out of range: {0}")]
    Total(#[from] PriceError),
}

/// Account persistence.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user at [`UserLevel::Customer`] holding `user.token`.
    ///
    /// Fails with `Conflict` if the username or email is taken.
    async fn insert_user(&self, user: &NewUser) -> Result<User, RepositoryError>;

    /// Look up a user and their password hash by username.
    async fn find_credentials(
        &self,
        username: &Username,
    ) -> Result<Option<(User, String)>, RepositoryError>;

    /// Look up the user currently holding `token`.
    async fn find_user_by_token(
        &self,
        token: &SessionToken,
    ) -> Result<Option<User>, RepositoryError>;

    /// Overwrite the user's session token. Fails with `NotFound` for an unknown id.
    async fn replace_token(&self, id: UserId, token: &SessionToken)
    -> Result<(), RepositoryError>;

    /// Clear whichever user holds `token`. Returns `false` if nobody did.
    async fn clear_token(&self, token: &SessionToken) -> Result<bool, RepositoryError>;

    /// Change a user's authorization level. Fails with `NotFound` for an unknown username.
    async fn set_level(
        &self,
        username: &Username,
        level: UserLevel,
    ) -> Result<User, RepositoryError>;
}

/// Product rows owned by the inventory ledger.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn insert_product(&self, product: &NewProduct) -> Result<Product, RepositoryError>;

    /// Fetch a live (not deleted) product.
    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// All live products in id order.
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError>;

    /// Soft-delete a product. Returns `false` if it was absent or already deleted.
    async fn delete_product(&self, id: ProductId) -> Result<bool, RepositoryError>;

    /// Atomically take `quantity` units from stock and return the updated row.
    ///
    /// The decrement only happens when `stock >= quantity`; otherwise the row
    /// is untouched and `InsufficientStock` is returned. Unknown or deleted
    /// products yield `NotFound`.
    async fn reserve_stock(
        &self,
        id: ProductId,
        quantity: i32,
    ) -> Result<Product, RepositoryError>;
}

/// Order persistence.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Reserve stock and insert an unpaid order as one atomic unit.
    ///
    /// Either both the decrement and the insert are persisted or neither is.
    /// A total above [`minimart_core::Price::MAX_TOTAL`] fails with `Total`.
    /// Returns the new order and the product as left by the reservation.
    async fn place_order(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<(Order, Product), RepositoryError>;

    async fn find_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// Orders placed by `user_id`, newest first.
    async fn list_orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError>;

    /// Move an order from `unpaid` to `paid`.
    ///
    /// Fails with `NotFound` for an unknown id and `StatusMismatch` when the
    /// order is not unpaid; neither case modifies the row.
    async fn mark_order_paid(&self, id: OrderId) -> Result<Order, RepositoryError>;
}

/// Comment persistence.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn insert_comment(&self, comment: &NewComment) -> Result<Comment, RepositoryError>;

    /// Comments on a product, newest first.
    async fn list_comments_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Comment>, RepositoryError>;
}

/// Everything the services need from persistence.
#[async_trait]
pub trait Store: UserRepository + ProductRepository + OrderRepository + CommentRepository {
    /// Cheap connectivity check for readiness probes.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// `PostgreSQL`-backed [`Store`].
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map a unique violation to `Conflict`, naming the offending constraint.
fn map_unique_violation(err: sqlx::Error, describe: impl Fn(&str) -> String) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        let constraint = db_err.constraint().unwrap_or_default();
        return RepositoryError::Conflict(describe(constraint));
    }
    RepositoryError::Database(err)
}
