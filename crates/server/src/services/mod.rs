//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Registration, login/logout, token resolution, admin gate
//! - `inventory` - Product stock and price, admin catalog operations
//! - `orders` - Order placement and payment
//! - `catalog` - Cached public product list
//! - `comments` - Product comments
//!
//! Services are cheap borrowing wrappers created per request from
//! [`AppState`](crate::state::AppState); none of them own a connection.

pub mod auth;
pub mod catalog;
pub mod comments;
pub mod inventory;
pub mod orders;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::{AuthError, AuthService};
pub use catalog::{CatalogError, CatalogService};
pub use comments::{CommentError, CommentService};
pub use inventory::{InventoryLedger, LedgerError, Reservation};
pub use orders::{OrderError, OrderService};
