//! Domain models for the shop.
//!
//! These are validated domain objects, separate from the row types the
//! Postgres adapter decodes into.

pub mod comment;
pub mod order;
pub mod product;
pub mod session;
pub mod user;

pub use comment::{Comment, NewComment};
pub use order::Order;
pub use product::{NewProduct, Product, ProductInputError};
pub use session::{AdminUser, CurrentUser};
pub use user::{NewUser, User};
