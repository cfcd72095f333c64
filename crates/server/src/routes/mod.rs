//! HTTP route handlers.
//!
//! # Routes
//!
//! ```text
//! POST   /register                 create account, returns token
//! POST   /login                    returns a fresh token
//! POST   /logout                   clears the token
//! POST   /admin/product            create product (admin)
//! GET    /admin/product/{id}       fetch product (admin)
//! DELETE /admin/product/{id}       soft-delete product (admin)
//! GET    /product                  cached product list
//! POST   /order                    place order
//! GET    /order                    caller's orders
//! GET    /order/{id}               one of the caller's orders
//! POST   /order/pay                pay an order
//! GET    /comment/{product_id}     comments on a product
//! POST   /comment                  add a comment
//! ```
//!
//! Every success body is `{"data": ...}`; every error body is `{"error": ...}`.

pub mod admin_products;
pub mod auth;
pub mod comments;
pub mod orders;
pub mod products;

use std::str::FromStr;

use axum::{Json, Router, extract::FromRequest};
use serde::Serialize;

use crate::error::AppError;
use crate::state::AppState;

/// Build the API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(admin_products::router())
        .merge(products::router())
        .merge(orders::router())
        .merge(comments::router())
}

/// Success envelope.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// Wrap a payload in the success envelope.
pub const fn data<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope { data })
}

/// `Json` extractor whose rejections use the API error body.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Parse an id taken from the path.
fn parse_id<T>(raw: &str) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| AppError::BadRequest(e.to_string()))
}
