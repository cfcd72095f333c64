//! Public product listing.

use axum::{Json, Router, extract::State, routing::get};

use tracing::instrument;

use super::{Envelope, data};
use crate::error::Result;
use crate::models::Product;
use crate::state::AppState;

/// Build the product router.
pub fn router() -> Router<AppState> {
    Router::new().route("/product", get(index))
}

/// List products from the catalog cache (up to one TTL stale).
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Envelope<Vec<Product>>>> {
    let products = state.catalog().get_catalog().await?;
    Ok(data(products))
}
