//! Admin product management.
//!
//! All handlers require [`RequireAdmin`]; ordinary users get 403.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::instrument;

use minimart_core::{Price, ProductId};

use super::{ApiJson, Envelope, data, parse_id};
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::{NewProduct, Product};
use crate::state::AppState;

/// Build the admin product router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/product", post(create))
        .route("/admin/product/{id}", get(show).delete(destroy))
}

/// Product creation body. Price accepts a number or a decimal string.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub price: Price,
    pub stock: i32,
}

/// Add a product to the catalog.
#[instrument(skip(admin, state))]
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateProductRequest>,
) -> Result<Json<Envelope<Product>>> {
    let new_product = NewProduct::new(&body.name, &body.category, body.price, body.stock)?;
    let product = state.inventory().create_product(&admin, &new_product).await?;
    Ok(data(product))
}

/// Fetch a live product.
#[instrument(skip(admin, state))]
pub async fn show(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Product>>> {
    let id: ProductId = parse_id(&id)?;
    let product = state.inventory().get_product(&admin, id).await?;
    Ok(data(product))
}

/// Soft-delete a product.
#[instrument(skip(admin, state))]
pub async fn destroy(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<&'static str>>> {
    let id: ProductId = parse_id(&id)?;
    state.inventory().delete_product(&admin, id).await?;
    Ok(data("Product deletion successful."))
}
