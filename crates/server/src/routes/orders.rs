//! Order placement, listing and payment.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::instrument;

use minimart_core::{OrderId, ProductId};

use super::{ApiJson, Envelope, data, parse_id};
use crate::error::Result;
use crate::middleware::RequireUser;
use crate::models::Order;
use crate::state::AppState;

/// Build the order router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/order", post(place).get(index))
        .route("/order/pay", post(pay))
        .route("/order/{id}", get(show))
}

/// Order placement body. The user always comes from the token.
#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    #[serde(rename = "productID", alias = "product_id")]
    pub product_id: ProductId,
    pub quantity: i32,
}

/// Payment body.
#[derive(Debug, Deserialize)]
pub struct PayOrderRequest {
    #[serde(rename = "orderID", alias = "order_id")]
    pub order_id: OrderId,
}

/// Place an order against current stock.
#[instrument(skip(user, state))]
pub async fn place(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<PlaceOrderRequest>,
) -> Result<Json<Envelope<Order>>> {
    let order = state
        .orders()
        .place_order(&user, body.product_id, body.quantity)
        .await?;
    Ok(data(order))
}

/// The caller's orders, newest first.
#[instrument(skip(user, state))]
pub async fn index(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
) -> Result<Json<Envelope<Vec<Order>>>> {
    let orders = state.orders().list_orders(&user).await?;
    Ok(data(orders))
}

/// One of the caller's orders.
#[instrument(skip(user, state))]
pub async fn show(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Order>>> {
    let id: OrderId = parse_id(&id)?;
    let order = state.orders().get_order(&user, id).await?;
    Ok(data(order))
}

/// Mark one of the caller's unpaid orders as paid.
#[instrument(skip(user, state))]
pub async fn pay(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<PayOrderRequest>,
) -> Result<Json<Envelope<&'static str>>> {
    state.orders().pay_order(&user, body.order_id).await?;
    Ok(data("Payment successful."))
}
