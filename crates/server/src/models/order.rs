//! Order types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use minimart_core::{OrderId, OrderStatus, ProductId, UserId};

/// A placed order.
///
/// `total` is fixed at placement time (`quantity × unit price` as read by the
/// reservation) and never recomputed when the product price changes later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub total: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
