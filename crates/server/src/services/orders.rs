//! Order workflow.
//!
//! Orders are created `unpaid` and move to `paid` exactly once. Placement
//! reserves stock and inserts the order as one atomic unit, so a failed
//! insert never leaves stock decremented and two concurrent orders can never
//! oversell a product.
//!
//! Orders are private to the user who placed them: fetching or paying
//! someone else's order reports `NotFound`, the same as a missing id.

use thiserror::Error;
use tracing::{info, instrument};

use minimart_core::{OrderId, OrderStatus, ProductId};

use super::inventory::{LedgerError, ledger_error, validate_quantity};
use crate::db::{RepositoryError, Store};
use crate::models::{CurrentUser, Order};

/// Errors from the order workflow.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Product lookup or stock reservation failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// No order with this id belongs to the caller.
    #[error("order {0} not found")]
    NotFound(OrderId),

    /// The order is not in a state that allows the transition.
    #[error("order {id} is already {status}")]
    InvalidState { id: OrderId, status: OrderStatus },

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Order placement, payment and lookup for the authenticated user.
pub struct OrderService<'a> {
    store: &'a dyn Store,
}

impl<'a> OrderService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Place an order for `quantity` units of a product.
    ///
    /// The user id always comes from the resolved session, never from the
    /// request body.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Ledger` wrapping `InvalidQuantity`, `NotFound`,
    /// `InvalidTotal` or `InsufficientStock`. On any error neither stock nor
    /// orders change.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn place_order(
        &self,
        user: &CurrentUser,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<Order, OrderError> {
        validate_quantity(quantity)?;

        let product = self
            .store
            .find_product(product_id)
            .await?
            .ok_or(LedgerError::NotFound(product_id))?;

        product
            .price
            .line_total(quantity)
            .map_err(LedgerError::from)?;

        if quantity > product.stock {
            return Err(LedgerError::InsufficientStock {
                requested: quantity,
                available: product.stock,
            }
            .into());
        }

        // The early check gives a friendly error; the conditional decrement
        // inside place_order is what actually guards stock.
        let (order, product) = self
            .store
            .place_order(user.id, product_id, quantity)
            .await
            .map_err(|e| ledger_error(e, product_id))?;

        info!(
            order_id = %order.id,
            product_id = %product_id,
            quantity,
            total = %order.total,
            stock_left = product.stock,
            "order placed"
        );
        Ok(order)
    }

    /// Mark one of the caller's orders as paid.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if the order does not exist or belongs
    /// to someone else, and `OrderError::InvalidState` if it is already paid.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn pay_order(&self, user: &CurrentUser, id: OrderId) -> Result<Order, OrderError> {
        let order = self.get_order(user, id).await?;
        if !order.status.can_transition_to(OrderStatus::Paid) {
            return Err(OrderError::InvalidState {
                id,
                status: order.status,
            });
        }

        let order = self.store.mark_order_paid(id).await.map_err(|e| match e {
            RepositoryError::NotFound => OrderError::NotFound(id),
            RepositoryError::StatusMismatch(status) => OrderError::InvalidState { id, status },
            other => OrderError::Repository(other),
        })?;

        info!(order_id = %order.id, total = %order.total, "order paid");
        Ok(order)
    }

    /// Fetch one of the caller's orders.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if the order does not exist or belongs
    /// to someone else.
    pub async fn get_order(&self, user: &CurrentUser, id: OrderId) -> Result<Order, OrderError> {
        self.store
            .find_order(id)
            .await?
            .filter(|order| order.user_id == user.id)
            .ok_or(OrderError::NotFound(id))
    }

    /// The caller's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the query fails.
    pub async fn list_orders(&self, user: &CurrentUser) -> Result<Vec<Order>, OrderError> {
        Ok(self.store.list_orders_for_user(user.id).await?)
    }
}
