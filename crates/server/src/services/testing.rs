//! Fixtures shared by the service tests.

#![allow(clippy::unwrap_used)]

use std::str::FromStr;

use rust_decimal::Decimal;
use uuid::Uuid;

use minimart_core::{Price, UserLevel};

use super::AuthService;
use crate::db::MemoryStore;
use crate::models::{AdminUser, CurrentUser, NewProduct};

const PASSWORD: &str = "password123";

/// Register a customer and return their resolved identity.
pub async fn customer(store: &MemoryStore, name: &str) -> CurrentUser {
    let auth = AuthService::new(store);
    let token = auth
        .register(name, PASSWORD, &format!("{name}@example.com"))
        .await
        .unwrap();
    auth.authenticate(&token).await.unwrap()
}

/// Register a fresh administrator (unique name per call).
pub async fn admin(store: &MemoryStore) -> AdminUser {
    let name = format!("admin-{}", Uuid::new_v4().simple());
    let auth = AuthService::new(store);
    let token = auth
        .register(&name, PASSWORD, &format!("{name}@example.com"))
        .await
        .unwrap();
    auth.set_level(&name, UserLevel::Admin).await.unwrap();
    auth.authenticate_admin(&token).await.unwrap()
}

/// A valid product priced at `price` (decimal string).
pub fn new_product(price: &str, stock: i32) -> NewProduct {
    let price = Price::new(Decimal::from_str(price).unwrap()).unwrap();
    NewProduct::new("Widget", "tools", price, stock).unwrap()
}
