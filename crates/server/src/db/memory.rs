//! In-process [`Store`] used for local runs and tests.
//!
//! All tables sit behind a single `RwLock`, so every write (including the
//! reserve-then-insert of order placement) is atomic with respect to every
//! other request.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use minimart_core::{
    CommentId, OrderId, OrderStatus, ProductId, SessionToken, UserId, UserLevel, Username,
};

use super::{
    CommentRepository, OrderRepository, ProductRepository, RepositoryError, Store,
    UserRepository,
};
use crate::models::{Comment, NewComment, NewProduct, NewUser, Order, Product, User};

struct UserRecord {
    user: User,
    password_hash: String,
    token: Option<SessionToken>,
}

struct ProductRecord {
    product: Product,
    deleted: bool,
}

#[derive(Default)]
struct Tables {
    users: BTreeMap<UserId, UserRecord>,
    products: BTreeMap<ProductId, ProductRecord>,
    orders: BTreeMap<OrderId, Order>,
    comments: BTreeMap<CommentId, Comment>,
    last_user_id: i64,
    last_product_id: i64,
    last_order_id: i64,
    last_comment_id: i64,
}

impl Tables {
    fn live_product(&self, id: ProductId) -> Option<&Product> {
        self.products
            .get(&id)
            .filter(|record| !record.deleted)
            .map(|record| &record.product)
    }

    fn live_product_mut(&mut self, id: ProductId) -> Option<&mut Product> {
        self.products
            .get_mut(&id)
            .filter(|record| !record.deleted)
            .map(|record| &mut record.product)
    }

    fn reserve(&mut self, id: ProductId, quantity: i32) -> Result<Product, RepositoryError> {
        let product = self
            .live_product_mut(id)
            .ok_or(RepositoryError::NotFound)?;
        if product.stock < quantity {
            return Err(RepositoryError::InsufficientStock {
                requested: quantity,
                available: product.stock,
            });
        }
        product.stock -= quantity;
        product.updated_at = Utc::now();
        Ok(product.clone())
    }
}

/// Thread-safe in-memory tables with identity-style ids starting at 1.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert_user(&self, new: &NewUser) -> Result<User, RepositoryError> {
        let mut tables = self.tables.write().await;

        for record in tables.users.values() {
            if record.user.username == new.username {
                return Err(RepositoryError::Conflict("username already taken".to_owned()));
            }
            if record.user.email == new.email {
                return Err(RepositoryError::Conflict(
                    "email already registered".to_owned(),
                ));
            }
        }

        tables.last_user_id += 1;
        let now = Utc::now();
        let user = User {
            id: UserId::new(tables.last_user_id),
            username: new.username.clone(),
            email: new.email.clone(),
            level: UserLevel::Customer,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(
            user.id,
            UserRecord {
                user: user.clone(),
                password_hash: new.password_hash.clone(),
                token: Some(new.token.clone()),
            },
        );
        Ok(user)
    }

    async fn find_credentials(
        &self,
        username: &Username,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|record| &record.user.username == username)
            .map(|record| (record.user.clone(), record.password_hash.clone())))
    }

    async fn find_user_by_token(
        &self,
        token: &SessionToken,
    ) -> Result<Option<User>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|record| record.token.as_ref() == Some(token))
            .map(|record| record.user.clone()))
    }

    async fn replace_token(
        &self,
        id: UserId,
        token: &SessionToken,
    ) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        let record = tables.users.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        record.token = Some(token.clone());
        record.user.updated_at = Utc::now();
        Ok(())
    }

    async fn clear_token(&self, token: &SessionToken) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.write().await;
        let Some(record) = tables
            .users
            .values_mut()
            .find(|record| record.token.as_ref() == Some(token))
        else {
            return Ok(false);
        };

        record.token = None;
        record.user.updated_at = Utc::now();
        Ok(true)
    }

    async fn set_level(
        &self,
        username: &Username,
        level: UserLevel,
    ) -> Result<User, RepositoryError> {
        let mut tables = self.tables.write().await;
        let record = tables
            .users
            .values_mut()
            .find(|record| &record.user.username == username)
            .ok_or(RepositoryError::NotFound)?;
        record.user.level = level;
        record.user.updated_at = Utc::now();
        Ok(record.user.clone())
    }
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn insert_product(&self, new: &NewProduct) -> Result<Product, RepositoryError> {
        let mut tables = self.tables.write().await;
        tables.last_product_id += 1;
        let now = Utc::now();
        let product = Product {
            id: ProductId::new(tables.last_product_id),
            name: new.name().to_owned(),
            category: new.category().to_owned(),
            price: new.price(),
            stock: new.stock(),
            created_at: now,
            updated_at: now,
        };
        tables.products.insert(
            product.id,
            ProductRecord {
                product: product.clone(),
                deleted: false,
            },
        );
        Ok(product)
    }

    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.tables.read().await.live_product(id).cloned())
    }

    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .products
            .values()
            .filter(|record| !record.deleted)
            .map(|record| record.product.clone())
            .collect())
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.write().await;
        match tables.products.get_mut(&id) {
            Some(record) if !record.deleted => {
                record.deleted = true;
                record.product.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn reserve_stock(
        &self,
        id: ProductId,
        quantity: i32,
    ) -> Result<Product, RepositoryError> {
        self.tables.write().await.reserve(id, quantity)
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn place_order(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<(Order, Product), RepositoryError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user_id) {
            return Err(RepositoryError::Conflict(format!("unknown user {user_id}")));
        }

        // Price the order before taking stock so a bad total changes nothing.
        let price = tables
            .live_product(product_id)
            .ok_or(RepositoryError::NotFound)?
            .price;
        let total = price.line_total(quantity)?;
        let product = tables.reserve(product_id, quantity)?;

        tables.last_order_id += 1;
        let now = Utc::now();
        let order = Order {
            id: OrderId::new(tables.last_order_id),
            user_id,
            product_id,
            quantity,
            total,
            status: OrderStatus::Unpaid,
            created_at: now,
            updated_at: now,
        };
        tables.orders.insert(order.id, order.clone());
        Ok((order, product))
    }

    async fn find_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.tables.read().await.orders.get(&id).cloned())
    }

    async fn list_orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let tables = self.tables.read().await;
        // Ids are assigned in insertion order, so reverse id order is newest first.
        Ok(tables
            .orders
            .values()
            .rev()
            .filter(|order| order.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn mark_order_paid(&self, id: OrderId) -> Result<Order, RepositoryError> {
        let mut tables = self.tables.write().await;
        let order = tables.orders.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        if !order.status.can_transition_to(OrderStatus::Paid) {
            return Err(RepositoryError::StatusMismatch(order.status));
        }
        order.status = OrderStatus::Paid;
        order.updated_at = Utc::now();
        Ok(order.clone())
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn insert_comment(&self, new: &NewComment) -> Result<Comment, RepositoryError> {
        let mut tables = self.tables.write().await;
        if tables.live_product(new.product_id).is_none() {
            return Err(RepositoryError::Conflict(format!(
                "unknown product {}",
                new.product_id
            )));
        }

        tables.last_comment_id += 1;
        let comment = Comment {
            id: CommentId::new(tables.last_comment_id),
            user_id: new.user_id,
            product_id: new.product_id,
            content: new.content.clone(),
            created_at: Utc::now(),
        };
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn list_comments_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Comment>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .values()
            .rev()
            .filter(|comment| comment.product_id == product_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use minimart_core::{Email, Price, PriceError};
    use rust_decimal::Decimal;

    use super::*;

    fn new_user(name: &str) -> NewUser {
        NewUser {
            username: Username::parse(name).unwrap(),
            email: Email::parse(&format!("{name}@example.com")).unwrap(),
            password_hash: "hash".to_owned(),
            token: SessionToken::generate(),
        }
    }

    async fn seed_product(store: &MemoryStore, stock: i32) -> Product {
        let price = Price::new(Decimal::new(200, 2)).unwrap();
        store
            .insert_product(&NewProduct::new("Widget", "tools", price, stock).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_insert_user_rejects_duplicates() {
        let store = MemoryStore::new();
        store.insert_user(&new_user("alice")).await.unwrap();

        let err = store.insert_user(&new_user("alice")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_token_lookup_follows_replace_and_clear() {
        let store = MemoryStore::new();
        let new = new_user("bob");
        let first = new.token.clone();
        let user = store.insert_user(&new).await.unwrap();
        assert_eq!(
            store.find_user_by_token(&first).await.unwrap().map(|u| u.id),
            Some(user.id)
        );

        let second = SessionToken::generate();
        store.replace_token(user.id, &second).await.unwrap();
        assert!(store.find_user_by_token(&first).await.unwrap().is_none());
        assert!(store.find_user_by_token(&second).await.unwrap().is_some());

        assert!(store.clear_token(&second).await.unwrap());
        assert!(!store.clear_token(&second).await.unwrap());
        assert!(store.find_user_by_token(&second).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reserve_decrements_or_rejects() {
        let store = MemoryStore::new();
        let product = seed_product(&store, 5).await;

        let updated = store.reserve_stock(product.id, 5).await.unwrap();
        assert_eq!(updated.stock, 0);

        let err = store.reserve_stock(product.id, 1).await.unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::InsufficientStock {
                requested: 1,
                available: 0
            }
        ));
        assert_eq!(store.find_product(product.id).await.unwrap().unwrap().stock, 0);
    }

    #[tokio::test]
    async fn test_deleted_product_is_hidden() {
        let store = MemoryStore::new();
        let product = seed_product(&store, 5).await;

        assert!(store.delete_product(product.id).await.unwrap());
        assert!(!store.delete_product(product.id).await.unwrap());
        assert!(store.find_product(product.id).await.unwrap().is_none());
        assert!(store.list_products().await.unwrap().is_empty());
        assert!(matches!(
            store.reserve_stock(product.id, 1).await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_failed_placement_leaves_no_trace() {
        let store = MemoryStore::new();
        let user = store.insert_user(&new_user("carol")).await.unwrap();
        let product = seed_product(&store, 2).await;

        assert!(store.place_order(user.id, product.id, 3).await.is_err());
        assert!(store.list_orders_for_user(user.id).await.unwrap().is_empty());
        assert_eq!(store.find_product(product.id).await.unwrap().unwrap().stock, 2);
    }

    #[tokio::test]
    async fn test_out_of_range_total_takes_no_stock() {
        let store = MemoryStore::new();
        let user = store.insert_user(&new_user("frank")).await.unwrap();
        let price = Price::new(Price::MAX).unwrap();
        let product = store
            .insert_product(&NewProduct::new("Yacht", "", price, 500).unwrap())
            .await
            .unwrap();

        let err = store.place_order(user.id, product.id, 101).await.unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::Total(PriceError::TotalTooLarge { quantity: 101, .. })
        ));
        assert!(store.list_orders_for_user(user.id).await.unwrap().is_empty());
        assert_eq!(store.find_product(product.id).await.unwrap().unwrap().stock, 500);
    }

    #[tokio::test]
    async fn test_comment_on_deleted_product_is_rejected() {
        let store = MemoryStore::new();
        let user = store.insert_user(&new_user("grace")).await.unwrap();
        let product = seed_product(&store, 1).await;
        store.delete_product(product.id).await.unwrap();

        let err = store
            .insert_comment(&NewComment {
                user_id: user.id,
                product_id: product.id,
                content: "still here?".to_owned(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert!(
            store
                .list_comments_for_product(product.id)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_mark_paid_only_once() {
        let store = MemoryStore::new();
        let user = store.insert_user(&new_user("dave")).await.unwrap();
        let product = seed_product(&store, 2).await;
        let (order, _) = store.place_order(user.id, product.id, 1).await.unwrap();

        let paid = store.mark_order_paid(order.id).await.unwrap();
        assert_eq!(paid.status, OrderStatus::Paid);
        assert!(matches!(
            store.mark_order_paid(order.id).await,
            Err(RepositoryError::StatusMismatch(OrderStatus::Paid))
        ));
        assert!(matches!(
            store.mark_order_paid(OrderId::new(99)).await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_concurrent_reservations_never_oversell() {
        let store = Arc::new(MemoryStore::new());
        let user = store.insert_user(&new_user("erin")).await.unwrap();
        let product = seed_product(&store, 10).await;
        let (user_id, product_id) = (user.id, product.id);

        let mut handles = Vec::new();
        for _ in 0..25 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.place_order(user_id, product_id, 1).await.is_ok()
            }));
        }

        let mut placed = 0;
        for handle in handles {
            if handle.await.unwrap() {
                placed += 1;
            }
        }

        assert_eq!(placed, 10);
        assert_eq!(store.find_product(product.id).await.unwrap().unwrap().stock, 0);
        assert_eq!(store.list_orders_for_user(user.id).await.unwrap().len(), 10);
    }
}
