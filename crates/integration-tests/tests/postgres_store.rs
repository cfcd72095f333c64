//! `PgStore` against a real database.
//!
//! These tests require:
//! - A disposable `PostgreSQL` database in `MINIMART_TEST_DATABASE_URL`
//!
//! Migrations are applied on connect. Names are randomized so runs do not
//! collide.
//!
//! Run with: cargo test -p minimart-integration-tests -- --ignored

use std::sync::Arc;

use minimart_core::{Email, OrderStatus, Price, SessionToken, UserId, Username};
use minimart_server::db::{
    OrderRepository, PgStore, ProductRepository, RepositoryError, Store, UserRepository,
    create_pool,
};
use minimart_server::models::{NewProduct, NewUser};
use rust_decimal::Decimal;
use secrecy::SecretString;
use uuid::Uuid;

async fn store() -> PgStore {
    let url = std::env::var("MINIMART_TEST_DATABASE_URL")
        .expect("MINIMART_TEST_DATABASE_URL must be set");
    let pool = create_pool(&SecretString::from(url))
        .await
        .expect("Failed to connect to test database");
    sqlx::migrate!("../server/migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    PgStore::new(pool)
}

async fn user(store: &PgStore) -> UserId {
    let name = format!("pg-{}", Uuid::new_v4().simple());
    store
        .insert_user(&NewUser {
            username: Username::parse(&name).unwrap(),
            email: Email::parse(&format!("{name}@example.com")).unwrap(),
            password_hash: "not-a-real-hash".to_string(),
            token: SessionToken::generate(),
        })
        .await
        .unwrap()
        .id
}

fn product(price: Decimal, stock: i32) -> NewProduct {
    NewProduct::new("Widget", "tools", Price::new(price).unwrap(), stock).unwrap()
}

#[tokio::test]
#[ignore = "Requires MINIMART_TEST_DATABASE_URL"]
async fn test_ping() {
    store().await.ping().await.unwrap();
}

#[tokio::test]
#[ignore = "Requires MINIMART_TEST_DATABASE_URL"]
async fn test_duplicate_username_conflicts() {
    let store = store().await;
    let name = format!("pg-{}", Uuid::new_v4().simple());
    let new_user = |email: &str| NewUser {
        username: Username::parse(&name).unwrap(),
        email: Email::parse(email).unwrap(),
        password_hash: "hash".to_string(),
        token: SessionToken::generate(),
    };

    store
        .insert_user(&new_user(&format!("{name}@example.com")))
        .await
        .unwrap();
    let err = store
        .insert_user(&new_user(&format!("{name}-2@example.com")))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)), "{err:?}");
}

#[tokio::test]
#[ignore = "Requires MINIMART_TEST_DATABASE_URL"]
async fn test_place_order_commits_order_and_stock_together() {
    let store = store().await;
    let buyer = user(&store).await;
    let created = store
        .insert_product(&product(Decimal::new(200, 2), 10))
        .await
        .unwrap();

    let (order, after) = store.place_order(buyer, created.id, 3).await.unwrap();
    assert_eq!(order.total, Decimal::new(600, 2));
    assert_eq!(order.status, OrderStatus::Unpaid);
    assert_eq!(after.stock, 7);

    let err = store.place_order(buyer, created.id, 8).await.unwrap_err();
    assert!(matches!(
        err,
        RepositoryError::InsufficientStock {
            requested: 8,
            available: 7
        }
    ));

    // The failed attempt left no order behind
    assert_eq!(store.list_orders_for_user(buyer).await.unwrap().len(), 1);
    assert_eq!(
        store.find_product(created.id).await.unwrap().unwrap().stock,
        7
    );
}

#[tokio::test]
#[ignore = "Requires MINIMART_TEST_DATABASE_URL"]
async fn test_largest_price_and_total_fit_the_columns() {
    let store = store().await;
    let buyer = user(&store).await;
    let created = store
        .insert_product(&product(Price::MAX, 1000))
        .await
        .unwrap();
    assert_eq!(created.price.amount(), Price::MAX);

    let err = store.place_order(buyer, created.id, 101).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Total(_)), "{err:?}");
    assert_eq!(
        store.find_product(created.id).await.unwrap().unwrap().stock,
        1000
    );

    let (order, after) = store.place_order(buyer, created.id, 100).await.unwrap();
    assert_eq!(order.total, Price::MAX_TOTAL - Decimal::new(99, 2));
    assert_eq!(after.stock, 900);
}

#[tokio::test]
#[ignore = "Requires MINIMART_TEST_DATABASE_URL"]
async fn test_concurrent_orders_never_oversell() {
    let store = Arc::new(store().await);
    let buyer = user(&store).await;
    let product_id = store
        .insert_product(&product(Decimal::ONE, 10))
        .await
        .unwrap()
        .id;

    let handles: Vec<_> = (0..25)
        .map(|_| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.place_order(buyer, product_id, 1).await })
        })
        .collect();

    let mut placed = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => placed += 1,
            Err(RepositoryError::InsufficientStock { .. }) => {}
            Err(other) => panic!("unexpected error {other:?}"),
        }
    }

    assert_eq!(placed, 10);
    assert_eq!(
        store.find_product(product_id).await.unwrap().unwrap().stock,
        0
    );
}

#[tokio::test]
#[ignore = "Requires MINIMART_TEST_DATABASE_URL"]
async fn test_mark_paid_only_once() {
    let store = store().await;
    let buyer = user(&store).await;
    let product_id = store
        .insert_product(&product(Decimal::ONE, 1))
        .await
        .unwrap()
        .id;
    let (order, _) = store.place_order(buyer, product_id, 1).await.unwrap();

    let paid = store.mark_order_paid(order.id).await.unwrap();
    assert_eq!(paid.status, OrderStatus::Paid);

    let err = store.mark_order_paid(order.id).await.unwrap_err();
    assert!(matches!(err, RepositoryError::StatusMismatch(OrderStatus::Paid)));
}

#[tokio::test]
#[ignore = "Requires MINIMART_TEST_DATABASE_URL"]
async fn test_soft_deleted_product_is_invisible() {
    let store = store().await;
    let product_id = store
        .insert_product(&product(Decimal::ONE, 5))
        .await
        .unwrap()
        .id;

    assert!(store.delete_product(product_id).await.unwrap());
    assert!(!store.delete_product(product_id).await.unwrap());
    assert!(store.find_product(product_id).await.unwrap().is_none());
    assert!(
        store
            .list_products()
            .await
            .unwrap()
            .iter()
            .all(|p| p.id != product_id)
    );
    assert!(matches!(
        store.reserve_stock(product_id, 1).await.unwrap_err(),
        RepositoryError::NotFound
    ));
}
