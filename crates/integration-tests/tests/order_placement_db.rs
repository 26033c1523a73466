//! Live-database tests for the cart-to-order conversion engine.
//!
//! These tests require a running `PostgreSQL` database reachable via
//! `PAPERBACK_DATABASE_URL` (or `DATABASE_URL`). Migrations are applied on
//! connect; every test creates its own user so runs are isolated.
//!
//! Run with: `cargo test -p paperback-integration-tests -- --ignored`

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::time::{SystemTime, UNIX_EPOCH};

use rust_decimal::Decimal;
use sqlx::PgPool;

use paperback_api::db::MIGRATOR;
use paperback_api::db::books::{BookRepository, NewBook};
use paperback_api::db::carts::CartRepository;
use paperback_api::db::orders::OrderRepository;
use paperback_api::db::users::{NewUser, UserRepository};
use paperback_api::models::user::User;
use paperback_api::services::orders::PlaceOrderError;
use paperback_core::{BookId, Email, UserId};

async fn test_pool() -> PgPool {
    let url = std::env::var("PAPERBACK_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("PAPERBACK_DATABASE_URL must point at a test database");

    let pool = PgPool::connect(&url).await.expect("Failed to connect");
    MIGRATOR.run(&pool).await.expect("Failed to run migrations");
    pool
}

/// Monotonic-ish suffix so parallel tests never collide on unique columns.
fn unique_suffix() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos()
}

async fn create_user(pool: &PgPool) -> User {
    let suffix = unique_suffix();
    UserRepository::new(pool)
        .create(&NewUser {
            email: Email::parse(&format!("reader{suffix}@example.com")).unwrap(),
            password_hash: "unused-in-these-tests".to_owned(),
            first_name: "Kvothe".to_owned(),
            last_name: "Lackless".to_owned(),
            shipping_address: Some("1 University Rd".to_owned()),
        })
        .await
        .expect("Failed to create user")
}

async fn create_book(pool: &PgPool, price: &str) -> BookId {
    let suffix = unique_suffix();
    BookRepository::new(pool)
        .create(&NewBook {
            title: format!("Title {suffix}"),
            author: "Author".to_owned(),
            isbn: format!("{:013}", suffix % 10_000_000_000_000),
            price: price.parse().unwrap(),
            description: None,
            cover_image: None,
            category_ids: Vec::new(),
        })
        .await
        .expect("Failed to create book")
        .id
}

async fn cart_line_count(pool: &PgPool, user_id: UserId) -> i64 {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM cart_items ci \
         JOIN carts c ON c.id = ci.cart_id WHERE c.user_id = $1",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn order_count(pool: &PgPool, user_id: UserId) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
#[ignore = "Requires PAPERBACK_DATABASE_URL pointing at a test database"]
async fn place_order_snapshots_prices_totals_and_empties_cart() {
    let pool = test_pool().await;
    let user = create_user(&pool).await;
    let book_a = create_book(&pool, "10.00").await;
    let book_b = create_book(&pool, "5.00").await;

    let carts = CartRepository::new(&pool);
    let cart = carts.get_or_create(user.id).await.unwrap();
    carts.add_item(cart.id, book_a, 2).await.unwrap();
    carts.add_item(cart.id, book_b, 1).await.unwrap();

    let (order, items) = OrderRepository::new(&pool).place_order(&user).await.unwrap();

    assert_eq!(order.total, "25.00".parse::<Decimal>().unwrap());
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].price, "10.00".parse::<Decimal>().unwrap());
    assert_eq!(items[0].quantity, 2);
    assert_eq!(items[1].price, "5.00".parse::<Decimal>().unwrap());
    assert_eq!(items[1].quantity, 1);
    assert_eq!(order.shipping_address, "1 University Rd");

    // The cart survives but has zero lines.
    assert_eq!(cart_line_count(&pool, user.id).await, 0);
}

#[tokio::test]
#[ignore = "Requires PAPERBACK_DATABASE_URL pointing at a test database"]
async fn order_lines_keep_snapshot_after_catalog_price_change() {
    let pool = test_pool().await;
    let user = create_user(&pool).await;
    let book = create_book(&pool, "12.50").await;

    let carts = CartRepository::new(&pool);
    let cart = carts.get_or_create(user.id).await.unwrap();
    carts.add_item(cart.id, book, 3).await.unwrap();

    let orders = OrderRepository::new(&pool);
    let (order, _) = orders.place_order(&user).await.unwrap();

    sqlx::query("UPDATE books SET price = 99.99 WHERE id = $1")
        .bind(book)
        .execute(&pool)
        .await
        .unwrap();

    let items = orders.items(order.id).await.unwrap();
    assert_eq!(items[0].price, "12.50".parse::<Decimal>().unwrap());
    assert_eq!(order.total, "37.50".parse::<Decimal>().unwrap());
}

#[tokio::test]
#[ignore = "Requires PAPERBACK_DATABASE_URL pointing at a test database"]
async fn empty_cart_placement_fails_and_persists_nothing() {
    let pool = test_pool().await;
    let user = create_user(&pool).await;

    let orders = OrderRepository::new(&pool);

    // Absent cart: rejected, no order row appears.
    let err = orders.place_order(&user).await.unwrap_err();
    assert!(matches!(err, PlaceOrderError::EmptyCart));
    assert_eq!(order_count(&pool, user.id).await, 0);

    // Present-but-empty cart: same outcome.
    CartRepository::new(&pool).get_or_create(user.id).await.unwrap();
    let err = orders.place_order(&user).await.unwrap_err();
    assert!(matches!(err, PlaceOrderError::EmptyCart));
    assert_eq!(order_count(&pool, user.id).await, 0);
}

#[tokio::test]
#[ignore = "Requires PAPERBACK_DATABASE_URL pointing at a test database"]
async fn concurrent_placements_serialize_on_the_cart_row() {
    let pool = test_pool().await;
    let user = create_user(&pool).await;
    let book = create_book(&pool, "10.00").await;

    let carts = CartRepository::new(&pool);
    let cart = carts.get_or_create(user.id).await.unwrap();
    carts.add_item(cart.id, book, 2).await.unwrap();

    let (pool_a, user_a) = (pool.clone(), user.clone());
    let (pool_b, user_b) = (pool.clone(), user.clone());

    let task_a =
        tokio::spawn(async move { OrderRepository::new(&pool_a).place_order(&user_a).await });
    let task_b =
        tokio::spawn(async move { OrderRepository::new(&pool_b).place_order(&user_b).await });

    let results = [task_a.await.unwrap(), task_b.await.unwrap()];

    // The cart-row lock lets exactly one conversion through; the loser sees
    // an already-emptied cart.
    let wins = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1);
    assert!(
        results
            .iter()
            .any(|r| matches!(r, Err(PlaceOrderError::EmptyCart)))
    );

    assert_eq!(order_count(&pool, user.id).await, 1);
    assert_eq!(cart_line_count(&pool, user.id).await, 0);
}
