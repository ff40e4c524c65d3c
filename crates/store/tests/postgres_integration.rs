//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p store --test postgres_integration -- --ignored --test-threads=1
//! ```

use std::sync::Arc;

use common::{ProductId, UserId};
use domain::{CartMutation, CartTotals, Money, Settlement, SubCategory, UserProfile};
use sqlx::PgPool;
use store::{PostgresShopStore, ShopStore};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            // Create a temporary pool just for migrations
            let temp_pool = PgPool::connect(&connection_string).await.unwrap();

            sqlx::raw_sql(include_str!(
                "../../../migrations/001_create_shop_tables.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();

            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and cleared tables
async fn get_test_store() -> PostgresShopStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    // Clear tables for test isolation
    sqlx::query(
        "TRUNCATE TABLE users, categories, subcategories, products, carts, cart_lines, orders, order_lines RESTART IDENTITY CASCADE",
    )
    .execute(&pool)
    .await
    .unwrap();

    PostgresShopStore::new(pool)
}

async fn seed_user(store: &PostgresShopStore, id: i64) -> UserId {
    let uid = UserId::new(id);
    store
        .upsert_user(uid, UserProfile::default())
        .await
        .unwrap();
    uid
}

/// Seeds one category, one subcategory, and `prices.len()` products at the
/// given unit prices.
async fn seed_catalog(store: &PostgresShopStore, prices: &[i64]) -> (SubCategory, Vec<ProductId>) {
    let pool = store.pool();

    let category_id: i64 =
        sqlx::query_scalar("INSERT INTO categories (name) VALUES ('Drinks') RETURNING id")
            .fetch_one(pool)
            .await
            .unwrap();

    let subcategory_id: i64 = sqlx::query_scalar(
        "INSERT INTO subcategories (category_id, name) VALUES ($1, 'Tea') RETURNING id",
    )
    .bind(category_id)
    .fetch_one(pool)
    .await
    .unwrap();

    let mut products = Vec::new();
    for (i, cents) in prices.iter().enumerate() {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO products (subcategory_id, name, price_cents) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(subcategory_id)
        .bind(format!("Product {i}"))
        .bind(cents)
        .fetch_one(pool)
        .await
        .unwrap();
        products.push(ProductId::new(id));
    }

    let subcategory = store
        .subcategory(common::SubCategoryId::new(subcategory_id))
        .await
        .unwrap()
        .unwrap();
    (subcategory, products)
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn upsert_user_creates_then_refreshes() {
    let store = get_test_store().await;
    let uid = UserId::new(42);

    let created = store
        .upsert_user(
            uid,
            UserProfile {
                first_name: Some("Ada".to_string()),
                ..UserProfile::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(created.display_name(), "Ada");

    let updated = store
        .upsert_user(
            uid,
            UserProfile {
                first_name: Some("Grace".to_string()),
                ..UserProfile::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.display_name(), "Grace");
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.last_seen >= created.last_seen);
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn cart_merges_and_deletes_below_one() {
    let store = get_test_store().await;
    let uid = seed_user(&store, 1).await;
    let (_, products) = seed_catalog(&store, &[10_000]).await;
    let product = products[0];

    assert_eq!(
        store.add_to_cart(uid, product, 1).await.unwrap(),
        CartMutation::Updated { quantity: 1 }
    );
    assert_eq!(
        store.add_to_cart(uid, product, 2).await.unwrap(),
        CartMutation::Updated { quantity: 3 }
    );
    assert_eq!(
        store.add_to_cart(uid, product, -3).await.unwrap(),
        CartMutation::Removed
    );

    // The empty cart is gone too.
    let live_carts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM carts")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(live_carts, 0);
    assert!(store.cart_lines(uid).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn concurrent_adds_serialize_at_the_database() {
    let store = get_test_store().await;
    let uid = seed_user(&store, 1).await;
    let (_, products) = seed_catalog(&store, &[100]).await;
    let product = products[0];

    let n = 20;
    let mut handles = Vec::new();
    for _ in 0..n {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store.add_to_cart(uid, product, 1).await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let lines = store.cart_lines(uid).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, n);
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn totals_and_pagination() {
    let store = get_test_store().await;
    let uid = seed_user(&store, 1).await;
    let (sub, products) = seed_catalog(&store, &[10_000, 5_000, 100, 100, 100, 100, 100]).await;

    // Aggregate columns must decode as i64 both with and without rows.
    assert_eq!(store.cart_totals(uid).await.unwrap(), CartTotals::zero());

    store.add_to_cart(uid, products[0], 2).await.unwrap();
    store.add_to_cart(uid, products[1], 1).await.unwrap();

    let totals = store.cart_totals(uid).await.unwrap();
    assert_eq!(
        totals,
        CartTotals {
            quantity: 3,
            total: Money::from_cents(25_000),
        }
    );

    let page1 = store.products(sub.id, 1, 5).await.unwrap();
    assert_eq!(page1.items.len(), 5);
    assert_eq!(page1.total, 7);
    assert_eq!(page1.max_page(), 2);
    assert!(!page1.has_prev());
    assert!(page1.has_next());

    let page2 = store.products(sub.id, 2, 5).await.unwrap();
    assert_eq!(page2.items.len(), 2);
    assert!(page2.has_prev());
    assert!(!page2.has_next());

    // Out of range: empty items, true total.
    let page9 = store.products(sub.id, 9, 5).await.unwrap();
    assert!(page9.is_empty());
    assert_eq!(page9.total, 7);
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn checkout_snapshots_prices_and_clears_cart() {
    let store = get_test_store().await;
    let uid = seed_user(&store, 1).await;
    let (_, products) = seed_catalog(&store, &[10_000, 5_000]).await;

    store.add_to_cart(uid, products[0], 2).await.unwrap();
    store.add_to_cart(uid, products[1], 1).await.unwrap();

    let order = store
        .create_order_from_cart(uid, "Main St 1")
        .await
        .unwrap()
        .expect("order created");
    assert_eq!(order.total, Money::from_cents(25_000));
    assert_eq!(order.lines.len(), 2);
    assert!(!order.is_paid);
    assert!(order.payment_id.is_none());
    assert!(store.cart_lines(uid).await.unwrap().is_empty());

    // Live price changes do not rewrite the snapshot.
    sqlx::query("UPDATE products SET price_cents = 99999 WHERE id = $1")
        .bind(products[0].as_i64())
        .execute(store.pool())
        .await
        .unwrap();
    let reloaded = store.order_for_user(order.id, uid).await.unwrap().unwrap();
    assert_eq!(reloaded.total, Money::from_cents(25_000));
    assert_eq!(reloaded.lines_total(), reloaded.total);

    // A second submission finds no cart and creates nothing.
    let second = store.create_order_from_cart(uid, "Main St 1").await.unwrap();
    assert!(second.is_none());
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn orders_are_owner_scoped() {
    let store = get_test_store().await;
    let owner = seed_user(&store, 1).await;
    let other = seed_user(&store, 2).await;
    let (_, products) = seed_catalog(&store, &[100]).await;

    store.add_to_cart(owner, products[0], 1).await.unwrap();
    let order = store
        .create_order_from_cart(owner, "addr")
        .await
        .unwrap()
        .unwrap();

    assert!(store.order_for_user(order.id, owner).await.unwrap().is_some());
    assert!(store.order_for_user(order.id, other).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn mark_paid_is_idempotent_and_records_provenance() {
    let store = get_test_store().await;
    let uid = seed_user(&store, 1).await;
    let (_, products) = seed_catalog(&store, &[100]).await;

    store.add_to_cart(uid, products[0], 1).await.unwrap();
    let order = store
        .create_order_from_cart(uid, "addr")
        .await
        .unwrap()
        .unwrap();

    store.set_payment_intent(order.id, "PAY-123").await.unwrap();

    assert!(store.mark_paid(order.id, Settlement::Provider).await.unwrap());
    assert!(!store.mark_paid(order.id, Settlement::Manual).await.unwrap());

    let reloaded = store.order_for_user(order.id, uid).await.unwrap().unwrap();
    assert!(reloaded.is_paid);
    assert_eq!(reloaded.payment_id.as_deref(), Some("PAY-123"));
    assert_eq!(reloaded.settled_via, Some(Settlement::Provider));
}
