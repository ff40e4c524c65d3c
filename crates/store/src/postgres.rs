use async_trait::async_trait;
use common::{CategoryId, OrderId, ProductId, SubCategoryId, UserId};
use domain::{
    CartLine, CartMutation, CartTotals, Category, Money, Order, OrderLine, Page, Product,
    Settlement, SubCategory, User, UserProfile, pager,
};
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::{Result, ShopStore, StoreError};

/// PostgreSQL-backed shop store.
#[derive(Clone)]
pub struct PostgresShopStore {
    pool: PgPool,
}

impl PostgresShopStore {
    /// Creates a new PostgreSQL shop store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_user(row: PgRow) -> Result<User> {
        Ok(User {
            id: UserId::new(row.try_get("id")?),
            profile: UserProfile {
                first_name: row.try_get("first_name")?,
                last_name: row.try_get("last_name")?,
                username: row.try_get("username")?,
                language_code: row.try_get("language_code")?,
            },
            created_at: row.try_get("created_at")?,
            last_seen: row.try_get("last_seen")?,
        })
    }

    fn row_to_product(row: &PgRow) -> Result<Product> {
        Ok(Product {
            id: ProductId::new(row.try_get("id")?),
            subcategory_id: SubCategoryId::new(row.try_get("subcategory_id")?),
            name: row.try_get("name")?,
            price: Money::from_cents(row.try_get("price_cents")?),
            description: row.try_get("description")?,
            photo: row.try_get("photo")?,
        })
    }

    fn row_to_order_header(row: &PgRow) -> Result<Order> {
        let settled_via: Option<String> = row.try_get("settled_via")?;
        let settled_via = settled_via
            .map(|s| {
                Settlement::parse(&s)
                    .ok_or_else(|| StoreError::Corrupt(format!("unknown settlement kind {s:?}")))
            })
            .transpose()?;

        Ok(Order {
            id: OrderId::new(row.try_get("id")?),
            user_id: UserId::new(row.try_get("user_id")?),
            address: row.try_get("address")?,
            total: Money::from_cents(row.try_get("total_cents")?),
            payment_id: row.try_get("payment_id")?,
            is_paid: row.try_get("is_paid")?,
            settled_via,
            created_at: row.try_get("created_at")?,
            lines: Vec::new(),
        })
    }

    fn row_to_order_line(row: &PgRow) -> Result<OrderLine> {
        Ok(OrderLine {
            product_id: ProductId::new(row.try_get("product_id")?),
            product_name: row.try_get("product_name")?,
            quantity: quantity_from_row(row.try_get("quantity")?)?,
            unit_price: Money::from_cents(row.try_get("unit_price_cents")?),
        })
    }
}

fn quantity_from_row(raw: i64) -> Result<u32> {
    u32::try_from(raw).map_err(|_| StoreError::Corrupt(format!("quantity {raw} out of range")))
}

#[async_trait]
impl ShopStore for PostgresShopStore {
    #[tracing::instrument(skip(self, profile))]
    async fn upsert_user(&self, id: UserId, profile: UserProfile) -> Result<User> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (id, first_name, last_name, username, language_code)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                username = EXCLUDED.username,
                language_code = EXCLUDED.language_code,
                last_seen = NOW()
            RETURNING id, first_name, last_name, username, language_code, created_at, last_seen
            "#,
        )
        .bind(id.as_i64())
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.username)
        .bind(&profile.language_code)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_user(row)
    }

    async fn categories(&self, page: u64, page_size: u64) -> Result<Page<Category>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query(
            "SELECT id, name FROM categories ORDER BY id ASC LIMIT $1 OFFSET $2",
        )
        .bind(page_size as i64)
        .bind(pager::offset(page, page_size) as i64)
        .fetch_all(&self.pool)
        .await?;

        let items = rows
            .into_iter()
            .map(|row| {
                Ok(Category {
                    id: CategoryId::new(row.try_get("id")?),
                    name: row.try_get("name")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Page::new(items, page, page_size, total as u64))
    }

    async fn subcategories(
        &self,
        category: CategoryId,
        page: u64,
        page_size: u64,
    ) -> Result<Page<SubCategory>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM subcategories WHERE category_id = $1")
                .bind(category.as_i64())
                .fetch_one(&self.pool)
                .await?;

        let rows = sqlx::query(
            r#"
            SELECT id, category_id, name
            FROM subcategories
            WHERE category_id = $1
            ORDER BY id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(category.as_i64())
        .bind(page_size as i64)
        .bind(pager::offset(page, page_size) as i64)
        .fetch_all(&self.pool)
        .await?;

        let items = rows
            .into_iter()
            .map(|row| {
                Ok(SubCategory {
                    id: SubCategoryId::new(row.try_get("id")?),
                    category_id: CategoryId::new(row.try_get("category_id")?),
                    name: row.try_get("name")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Page::new(items, page, page_size, total as u64))
    }

    async fn products(
        &self,
        subcategory: SubCategoryId,
        page: u64,
        page_size: u64,
    ) -> Result<Page<Product>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE subcategory_id = $1")
                .bind(subcategory.as_i64())
                .fetch_one(&self.pool)
                .await?;

        let rows = sqlx::query(
            r#"
            SELECT id, subcategory_id, name, price_cents, description, photo
            FROM products
            WHERE subcategory_id = $1
            ORDER BY id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(subcategory.as_i64())
        .bind(page_size as i64)
        .bind(pager::offset(page, page_size) as i64)
        .fetch_all(&self.pool)
        .await?;

        let items = rows
            .iter()
            .map(Self::row_to_product)
            .collect::<Result<Vec<_>>>()?;

        Ok(Page::new(items, page, page_size, total as u64))
    }

    async fn product(&self, id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query(
            r#"
            SELECT id, subcategory_id, name, price_cents, description, photo
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_product).transpose()
    }

    async fn subcategory(&self, id: SubCategoryId) -> Result<Option<SubCategory>> {
        let row = sqlx::query("SELECT id, category_id, name FROM subcategories WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| {
            Ok(SubCategory {
                id: SubCategoryId::new(row.try_get("id")?),
                category_id: CategoryId::new(row.try_get("category_id")?),
                name: row.try_get("name")?,
            })
        })
        .transpose()
    }

    #[tracing::instrument(skip(self))]
    async fn add_to_cart(
        &self,
        user: UserId,
        product: ProductId,
        delta: i64,
    ) -> Result<CartMutation> {
        let mut tx = self.pool.begin().await?;

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
            .bind(product.as_i64())
            .fetch_one(&mut *tx)
            .await?;
        if !exists {
            return Err(StoreError::Constraint(format!(
                "product {product} does not exist"
            )));
        }

        // Get-or-create the user's single live cart. The no-op update on
        // conflict lets RETURNING yield the existing row's id.
        let cart_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO carts (user_id) VALUES ($1)
            ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING id
            "#,
        )
        .bind(user.as_i64())
        .fetch_one(&mut *tx)
        .await?;

        // Merge by summing; the row may transiently go below one before the
        // delete just after.
        let quantity: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO cart_lines (cart_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (cart_id, product_id)
                DO UPDATE SET quantity = cart_lines.quantity + EXCLUDED.quantity
            RETURNING quantity
            "#,
        )
        .bind(cart_id)
        .bind(product.as_i64())
        .bind(delta)
        .fetch_one(&mut *tx)
        .await?;

        let mutation = if quantity < 1 {
            sqlx::query("DELETE FROM cart_lines WHERE cart_id = $1 AND product_id = $2")
                .bind(cart_id)
                .bind(product.as_i64())
                .execute(&mut *tx)
                .await?;
            CartMutation::Removed
        } else {
            CartMutation::Updated {
                quantity: quantity_from_row(quantity)?,
            }
        };

        sqlx::query(
            "DELETE FROM carts WHERE id = $1 AND NOT EXISTS (SELECT 1 FROM cart_lines WHERE cart_id = $1)",
        )
        .bind(cart_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(mutation)
    }

    #[tracing::instrument(skip(self))]
    async fn remove_cart_line(&self, user: UserId, product: ProductId) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM cart_lines
            WHERE product_id = $2
              AND cart_id IN (SELECT id FROM carts WHERE user_id = $1)
            "#,
        )
        .bind(user.as_i64())
        .bind(product.as_i64())
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            DELETE FROM carts
            WHERE user_id = $1
              AND NOT EXISTS (SELECT 1 FROM cart_lines WHERE cart_id = carts.id)
            "#,
        )
        .bind(user.as_i64())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn cart_lines(&self, user: UserId) -> Result<Vec<CartLine>> {
        let rows = sqlx::query(
            r#"
            SELECT p.id, p.subcategory_id, p.name, p.price_cents, p.description, p.photo,
                   cl.quantity
            FROM cart_lines cl
            JOIN carts c ON c.id = cl.cart_id
            JOIN products p ON p.id = cl.product_id
            WHERE c.user_id = $1
            ORDER BY p.id ASC
            "#,
        )
        .bind(user.as_i64())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(CartLine {
                    product: Self::row_to_product(row)?,
                    quantity: quantity_from_row(row.try_get("quantity")?)?,
                })
            })
            .collect()
    }

    async fn cart_totals(&self, user: UserId) -> Result<CartTotals> {
        // SUM over BIGINT yields NUMERIC; cast back so the columns decode
        // as i64.
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(cl.quantity), 0)::BIGINT AS quantity,
                   COALESCE(SUM(cl.quantity * p.price_cents), 0)::BIGINT AS total_cents
            FROM cart_lines cl
            JOIN carts c ON c.id = cl.cart_id
            JOIN products p ON p.id = cl.product_id
            WHERE c.user_id = $1
            "#,
        )
        .bind(user.as_i64())
        .fetch_one(&self.pool)
        .await?;

        Ok(CartTotals {
            quantity: quantity_from_row(row.try_get("quantity")?)?,
            total: Money::from_cents(row.try_get("total_cents")?),
        })
    }

    #[tracing::instrument(skip(self, address))]
    async fn create_order_from_cart(&self, user: UserId, address: &str) -> Result<Option<Order>> {
        let mut tx = self.pool.begin().await?;

        // Lock the cart row so a concurrent mutation cannot interleave with
        // the snapshot.
        let cart_id: Option<i64> =
            sqlx::query_scalar("SELECT id FROM carts WHERE user_id = $1 FOR UPDATE")
                .bind(user.as_i64())
                .fetch_optional(&mut *tx)
                .await?;
        let Some(cart_id) = cart_id else {
            return Ok(None);
        };

        let line_rows = sqlx::query(
            r#"
            SELECT p.id AS product_id, p.name AS product_name,
                   cl.quantity, p.price_cents AS unit_price_cents
            FROM cart_lines cl
            JOIN products p ON p.id = cl.product_id
            WHERE cl.cart_id = $1
            ORDER BY p.id ASC
            "#,
        )
        .bind(cart_id)
        .fetch_all(&mut *tx)
        .await?;

        if line_rows.is_empty() {
            // A cart with no lines should not exist; clean it up regardless.
            sqlx::query("DELETE FROM carts WHERE id = $1")
                .bind(cart_id)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
            return Ok(None);
        }

        let lines = line_rows
            .iter()
            .map(Self::row_to_order_line)
            .collect::<Result<Vec<_>>>()?;
        let total: Money = lines.iter().map(OrderLine::line_total).sum();

        let order_row = sqlx::query(
            r#"
            INSERT INTO orders (user_id, address, total_cents)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, address, total_cents, payment_id, is_paid, settled_via, created_at
            "#,
        )
        .bind(user.as_i64())
        .bind(address)
        .bind(total.cents())
        .fetch_one(&mut *tx)
        .await?;
        let mut order = Self::row_to_order_header(&order_row)?;

        for line in &lines {
            sqlx::query(
                r#"
                INSERT INTO order_lines (order_id, product_id, product_name, quantity, unit_price_cents)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(order.id.as_i64())
            .bind(line.product_id.as_i64())
            .bind(&line.product_name)
            .bind(i64::from(line.quantity))
            .bind(line.unit_price.cents())
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM carts WHERE id = $1")
            .bind(cart_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        order.lines = lines;
        Ok(Some(order))
    }

    async fn order_for_user(&self, order: OrderId, user: UserId) -> Result<Option<Order>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, address, total_cents, payment_id, is_paid, settled_via, created_at
            FROM orders
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(order.as_i64())
        .bind(user.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut loaded = Self::row_to_order_header(&row)?;

        let line_rows = sqlx::query(
            r#"
            SELECT product_id, product_name, quantity, unit_price_cents
            FROM order_lines
            WHERE order_id = $1
            ORDER BY product_id ASC
            "#,
        )
        .bind(order.as_i64())
        .fetch_all(&self.pool)
        .await?;

        loaded.lines = line_rows
            .iter()
            .map(Self::row_to_order_line)
            .collect::<Result<Vec<_>>>()?;
        Ok(Some(loaded))
    }

    async fn set_payment_intent(&self, order: OrderId, intent_id: &str) -> Result<()> {
        sqlx::query("UPDATE orders SET payment_id = $2 WHERE id = $1")
            .bind(order.as_i64())
            .bind(intent_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn mark_paid(&self, order: OrderId, settlement: Settlement) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE orders SET is_paid = TRUE, settled_via = $2 WHERE id = $1 AND is_paid = FALSE",
        )
        .bind(order.as_i64())
        .bind(settlement.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
