use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{CategoryId, OrderId, ProductId, SubCategoryId, UserId};
use domain::{
    CartLine, CartMutation, CartTotals, Category, Money, Order, OrderLine, Page, Product,
    Settlement, SubCategory, User, UserProfile, pager,
};
use tokio::sync::RwLock;

use crate::{Result, ShopStore, StoreError};

#[derive(Default)]
struct Inner {
    users: HashMap<UserId, User>,
    categories: Vec<Category>,
    subcategories: Vec<SubCategory>,
    products: Vec<Product>,
    /// Cart presence is keyed by user; an entry with no lines never
    /// persists past the mutation that emptied it.
    carts: HashMap<UserId, BTreeMap<ProductId, u32>>,
    orders: Vec<Order>,
    next_category: i64,
    next_subcategory: i64,
    next_product: i64,
    next_order: i64,
}

/// In-memory shop store for tests and local runs.
///
/// A single writer lock serializes mutations; this matches the
/// transactional guarantees of the PostgreSQL implementation within one
/// process. It is not shared across instances.
#[derive(Clone, Default)]
pub struct InMemoryShopStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryShopStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a category and returns it.
    pub async fn seed_category(&self, name: &str) -> Category {
        let mut inner = self.inner.write().await;
        inner.next_category += 1;
        let category = Category {
            id: CategoryId::new(inner.next_category),
            name: name.to_string(),
        };
        inner.categories.push(category.clone());
        category
    }

    /// Inserts a subcategory under a category and returns it.
    pub async fn seed_subcategory(&self, category: CategoryId, name: &str) -> SubCategory {
        let mut inner = self.inner.write().await;
        inner.next_subcategory += 1;
        let subcategory = SubCategory {
            id: SubCategoryId::new(inner.next_subcategory),
            category_id: category,
            name: name.to_string(),
        };
        inner.subcategories.push(subcategory.clone());
        subcategory
    }

    /// Inserts a product under a subcategory and returns it.
    pub async fn seed_product(
        &self,
        subcategory: SubCategoryId,
        name: &str,
        price: Money,
        description: Option<&str>,
        photo: Option<&str>,
    ) -> Product {
        let mut inner = self.inner.write().await;
        inner.next_product += 1;
        let product = Product {
            id: ProductId::new(inner.next_product),
            subcategory_id: subcategory,
            name: name.to_string(),
            price,
            description: description.map(str::to_string),
            photo: photo.map(str::to_string),
        };
        inner.products.push(product.clone());
        product
    }

    /// Changes a product's live price. Existing order snapshots must not
    /// be affected; tests rely on this.
    pub async fn set_product_price(&self, id: ProductId, price: Money) {
        let mut inner = self.inner.write().await;
        if let Some(product) = inner.products.iter_mut().find(|p| p.id == id) {
            product.price = price;
        }
    }

    /// Returns true if the user currently has a live cart.
    pub async fn has_cart(&self, user: UserId) -> bool {
        self.inner.read().await.carts.contains_key(&user)
    }

    /// Returns the number of orders ever created.
    pub async fn order_count(&self) -> usize {
        self.inner.read().await.orders.len()
    }
}

fn lines_of(inner: &Inner, user: UserId) -> Result<Vec<CartLine>> {
    let Some(lines) = inner.carts.get(&user) else {
        return Ok(Vec::new());
    };
    // BTreeMap iteration gives the stable product-id ordering.
    let mut result = Vec::with_capacity(lines.len());
    for (&product_id, &quantity) in lines {
        let product = inner
            .products
            .iter()
            .find(|p| p.id == product_id)
            .cloned()
            .ok_or_else(|| {
                StoreError::Corrupt(format!("cart references missing product {product_id}"))
            })?;
        result.push(CartLine { product, quantity });
    }
    Ok(result)
}

fn page_of<T: Clone>(all: Vec<T>, page: u64, page_size: u64) -> Page<T> {
    let total = all.len() as u64;
    let start = pager::offset(page, page_size).min(total) as usize;
    let end = (start + page_size as usize).min(all.len());
    Page::new(all[start..end].to_vec(), page, page_size, total)
}

#[async_trait]
impl ShopStore for InMemoryShopStore {
    async fn upsert_user(&self, id: UserId, profile: UserProfile) -> Result<User> {
        let mut inner = self.inner.write().await;
        let now = Utc::now();
        let user = inner
            .users
            .entry(id)
            .and_modify(|u| {
                u.profile = profile.clone();
                u.last_seen = now;
            })
            .or_insert_with(|| User {
                id,
                profile,
                created_at: now,
                last_seen: now,
            });
        Ok(user.clone())
    }

    async fn categories(&self, page: u64, page_size: u64) -> Result<Page<Category>> {
        let inner = self.inner.read().await;
        Ok(page_of(inner.categories.clone(), page, page_size))
    }

    async fn subcategories(
        &self,
        category: CategoryId,
        page: u64,
        page_size: u64,
    ) -> Result<Page<SubCategory>> {
        let inner = self.inner.read().await;
        let matching: Vec<_> = inner
            .subcategories
            .iter()
            .filter(|s| s.category_id == category)
            .cloned()
            .collect();
        Ok(page_of(matching, page, page_size))
    }

    async fn products(
        &self,
        subcategory: SubCategoryId,
        page: u64,
        page_size: u64,
    ) -> Result<Page<Product>> {
        let inner = self.inner.read().await;
        let matching: Vec<_> = inner
            .products
            .iter()
            .filter(|p| p.subcategory_id == subcategory)
            .cloned()
            .collect();
        Ok(page_of(matching, page, page_size))
    }

    async fn product(&self, id: ProductId) -> Result<Option<Product>> {
        let inner = self.inner.read().await;
        Ok(inner.products.iter().find(|p| p.id == id).cloned())
    }

    async fn subcategory(&self, id: SubCategoryId) -> Result<Option<SubCategory>> {
        let inner = self.inner.read().await;
        Ok(inner.subcategories.iter().find(|s| s.id == id).cloned())
    }

    async fn add_to_cart(
        &self,
        user: UserId,
        product: ProductId,
        delta: i64,
    ) -> Result<CartMutation> {
        let mut inner = self.inner.write().await;
        if !inner.products.iter().any(|p| p.id == product) {
            return Err(StoreError::Constraint(format!(
                "product {product} does not exist"
            )));
        }

        let lines = inner.carts.entry(user).or_default();
        let current = lines.get(&product).copied().map_or(0, i64::from);
        let next = current + delta;

        let mutation = if next < 1 {
            lines.remove(&product);
            CartMutation::Removed
        } else {
            let quantity = u32::try_from(next)
                .map_err(|_| StoreError::Constraint("cart quantity overflow".to_string()))?;
            lines.insert(product, quantity);
            CartMutation::Updated { quantity }
        };

        if inner.carts.get(&user).is_some_and(BTreeMap::is_empty) {
            inner.carts.remove(&user);
        }
        Ok(mutation)
    }

    async fn remove_cart_line(&self, user: UserId, product: ProductId) -> Result<()> {
        let mut inner = self.inner.write().await;
        if let Some(lines) = inner.carts.get_mut(&user) {
            lines.remove(&product);
            if lines.is_empty() {
                inner.carts.remove(&user);
            }
        }
        Ok(())
    }

    async fn cart_lines(&self, user: UserId) -> Result<Vec<CartLine>> {
        let inner = self.inner.read().await;
        lines_of(&inner, user)
    }

    async fn cart_totals(&self, user: UserId) -> Result<CartTotals> {
        let lines = self.cart_lines(user).await?;
        Ok(CartTotals::from_lines(&lines))
    }

    async fn create_order_from_cart(&self, user: UserId, address: &str) -> Result<Option<Order>> {
        // One write lock for the whole snapshot-and-delete: reading the
        // lines outside it would let a concurrent add land a line that the
        // cart deletion below silently destroys.
        let mut inner = self.inner.write().await;
        let lines = lines_of(&inner, user)?;

        if lines.is_empty() {
            inner.carts.remove(&user);
            return Ok(None);
        }

        let order_lines: Vec<OrderLine> = lines
            .iter()
            .map(|l| OrderLine {
                product_id: l.product.id,
                product_name: l.product.name.clone(),
                quantity: l.quantity,
                unit_price: l.product.price,
            })
            .collect();
        let total: Money = order_lines.iter().map(OrderLine::line_total).sum();

        inner.next_order += 1;
        let order = Order {
            id: OrderId::new(inner.next_order),
            user_id: user,
            address: address.to_string(),
            total,
            payment_id: None,
            is_paid: false,
            settled_via: None,
            created_at: Utc::now(),
            lines: order_lines,
        };
        inner.orders.push(order.clone());
        inner.carts.remove(&user);
        Ok(Some(order))
    }

    async fn order_for_user(&self, order: OrderId, user: UserId) -> Result<Option<Order>> {
        let inner = self.inner.read().await;
        Ok(inner
            .orders
            .iter()
            .find(|o| o.id == order && o.user_id == user)
            .cloned())
    }

    async fn set_payment_intent(&self, order: OrderId, intent_id: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        if let Some(o) = inner.orders.iter_mut().find(|o| o.id == order) {
            o.payment_id = Some(intent_id.to_string());
        }
        Ok(())
    }

    async fn mark_paid(&self, order: OrderId, settlement: Settlement) -> Result<bool> {
        let mut inner = self.inner.write().await;
        match inner.orders.iter_mut().find(|o| o.id == order) {
            Some(o) if !o.is_paid => {
                o.is_paid = true;
                o.settled_via = Some(settlement);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
