use async_trait::async_trait;
use common::{CategoryId, OrderId, ProductId, SubCategoryId, UserId};
use domain::{
    CartLine, CartMutation, CartTotals, Category, Order, Page, Product, Settlement, SubCategory,
    User, UserProfile,
};

use crate::Result;

/// Core trait for shop store implementations.
///
/// All implementations must be thread-safe (Send + Sync) and must
/// serialize cart mutations per (user, product) internally; callers issue
/// concurrent requests for the same user without external locking.
#[async_trait]
pub trait ShopStore: Send + Sync {
    /// Creates the user on first contact, or refreshes profile fields and
    /// `last_seen`. Idempotent.
    async fn upsert_user(&self, id: UserId, profile: UserProfile) -> Result<User>;

    /// Returns one page of categories ordered by id ascending.
    ///
    /// An out-of-range page yields an empty slice with the correct total.
    async fn categories(&self, page: u64, page_size: u64) -> Result<Page<Category>>;

    /// Returns one page of a category's subcategories, ordered by id.
    async fn subcategories(
        &self,
        category: CategoryId,
        page: u64,
        page_size: u64,
    ) -> Result<Page<SubCategory>>;

    /// Returns one page of a subcategory's products, ordered by id.
    async fn products(
        &self,
        subcategory: SubCategoryId,
        page: u64,
        page_size: u64,
    ) -> Result<Page<Product>>;

    /// Looks up a single product.
    async fn product(&self, id: ProductId) -> Result<Option<Product>>;

    /// Looks up a single subcategory (used for back navigation).
    async fn subcategory(&self, id: SubCategoryId) -> Result<Option<SubCategory>>;

    /// Applies `delta` to the user's cart line for `product`, creating the
    /// cart and the line as needed (get-or-create; at most one live cart
    /// per user). Repeated adds merge by summing quantity. A resulting
    /// quantity below one deletes the line, and a cart left without lines
    /// is deleted in the same transaction.
    ///
    /// The product must exist — a caller precondition, not a recoverable
    /// outcome.
    async fn add_to_cart(
        &self,
        user: UserId,
        product: ProductId,
        delta: i64,
    ) -> Result<CartMutation>;

    /// Deletes the cart line unconditionally; cascades to cart deletion if
    /// the cart is now empty. A missing line is a no-op.
    async fn remove_cart_line(&self, user: UserId, product: ProductId) -> Result<()>;

    /// Lists the user's cart lines ordered by product id. Empty if the
    /// user has no cart.
    async fn cart_lines(&self, user: UserId) -> Result<Vec<CartLine>>;

    /// Returns item-count and monetary totals; zero/zero without a cart.
    async fn cart_totals(&self, user: UserId) -> Result<CartTotals>;

    /// Atomically materializes an order from the user's cart: snapshots
    /// every line (product reference, name, unit price, quantity), fixes
    /// the total, and deletes the cart — all in one transaction.
    ///
    /// Returns `None` when the user has no cart or the cart is empty; no
    /// order is created in that case.
    async fn create_order_from_cart(&self, user: UserId, address: &str) -> Result<Option<Order>>;

    /// Loads an order owned by the given user.
    async fn order_for_user(&self, order: OrderId, user: UserId) -> Result<Option<Order>>;

    /// Stores the payment-intent id returned by the payment provider.
    async fn set_payment_intent(&self, order: OrderId, intent_id: &str) -> Result<()>;

    /// Marks an order paid, recording how it was settled. Idempotent:
    /// returns `true` if the order transitioned to paid now, `false` if it
    /// was already paid (or does not exist) — never an error.
    async fn mark_paid(&self, order: OrderId, settlement: Settlement) -> Result<bool>;
}
