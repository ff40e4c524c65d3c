//! Product detail screen and the quantity selector.

use checkout::PaymentGateway;
use common::ProductId;
use domain::User;
use store::ShopStore;

use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::event::Incoming;
use crate::render;
use crate::transport::Messenger;

impl<S, P, M> Dispatcher<S, P, M>
where
    S: ShopStore,
    P: PaymentGateway,
    M: Messenger,
{
    /// Opens the detail screen, starting the quantity selection over at 1.
    pub(crate) async fn open_product(
        &self,
        user: &User,
        product: ProductId,
        incoming: &Incoming,
    ) -> Result<()> {
        let product = self
            .store
            .product(product)
            .await?
            .ok_or_else(|| Self::not_found("Product"))?;
        self.quantities.reset(user.id, product.id);

        let totals = self.store.cart_totals(user.id).await?;
        let screen = render::product_detail(&product, 1, &totals);
        self.present(incoming.target, &screen).await
    }

    /// Handles the −/+ selector taps. The cart is untouched until the user
    /// commits with add-to-cart; a decrement already clamped at 1 re-renders
    /// identically and the transport's unchanged outcome absorbs it.
    pub(crate) async fn adjust_quantity(
        &self,
        user: &User,
        product: ProductId,
        delta: i32,
        incoming: &Incoming,
    ) -> Result<()> {
        let product = self
            .store
            .product(product)
            .await?
            .ok_or_else(|| Self::not_found("Product"))?;

        let quantity = if delta > 0 {
            self.quantities.increment(user.id, product.id)
        } else {
            self.quantities.decrement(user.id, product.id)
        };

        let totals = self.store.cart_totals(user.id).await?;
        let screen = render::product_detail(&product, quantity, &totals);
        self.present(incoming.target, &screen).await
    }

    /// Commits the dialed-in quantity to the cart and resets the selector.
    pub(crate) async fn add_to_cart(
        &self,
        user: &User,
        product: ProductId,
        quantity: u32,
        incoming: &Incoming,
    ) -> Result<()> {
        let product = self
            .store
            .product(product)
            .await?
            .ok_or_else(|| Self::not_found("Product"))?;

        let quantity = quantity.max(1);
        self.store
            .add_to_cart(user.id, product.id, i64::from(quantity))
            .await?;
        self.quantities.reset(user.id, product.id);
        metrics::counter!("cart_adds_total").increment(1);

        self.notify(incoming, "Added to cart ✅").await?;

        let totals = self.store.cart_totals(user.id).await?;
        let screen = render::product_detail(&product, 1, &totals);
        self.present(incoming.target, &screen).await
    }
}
