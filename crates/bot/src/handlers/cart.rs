//! Cart screen and line removal.

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
    pub(crate) async fn show_cart(&self, user: &User, incoming: &Incoming) -> Result<()> {
        let lines = self.store.cart_lines(user.id).await?;
        let totals = self.store.cart_totals(user.id).await?;
        self.present(incoming.target, &render::cart(&lines, &totals))
            .await
    }

    pub(crate) async fn remove_item(
        &self,
        user: &User,
        product: ProductId,
        incoming: &Incoming,
    ) -> Result<()> {
        self.store.remove_cart_line(user.id, product).await?;
        self.show_cart(user, incoming).await
    }
}
