//! Payment polling and settlement controls.

use checkout::{PaymentCheck, PaymentGateway};
use common::OrderId;
use domain::User;
use store::ShopStore;

use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::event::Incoming;
use crate::render;
use crate::transport::Messenger;

const PROVIDER_DOWN: &str = "Payment is not available right now, please try again later.";

impl<S, P, M> Dispatcher<S, P, M>
where
    S: ShopStore,
    P: PaymentGateway,
    M: Messenger,
{
    pub(crate) async fn check_payment(
        &self,
        user: &User,
        order: OrderId,
        incoming: &Incoming,
    ) -> Result<()> {
        match self.reconciler.check(user.id, order).await? {
            PaymentCheck::Confirmed => self.notify(incoming, "Payment received ✅").await,
            PaymentCheck::AlreadyPaid => self.notify(incoming, "This order is already paid.").await,
            PaymentCheck::Unavailable => self.notify(incoming, PROVIDER_DOWN).await,
            PaymentCheck::NotYetPaid => self.handle_not_yet_paid(user, order, incoming).await,
        }
    }

    /// Not paid: when the order never got an intent (creation failed at
    /// checkout) this retries intent creation and re-renders the
    /// confirmation with a live pay link; otherwise it is just not paid yet.
    async fn handle_not_yet_paid(
        &self,
        user: &User,
        order: OrderId,
        incoming: &Incoming,
    ) -> Result<()> {
        let loaded = self
            .store
            .order_for_user(order, user.id)
            .await?
            .ok_or_else(|| Self::not_found("Order"))?;

        if loaded.payment_id.is_some() {
            return self.notify(incoming, "Not paid yet.").await;
        }

        // Propagating a gateway failure alerts the provider-down message.
        let intent = self.workflow.ensure_intent(user.id, order).await?;
        let screen = render::order_confirmation(
            &loaded,
            intent.confirmation_url.as_deref(),
            self.manual_settlement,
        );
        self.present(incoming.target, &screen).await
    }

    pub(crate) async fn test_payment(
        &self,
        user: &User,
        order: OrderId,
        incoming: &Incoming,
    ) -> Result<()> {
        if !self.manual_settlement {
            return self.notify(incoming, "Manual settlement is not enabled.").await;
        }

        match self.reconciler.settle_manually(user.id, order).await? {
            PaymentCheck::AlreadyPaid => self.notify(incoming, "This order is already paid.").await,
            _ => self.notify(incoming, "Order marked as paid ✅").await,
        }
    }

    pub(crate) async fn payment_not_available(&self, incoming: &Incoming) -> Result<()> {
        self.notify(incoming, PROVIDER_DOWN).await
    }
}
