//! Checkout conversation: begin, address submission, confirmation.

use checkout::PaymentGateway;
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
    pub(crate) async fn begin_checkout(&self, user: &User, incoming: &Incoming) -> Result<()> {
        self.workflow.begin(user.id).await?;
        self.present(incoming.target, &render::address_prompt())
            .await
    }

    /// Free text only matters while the user's session awaits an address;
    /// anything else is ignored so stray messages never trigger alerts.
    pub(crate) async fn handle_free_text(
        &self,
        user: &User,
        text: &str,
        incoming: &Incoming,
    ) -> Result<()> {
        if !self.workflow.state(user.id).is_awaiting_address() {
            tracing::debug!(user = %user.id, "ignoring free text outside checkout");
            return Ok(());
        }

        let outcome = self.workflow.submit_address(user.id, text.trim()).await?;
        let pay_url = outcome
            .intent
            .as_ref()
            .and_then(|intent| intent.confirmation_url.as_deref());
        let screen = render::order_confirmation(&outcome.order, pay_url, self.manual_settlement);
        self.present(incoming.target, &screen).await
    }
}
