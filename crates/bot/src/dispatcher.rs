//! Event dispatch: classifies every inbound event into exactly one handler
//! and converts handler failures into user alerts.

use std::sync::Arc;

use checkout::{CheckoutWorkflow, PaymentGateway, PaymentReconciler, SessionStore};
use domain::User;
use store::ShopStore;

use crate::config::Config;
use crate::error::{BotError, Result};
use crate::event::{Action, Command, Inbound, Incoming, RenderTarget};
use crate::quantity::QuantityStore;
use crate::transport::{Messenger, Screen, TransportError};

/// Routes inbound events to handlers and screens back to the transport.
///
/// One instance serves every user; per-event failures never escape
/// [`Dispatcher::dispatch`], so no user's error can affect another's
/// session.
pub struct Dispatcher<S, P, M> {
    pub(crate) store: Arc<S>,
    pub(crate) workflow: CheckoutWorkflow<S, P>,
    pub(crate) reconciler: PaymentReconciler<S, P>,
    pub(crate) messenger: Arc<M>,
    pub(crate) quantities: Arc<dyn QuantityStore>,
    pub(crate) page_size: u64,
    pub(crate) manual_settlement: bool,
}

impl<S, P, M> Dispatcher<S, P, M>
where
    S: ShopStore,
    P: PaymentGateway,
    M: Messenger,
{
    pub fn new(
        store: Arc<S>,
        gateway: Arc<P>,
        messenger: Arc<M>,
        sessions: Arc<dyn SessionStore>,
        quantities: Arc<dyn QuantityStore>,
        config: &Config,
    ) -> Self {
        let workflow = CheckoutWorkflow::new(
            store.clone(),
            gateway.clone(),
            sessions,
            config.currency.clone(),
        );
        let reconciler = PaymentReconciler::new(store.clone(), gateway);
        Self {
            store,
            workflow,
            reconciler,
            messenger,
            quantities,
            page_size: config.page_size,
            manual_settlement: config.manual_settlement,
        }
    }

    /// Handles one inbound event. Never returns an error: failures are
    /// logged and surfaced to the user as an alert.
    #[tracing::instrument(skip(self, incoming), fields(user = %incoming.user))]
    pub async fn dispatch(&self, incoming: Incoming) {
        metrics::counter!("bot_events_total").increment(1);

        if let Err(err) = self.route(&incoming).await {
            tracing::warn!(user = %incoming.user, error = %err, "handler failed");
            metrics::counter!("bot_handler_failures_total").increment(1);
            if let Err(alert_err) = self
                .messenger
                .alert(incoming.target.chat(), &err.user_message())
                .await
            {
                tracing::error!(error = %alert_err, "failed to deliver alert");
            }
        }
    }

    async fn route(&self, incoming: &Incoming) -> Result<()> {
        let user = self
            .store
            .upsert_user(incoming.user, incoming.profile.clone())
            .await?;

        match &incoming.event {
            Inbound::Command(command) => self.handle_command(&user, *command, incoming).await,
            Inbound::Action(action) => self.handle_action(&user, *action, incoming).await,
            Inbound::FreeText(text) => self.handle_free_text(&user, text, incoming).await,
        }
    }

    async fn handle_command(
        &self,
        user: &User,
        command: Command,
        incoming: &Incoming,
    ) -> Result<()> {
        match command {
            Command::Start => self.show_main_menu(user, incoming).await,
            Command::Catalog => self.show_categories(1, incoming).await,
            Command::Cart => self.show_cart(user, incoming).await,
        }
    }

    async fn handle_action(&self, user: &User, action: Action, incoming: &Incoming) -> Result<()> {
        match action {
            Action::Noop => Ok(()),
            Action::MainMenu => self.show_main_menu(user, incoming).await,
            Action::CategoryPage { page } => self.show_categories(page, incoming).await,
            Action::Category { id, page } | Action::SubcategoryPage { category: id, page } => {
                self.show_subcategories(id, page, incoming).await
            }
            Action::Subcategory { id, page }
            | Action::ProductPage {
                subcategory: id,
                page,
            } => self.show_products(id, page, incoming).await,
            Action::Product { id } => self.open_product(user, id, incoming).await,
            Action::Increment { product } => self.adjust_quantity(user, product, 1, incoming).await,
            Action::Decrement { product } => {
                self.adjust_quantity(user, product, -1, incoming).await
            }
            Action::AddToCart { product, quantity } => {
                self.add_to_cart(user, product, quantity, incoming).await
            }
            Action::RemoveItem { product } => self.remove_item(user, product, incoming).await,
            Action::ShowCart => self.show_cart(user, incoming).await,
            Action::Checkout => self.begin_checkout(user, incoming).await,
            Action::CheckPayment { order } => self.check_payment(user, order, incoming).await,
            Action::TestPayment { order } => self.test_payment(user, order, incoming).await,
            Action::PaymentNotAvailable => self.payment_not_available(incoming).await,
        }
    }

    /// Delivers a screen to the event's render target. The transport's
    /// "content unchanged" outcome is success; any other edit failure falls
    /// back to delete-and-resend so the user is never left without a
    /// response.
    pub(crate) async fn present(&self, target: RenderTarget, screen: &Screen) -> Result<()> {
        let (message, result) = match target {
            RenderTarget::New(chat) => {
                self.messenger.send(chat, screen).await?;
                return Ok(());
            }
            RenderTarget::EditText(message) => {
                (message, self.messenger.edit_text(message, screen).await)
            }
            RenderTarget::EditCaption(message) => {
                (message, self.messenger.edit_caption(message, screen).await)
            }
        };

        match result {
            Ok(()) | Err(TransportError::ContentUnchanged) => Ok(()),
            Err(err) => {
                tracing::debug!(error = %err, "edit failed, falling back to resend");
                self.messenger.delete(message).await.ok();
                self.messenger.send(message.chat, screen).await?;
                Ok(())
            }
        }
    }

    /// Shows a short alert on the event's conversation.
    pub(crate) async fn notify(&self, incoming: &Incoming, text: &str) -> Result<()> {
        self.messenger.alert(incoming.target.chat(), text).await?;
        Ok(())
    }

    pub(crate) fn not_found(what: &'static str) -> BotError {
        BotError::NotFound(what)
    }
}
