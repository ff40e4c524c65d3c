//! The checkout workflow: address collection and order creation.

use std::sync::Arc;

use common::{OrderId, UserId};
use domain::{CheckoutState, Order};
use store::ShopStore;

use crate::{
    CheckoutError, Result,
    gateway::{PaymentGateway, PaymentIntent},
    session::SessionStore,
};

/// Outcome of a completed address submission.
#[derive(Debug)]
pub struct CheckoutOutcome {
    /// The order created from the cart snapshot.
    pub order: Order,
    /// The payment intent, when the provider accepted the request. `None`
    /// means the order exists unpaid and without an intent; one can be
    /// created later with [`CheckoutWorkflow::ensure_intent`].
    pub intent: Option<PaymentIntent>,
}

/// Drives a user's checkout conversation.
///
/// Order creation is atomic at the store; intent creation happens after
/// the order exists, and its failure never rolls the order back.
pub struct CheckoutWorkflow<S, P> {
    store: Arc<S>,
    gateway: Arc<P>,
    sessions: Arc<dyn SessionStore>,
    currency: String,
}

impl<S, P> CheckoutWorkflow<S, P>
where
    S: ShopStore,
    P: PaymentGateway,
{
    pub fn new(
        store: Arc<S>,
        gateway: Arc<P>,
        sessions: Arc<dyn SessionStore>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            store,
            gateway,
            sessions,
            currency: currency.into(),
        }
    }

    /// Returns the user's current checkout state.
    pub fn state(&self, user: UserId) -> CheckoutState {
        self.sessions.get(user)
    }

    /// Starts a checkout: verifies the cart is non-empty and moves the
    /// user to address collection. Re-entry simply overwrites any stale
    /// session.
    #[tracing::instrument(skip(self))]
    pub async fn begin(&self, user: UserId) -> Result<()> {
        let totals = self.store.cart_totals(user).await?;
        if totals.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        self.sessions.set(user, CheckoutState::AwaitingAddress);
        metrics::counter!("checkout_started_total").increment(1);
        Ok(())
    }

    /// Consumes the submitted address: snapshots the cart into an order,
    /// ends the session, and asks the provider for a payment intent.
    ///
    /// The session ends whether or not an order could be created, so a
    /// duplicate submission races harmlessly into [`CheckoutError::EmptyCart`].
    /// A gateway failure leaves the order unpaid with no intent attached.
    #[tracing::instrument(skip(self, address))]
    pub async fn submit_address(&self, user: UserId, address: &str) -> Result<CheckoutOutcome> {
        self.sessions.clear(user);

        let Some(order) = self.store.create_order_from_cart(user, address).await? else {
            return Err(CheckoutError::EmptyCart);
        };
        metrics::counter!("orders_created_total").increment(1);
        metrics::histogram!("order_total_cents").record(order.total.cents() as f64);

        let intent = match self
            .gateway
            .create_intent(order.id, order.total, &self.currency)
            .await
        {
            Ok(intent) => {
                self.store.set_payment_intent(order.id, &intent.id).await?;
                Some(intent)
            }
            Err(err) => {
                tracing::warn!(order_id = %order.id, error = %err, "intent creation failed");
                metrics::counter!("payment_intent_failures_total").increment(1);
                None
            }
        };

        Ok(CheckoutOutcome { order, intent })
    }

    /// Returns the order's payment intent, creating one at the provider
    /// if the order has none yet (intent creation failed at checkout).
    #[tracing::instrument(skip(self))]
    pub async fn ensure_intent(&self, user: UserId, order: OrderId) -> Result<PaymentIntent> {
        let order = self
            .store
            .order_for_user(order, user)
            .await?
            .ok_or(CheckoutError::OrderNotFound)?;

        if let Some(id) = order.payment_id {
            // Already attached; the provider URL is only issued once.
            return Ok(PaymentIntent {
                id,
                confirmation_url: None,
            });
        }

        let intent = self
            .gateway
            .create_intent(order.id, order.total, &self.currency)
            .await?;
        self.store.set_payment_intent(order.id, &intent.id).await?;
        Ok(intent)
    }

    /// Abandons the checkout conversation without touching the cart.
    pub fn abandon(&self, user: UserId) {
        self.sessions.clear(user);
    }
}
