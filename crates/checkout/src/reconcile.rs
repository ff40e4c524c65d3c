//! Payment reconciliation: provider polling and manual settlement.

use std::sync::Arc;

use common::{OrderId, UserId};
use domain::Settlement;
use store::ShopStore;

use crate::{
    CheckoutError, Result,
    gateway::{PaymentGateway, PaymentStatus},
};

/// Outcome of polling an order's payment status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentCheck {
    /// The provider reported success and the order was marked paid now.
    Confirmed,
    /// The order was already paid; nothing changed.
    AlreadyPaid,
    /// The payment has not gone through (or no intent exists yet).
    NotYetPaid,
    /// The provider could not be reached; try again later.
    Unavailable,
}

/// Reconciles order payment state against the provider.
pub struct PaymentReconciler<S, P> {
    store: Arc<S>,
    gateway: Arc<P>,
}

impl<S, P> PaymentReconciler<S, P>
where
    S: ShopStore,
    P: PaymentGateway,
{
    pub fn new(store: Arc<S>, gateway: Arc<P>) -> Self {
        Self { store, gateway }
    }

    /// Polls the provider for an order's payment and marks it paid if the
    /// intent succeeded. Safe to call any number of times.
    #[tracing::instrument(skip(self))]
    pub async fn check(&self, user: UserId, order: OrderId) -> Result<PaymentCheck> {
        let order = self
            .store
            .order_for_user(order, user)
            .await?
            .ok_or(CheckoutError::OrderNotFound)?;

        if order.is_paid {
            return Ok(PaymentCheck::AlreadyPaid);
        }
        let Some(intent_id) = &order.payment_id else {
            return Ok(PaymentCheck::NotYetPaid);
        };

        match self.gateway.intent_status(intent_id).await {
            Ok(PaymentStatus::Succeeded) => {
                // A concurrent check may have won the transition.
                if self.store.mark_paid(order.id, Settlement::Provider).await? {
                    metrics::counter!("payments_confirmed_total").increment(1);
                    Ok(PaymentCheck::Confirmed)
                } else {
                    Ok(PaymentCheck::AlreadyPaid)
                }
            }
            Ok(PaymentStatus::Pending | PaymentStatus::Other(_)) => Ok(PaymentCheck::NotYetPaid),
            Err(err) => {
                tracing::warn!(order_id = %order.id, error = %err, "status poll failed");
                Ok(PaymentCheck::Unavailable)
            }
        }
    }

    /// Marks an order paid without consulting the provider, recording the
    /// manual provenance. For operator/test use only; the caller gates
    /// access.
    #[tracing::instrument(skip(self))]
    pub async fn settle_manually(&self, user: UserId, order: OrderId) -> Result<PaymentCheck> {
        let order = self
            .store
            .order_for_user(order, user)
            .await?
            .ok_or(CheckoutError::OrderNotFound)?;

        if self.store.mark_paid(order.id, Settlement::Manual).await? {
            metrics::counter!("payments_settled_manually_total").increment(1);
            Ok(PaymentCheck::Confirmed)
        } else {
            Ok(PaymentCheck::AlreadyPaid)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::Money;
    use store::InMemoryShopStore;

    use crate::gateway::InMemoryPaymentGateway;

    async fn setup() -> (
        PaymentReconciler<InMemoryShopStore, InMemoryPaymentGateway>,
        Arc<InMemoryShopStore>,
        Arc<InMemoryPaymentGateway>,
        UserId,
        OrderId,
        String,
    ) {
        let store = Arc::new(InMemoryShopStore::new());
        let gateway = Arc::new(InMemoryPaymentGateway::new());

        let cat = store.seed_category("Drinks").await;
        let sub = store.seed_subcategory(cat.id, "Tea").await;
        let product = store
            .seed_product(sub.id, "Green", Money::from_units(100), None, None)
            .await;

        let user = UserId::new(7);
        store
            .upsert_user(user, domain::UserProfile::default())
            .await
            .unwrap();
        store.add_to_cart(user, product.id, 1).await.unwrap();
        let order = store
            .create_order_from_cart(user, "Main St 1")
            .await
            .unwrap()
            .unwrap();

        let intent = gateway
            .create_intent(order.id, order.total, "USD")
            .await
            .unwrap();
        store.set_payment_intent(order.id, &intent.id).await.unwrap();

        let reconciler = PaymentReconciler::new(store.clone(), gateway.clone());
        (reconciler, store, gateway, user, order.id, intent.id)
    }

    #[tokio::test]
    async fn pending_then_confirmed_then_already_paid() {
        let (reconciler, store, gateway, user, order, intent) = setup().await;

        assert_eq!(
            reconciler.check(user, order).await.unwrap(),
            PaymentCheck::NotYetPaid
        );

        gateway.settle(&intent);
        assert_eq!(
            reconciler.check(user, order).await.unwrap(),
            PaymentCheck::Confirmed
        );
        assert_eq!(
            reconciler.check(user, order).await.unwrap(),
            PaymentCheck::AlreadyPaid
        );

        let reloaded = store.order_for_user(order, user).await.unwrap().unwrap();
        assert_eq!(reloaded.settled_via, Some(Settlement::Provider));
    }

    #[tokio::test]
    async fn losing_the_paid_transition_reports_already_paid() {
        let (reconciler, store, gateway, user, order, intent) = setup().await;
        gateway.settle(&intent);

        // Another path settled the order first; this check's mark_paid is
        // a no-op and must not claim the confirmation.
        store.mark_paid(order, Settlement::Manual).await.unwrap();
        assert_eq!(
            reconciler.check(user, order).await.unwrap(),
            PaymentCheck::AlreadyPaid
        );

        let reloaded = store.order_for_user(order, user).await.unwrap().unwrap();
        assert_eq!(reloaded.settled_via, Some(Settlement::Manual));
    }

    #[tokio::test]
    async fn provider_outage_is_reported_not_raised() {
        let (reconciler, _, gateway, user, order, _) = setup().await;
        gateway.set_fail_on_status(true);

        assert_eq!(
            reconciler.check(user, order).await.unwrap(),
            PaymentCheck::Unavailable
        );
    }

    #[tokio::test]
    async fn order_without_intent_is_not_yet_paid() {
        let (reconciler, store, _, user, _, _) = setup().await;
        // An order whose intent creation failed has no intent attached.
        let cat = store.seed_category("More").await;
        let sub = store.seed_subcategory(cat.id, "Stuff").await;
        let product = store
            .seed_product(sub.id, "Thing", Money::from_units(10), None, None)
            .await;
        store.add_to_cart(user, product.id, 1).await.unwrap();
        let bare = store
            .create_order_from_cart(user, "addr")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            reconciler.check(user, bare.id).await.unwrap(),
            PaymentCheck::NotYetPaid
        );
    }

    #[tokio::test]
    async fn manual_settlement_records_provenance() {
        let (reconciler, store, _, user, order, _) = setup().await;

        assert_eq!(
            reconciler.settle_manually(user, order).await.unwrap(),
            PaymentCheck::Confirmed
        );
        assert_eq!(
            reconciler.settle_manually(user, order).await.unwrap(),
            PaymentCheck::AlreadyPaid
        );

        let reloaded = store.order_for_user(order, user).await.unwrap().unwrap();
        assert!(reloaded.is_paid);
        assert_eq!(reloaded.settled_via, Some(Settlement::Manual));
    }

    #[tokio::test]
    async fn unknown_order_is_an_error() {
        let (reconciler, _, _, user, _, _) = setup().await;
        let result = reconciler.check(user, OrderId::new(999)).await;
        assert!(matches!(result, Err(CheckoutError::OrderNotFound)));
    }
}
