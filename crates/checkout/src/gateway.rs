//! Payment gateway trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::OrderId;
use domain::Money;
use thiserror::Error;
use uuid::Uuid;

/// Errors reported by a payment provider.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The provider could not be reached or returned a transport error.
    #[error("payment provider unavailable: {0}")]
    Unavailable(String),

    /// The provider does not know the given intent id.
    #[error("unknown payment intent {0:?}")]
    UnknownIntent(String),
}

/// Status of a payment intent as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentStatus {
    /// Created but not yet paid.
    Pending,
    /// The provider confirmed the payment.
    Succeeded,
    /// Any other provider-specific status (canceled, expired, ...).
    Other(String),
}

/// A payment intent created at the provider.
#[derive(Debug, Clone)]
pub struct PaymentIntent {
    /// Provider-assigned intent id.
    pub id: String,
    /// URL the user opens to complete the payment, when the provider
    /// issues one.
    pub confirmation_url: Option<String>,
}

/// Trait for payment provider operations.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates a payment intent for an order. `currency` is an ISO-4217
    /// code such as "USD".
    async fn create_intent(
        &self,
        order: OrderId,
        amount: Money,
        currency: &str,
    ) -> Result<PaymentIntent, GatewayError>;

    /// Fetches the current status of a previously created intent.
    async fn intent_status(&self, intent_id: &str) -> Result<PaymentStatus, GatewayError>;
}

#[derive(Debug, Default)]
struct InMemoryGatewayState {
    intents: HashMap<String, (OrderId, Money, PaymentStatus)>,
    fail_on_create: bool,
    fail_on_status: bool,
}

/// In-memory payment gateway for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentGateway {
    state: Arc<RwLock<InMemoryGatewayState>>,
}

impl InMemoryPaymentGateway {
    /// Creates a new in-memory payment gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the gateway to fail intent creation.
    pub fn set_fail_on_create(&self, fail: bool) {
        self.state.write().unwrap().fail_on_create = fail;
    }

    /// Configures the gateway to fail status lookups.
    pub fn set_fail_on_status(&self, fail: bool) {
        self.state.write().unwrap().fail_on_status = fail;
    }

    /// Marks an intent as succeeded, as if the user had paid.
    pub fn settle(&self, intent_id: &str) {
        if let Some(entry) = self.state.write().unwrap().intents.get_mut(intent_id) {
            entry.2 = PaymentStatus::Succeeded;
        }
    }

    /// Overrides an intent's status.
    pub fn set_status(&self, intent_id: &str, status: PaymentStatus) {
        if let Some(entry) = self.state.write().unwrap().intents.get_mut(intent_id) {
            entry.2 = status;
        }
    }

    /// Returns the number of intents ever created.
    pub fn intent_count(&self) -> usize {
        self.state.read().unwrap().intents.len()
    }
}

#[async_trait]
impl PaymentGateway for InMemoryPaymentGateway {
    async fn create_intent(
        &self,
        order: OrderId,
        amount: Money,
        _currency: &str,
    ) -> Result<PaymentIntent, GatewayError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_create {
            return Err(GatewayError::Unavailable("provider down".to_string()));
        }

        let id = format!("PAY-{}", Uuid::new_v4());
        state
            .intents
            .insert(id.clone(), (order, amount, PaymentStatus::Pending));

        Ok(PaymentIntent {
            confirmation_url: Some(format!("https://pay.example/{id}")),
            id,
        })
    }

    async fn intent_status(&self, intent_id: &str) -> Result<PaymentStatus, GatewayError> {
        let state = self.state.read().unwrap();

        if state.fail_on_status {
            return Err(GatewayError::Unavailable("provider down".to_string()));
        }

        state
            .intents
            .get(intent_id)
            .map(|(_, _, status)| status.clone())
            .ok_or_else(|| GatewayError::UnknownIntent(intent_id.to_string()))
    }
}
