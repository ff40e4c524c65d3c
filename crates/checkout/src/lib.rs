//! Checkout workflow and payment reconciliation.
//!
//! [`CheckoutWorkflow`] drives the address-collection conversation and
//! turns carts into orders; [`PaymentReconciler`] polls the provider and
//! settles orders. Both are generic over the [`store::ShopStore`] and
//! [`PaymentGateway`] capabilities so tests run entirely in memory.

mod error;
mod gateway;
mod reconcile;
mod session;
mod workflow;

pub use error::{CheckoutError, Result};
pub use gateway::{
    GatewayError, InMemoryPaymentGateway, PaymentGateway, PaymentIntent, PaymentStatus,
};
pub use reconcile::{PaymentCheck, PaymentReconciler};
pub use session::{InMemorySessionStore, SessionStore};
pub use workflow::{CheckoutOutcome, CheckoutWorkflow};
