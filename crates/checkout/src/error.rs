use thiserror::Error;

/// Errors that can occur during the checkout workflow.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The user submitted an address without a non-empty cart to order.
    #[error("cart is empty")]
    EmptyCart,

    /// The referenced order does not exist or belongs to another user.
    #[error("order not found")]
    OrderNotFound,

    /// The payment provider could not be reached or rejected the request.
    #[error("payment gateway: {0}")]
    Gateway(#[from] crate::gateway::GatewayError),

    /// A store error occurred.
    #[error(transparent)]
    Store(#[from] store::StoreError),
}

/// Result type for checkout operations.
pub type Result<T> = std::result::Result<T, CheckoutError>;
