use checkout::CheckoutError;
use thiserror::Error;

use crate::event::ActionParseError;
use crate::transport::TransportError;

/// Errors caught at the dispatch boundary.
///
/// Nothing here is fatal to the process; every variant maps to a short
/// user-visible alert via [`BotError::user_message`].
#[derive(Debug, Error)]
pub enum BotError {
    /// An inbound action payload could not be decoded.
    #[error(transparent)]
    Action(#[from] ActionParseError),

    /// A checkout workflow error occurred.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// A store error occurred.
    #[error(transparent)]
    Store(#[from] store::StoreError),

    /// The transport rejected a delivery.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),
}

impl BotError {
    /// The short alert text shown to the user when this error reaches the
    /// dispatch boundary.
    pub fn user_message(&self) -> String {
        match self {
            BotError::Action(_) => "I didn't understand that action.".to_string(),
            BotError::Checkout(CheckoutError::EmptyCart) => "Your cart is empty.".to_string(),
            BotError::Checkout(CheckoutError::OrderNotFound) => "Order not found.".to_string(),
            BotError::Checkout(CheckoutError::Gateway(_)) => {
                "Payment is not available right now, please try again later.".to_string()
            }
            BotError::NotFound(what) => format!("{what} not found."),
            BotError::Checkout(CheckoutError::Store(_))
            | BotError::Store(_)
            | BotError::Transport(_) => "Something went wrong, please try again.".to_string(),
        }
    }
}

/// Result type for dispatch handlers.
pub type Result<T> = std::result::Result<T, BotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cart_is_reported_distinctly() {
        let err = BotError::from(CheckoutError::EmptyCart);
        assert_eq!(err.user_message(), "Your cart is empty.");
    }

    #[test]
    fn malformed_actions_get_their_own_message() {
        let err = BotError::from("bogus".parse::<crate::event::Action>().unwrap_err());
        assert!(err.user_message().contains("didn't understand"));
    }
}
