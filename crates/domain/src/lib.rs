//! Domain model for the conversational storefront.
//!
//! Pure types and arithmetic only: money, catalog entities, cart lines,
//! order snapshots, page math, and the checkout session state machine.
//! Persistence and transport live in the `store` and `bot` crates.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod money;
pub mod order;
pub mod pager;
pub mod user;

pub use cart::{CartLine, CartMutation, CartTotals};
pub use catalog::{Category, Product, SubCategory};
pub use checkout::CheckoutState;
pub use money::Money;
pub use order::{Order, OrderLine, Settlement};
pub use pager::Page;
pub use user::{User, UserProfile};
