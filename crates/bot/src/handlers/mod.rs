//! Per-concern handler implementations for [`crate::dispatcher::Dispatcher`].

mod cart;
mod catalog;
mod checkout_flow;
mod payments;
mod product;
mod start;
