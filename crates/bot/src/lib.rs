//! Event dispatch layer for the storefront bot.
//!
//! Inbound chat events are modeled as [`event::Incoming`] values carrying a
//! tagged [`event::Inbound`] union and an explicit render target. The
//! [`dispatcher::Dispatcher`] classifies each event into exactly one
//! handler, which reads or mutates the store and checkout workflow and then
//! asks [`render`] for the next screen. All transport I/O goes through the
//! [`transport::Messenger`] capability.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod event;
mod handlers;
pub mod quantity;
pub mod render;
pub mod transport;
