//! Persistent-store capability.
//!
//! The workflow engine consumes one storage collaborator: the [`ShopStore`]
//! trait, covering users, catalog reads, cart mutations, and the order
//! lifecycle. Two implementations are provided:
//!
//! - [`InMemoryShopStore`] for tests and local runs,
//! - [`PostgresShopStore`] for production.
//!
//! All cart mutations serialize at the storage layer (transactional upsert
//! in PostgreSQL, a single writer lock in memory) — the engine never relies
//! on in-process locking for cart state.

mod error;
mod memory;
mod postgres;
mod shop;

pub use error::{Result, StoreError};
pub use memory::InMemoryShopStore;
pub use postgres::PostgresShopStore;
pub use shop::ShopStore;
