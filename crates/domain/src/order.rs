//! Order snapshots.

use chrono::{DateTime, Utc};
use common::{OrderId, ProductId, UserId};
use serde::{Deserialize, Serialize};

use crate::money::Money;

/// How an order came to be marked paid.
///
/// Provider-confirmed payments and manual/test settlements must stay
/// distinguishable in the data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Settlement {
    /// The payment provider reported the intent as succeeded.
    Provider,
    /// Settled manually, without contacting the provider.
    Manual,
}

impl Settlement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Settlement::Provider => "provider",
            Settlement::Manual => "manual",
        }
    }

    /// Parses the database representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "provider" => Some(Settlement::Provider),
            "manual" => Some(Settlement::Manual),
            _ => None,
        }
    }
}

impl std::fmt::Display for Settlement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A line of an order: product reference and quantity copied from the
/// source cart line. The unit price is snapshotted too, so later product
/// price changes never alter an existing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Money,
}

impl OrderLine {
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// An immutable order snapshot created once per completed checkout.
///
/// `total` is fixed at creation time as the sum of line totals; it is
/// never recomputed from live product prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub address: String,
    pub total: Money,
    /// Payment-intent id from the provider; absent until an intent is
    /// successfully created.
    pub payment_id: Option<String>,
    pub is_paid: bool,
    /// Set when `is_paid` is true.
    pub settled_via: Option<Settlement>,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<OrderLine>,
}

impl Order {
    /// Recomputes the total from the snapshot lines. Equals `total` by
    /// construction; used as a consistency check in tests.
    pub fn lines_total(&self) -> Money {
        self.lines.iter().map(OrderLine::line_total).sum()
    }
}
