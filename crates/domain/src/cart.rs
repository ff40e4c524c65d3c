//! Cart lines and totals.

use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::money::Money;

/// One line of a user's cart: a product and a positive quantity.
///
/// At most one line exists per (cart, product); repeated adds merge by
/// summing quantity. A line never persists with quantity zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: Product,
    pub quantity: u32,
}

impl CartLine {
    /// Returns the total price for this line (unit price × quantity).
    pub fn line_total(&self) -> Money {
        self.product.price.multiply(self.quantity)
    }
}

/// Aggregate view of a cart: item count and monetary total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    /// Sum of line quantities.
    pub quantity: u32,
    /// Sum of line totals.
    pub total: Money,
}

impl CartTotals {
    /// Zero totals, reported for users without a cart.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Computes totals over a set of cart lines.
    pub fn from_lines(lines: &[CartLine]) -> Self {
        Self {
            quantity: lines.iter().map(|l| l.quantity).sum(),
            total: lines.iter().map(CartLine::line_total).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.quantity == 0
    }
}

/// Result of a cart upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartMutation {
    /// The line now holds the given quantity.
    Updated { quantity: u32 },
    /// The mutation drove the quantity below one; the line was deleted.
    Removed,
}
