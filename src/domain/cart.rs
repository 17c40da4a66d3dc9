//! Carts as submitted by callers and their priced form.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ids::DrinkId;

/// One line of a caller-supplied cart.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct CartLine {
    /// The drink being ordered.
    pub drink_id: DrinkId,
    /// How many. Must be positive.
    pub quantity: u32,
}

/// A caller-supplied list of (drink, quantity) pairs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct Cart {
    /// The cart lines. Must be non-empty to price.
    pub lines: Vec<CartLine>,
}

/// A cart line with its unit price resolved from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    /// The drink being ordered.
    pub drink_id: DrinkId,
    /// Drink name at pricing time (for receipts and audit summaries).
    pub drink_name: String,
    /// How many.
    pub quantity: u32,
    /// Unit price captured at pricing time.
    pub unit_price: Decimal,
}

/// The output of the pricing engine: resolved lines and their total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedCart {
    /// Sum of `unit_price × quantity` over all lines.
    pub total: Decimal,
    /// The resolved lines, in cart order.
    pub lines: Vec<PricedLine>,
}

impl PricedCart {
    /// Human-readable item summary ("Name x2, Name x1").
    #[must_use]
    pub fn items_summary(&self) -> String {
        self.lines
            .iter()
            .map(|line| format!("{} x{}", line.drink_name, line.quantity))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
