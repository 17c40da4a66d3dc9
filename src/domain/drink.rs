//! Catalog drinks.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ids::DrinkId;

/// A catalog entry. Created and toggled by admins; read by pricing.
///
/// Orders store a copy of the price at order time, never a reference, so
/// later price edits do not retroactively change historical totals.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Drink {
    /// Surrogate key.
    pub id: DrinkId,
    /// Display name.
    pub name: String,
    /// Current price in chips. Positive.
    pub price: Decimal,
    /// Optional category (e.g. "Cocktails").
    pub category: Option<String>,
    /// Whether the drink can currently be ordered.
    pub is_available: bool,
}

/// Point-in-time price lookup result from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrinkPrice {
    /// Display name (for receipts and audit summaries).
    pub name: String,
    /// Current unit price in chips.
    pub price: Decimal,
    /// Whether the drink can currently be ordered.
    pub available: bool,
}
