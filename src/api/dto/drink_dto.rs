//! DTOs for the drink catalog.

use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;

/// Catalog entry creation payload. Administrators only.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateDrinkRequest {
    /// Display name.
    pub name: String,
    /// Price in chips. Must be positive.
    pub price: Decimal,
    /// Optional category (e.g. "Cocktails").
    #[serde(default)]
    pub category: Option<String>,
}

/// Availability toggle payload. Administrators only.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SetAvailabilityRequest {
    /// Whether the drink can be ordered.
    pub available: bool,
}
