//! Orders, their line items, the status state machine, and confirmation
//! codes.

use std::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ids::{DrinkId, OrderId, UserId};

/// Order lifecycle status.
///
/// Transitions only move forward: `new → taken → completed`. `completed`
/// is terminal and an order is immutable once it is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Created, waiting for a waiter to claim it.
    New,
    /// Claimed by a waiter, in progress.
    Taken,
    /// Delivered. Terminal.
    Completed,
}

impl OrderStatus {
    /// Stable string form used in the relational store.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Taken => "taken",
            Self::Completed => "completed",
        }
    }

    /// Parses the stored string form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(Self::New),
            "taken" => Some(Self::Taken),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Whether the state machine permits moving to `next` from here.
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::New, Self::Taken) | (Self::Taken, Self::Completed)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Short random token generated once per order at creation, used for
/// in-person pickup verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct ConfirmationCode(String);

impl ConfirmationCode {
    /// Generates a random 4-digit code (zero-padded).
    #[must_use]
    pub fn generate() -> Self {
        let n: u16 = rand::thread_rng().gen_range(0..10_000);
        Self(format!("{n:04}"))
    }

    /// Wraps a stored code.
    #[must_use]
    pub fn from_string(code: String) -> Self {
        Self(code)
    }

    /// Returns the code text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfirmationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An order header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Surrogate key.
    pub id: OrderId,
    /// The buyer.
    pub user_id: UserId,
    /// The waiter who claimed the order. Null until taken.
    pub waiter_id: Option<UserId>,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// Total in chips, computed once at creation. Immutable.
    pub total_amount: Decimal,
    /// Pickup verification code, generated at creation.
    pub confirmation_code: ConfirmationCode,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last transition timestamp.
    pub updated_at: DateTime<Utc>,
}

/// An immutable line item. Created once with its order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    /// Owning order.
    pub order_id: OrderId,
    /// The drink ordered.
    pub drink_id: DrinkId,
    /// Quantity. Positive.
    pub quantity: u32,
    /// Unit price captured at order time.
    pub price: Decimal,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn transitions_only_move_forward() {
        use OrderStatus::{Completed, New, Taken};
        assert!(New.can_transition_to(Taken));
        assert!(Taken.can_transition_to(Completed));

        // No skipping, no reversing, no self-loops.
        assert!(!New.can_transition_to(Completed));
        assert!(!New.can_transition_to(New));
        assert!(!Taken.can_transition_to(New));
        assert!(!Taken.can_transition_to(Taken));
        assert!(!Completed.can_transition_to(New));
        assert!(!Completed.can_transition_to(Taken));
        assert!(!Completed.can_transition_to(Completed));
    }

    #[test]
    fn status_string_round_trip() {
        for status in [OrderStatus::New, OrderStatus::Taken, OrderStatus::Completed] {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::parse("cancelled"), None);
    }

    #[test]
    fn confirmation_code_is_four_digits() {
        for _ in 0..100 {
            let code = ConfirmationCode::generate();
            assert_eq!(code.as_str().len(), 4);
            assert!(code.as_str().chars().all(|c| c.is_ascii_digit()));
        }
    }
}
