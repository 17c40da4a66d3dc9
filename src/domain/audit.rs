//! Append-only audit records.
//!
//! Audit writes are best-effort: a failed log write is reported for
//! operator visibility and never rolls back the primary effect it
//! describes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::ids::{OrderId, UserId};
use super::user::{Actor, Rank};

/// Record of a chips credit.
#[derive(Debug, Clone)]
pub struct ChipsLogEntry {
    /// The user whose balance was credited.
    pub user_id: UserId,
    /// Who performed the credit.
    pub actor: Actor,
    /// Amount credited. Positive.
    pub amount: Decimal,
    /// Optional free-text reason.
    pub reason: Option<String>,
    /// When the credit happened.
    pub at: DateTime<Utc>,
}

/// Snapshot taken when an order is created.
#[derive(Debug, Clone)]
pub struct OrderLogEntry {
    /// The new order.
    pub order_id: OrderId,
    /// The buyer.
    pub user_id: UserId,
    /// The debited total.
    pub total_amount: Decimal,
    /// Human-readable item summary ("Name x2, Name x1").
    pub items_summary: String,
    /// When the order was created.
    pub at: DateTime<Utc>,
}

/// A shift or order action performed by a waiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaiterAction {
    /// The waiter opened a shift.
    ShiftStarted,
    /// The waiter closed a shift.
    ShiftEnded,
    /// The waiter claimed an order.
    OrderTaken,
    /// The waiter completed an order.
    OrderCompleted,
}

impl WaiterAction {
    /// Stable string form used in the relational store.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ShiftStarted => "shift_started",
            Self::ShiftEnded => "shift_ended",
            Self::OrderTaken => "order_taken",
            Self::OrderCompleted => "order_completed",
        }
    }
}

/// Record of a waiter action.
#[derive(Debug, Clone)]
pub struct WaiterActionLogEntry {
    /// The acting waiter.
    pub waiter_id: UserId,
    /// The order involved, if any (null for shift actions).
    pub order_id: Option<OrderId>,
    /// What the waiter did.
    pub action: WaiterAction,
    /// When it happened.
    pub at: DateTime<Utc>,
}

/// Record of an administrative role mutation, described by the derived
/// rank names so reporting stays human-readable.
#[derive(Debug, Clone)]
pub struct RoleChangeLogEntry {
    /// The administrator who applied the change.
    pub admin_id: UserId,
    /// The user whose roles changed.
    pub user_id: UserId,
    /// Rank derived from the flags before the change.
    pub old_rank: Rank,
    /// Rank derived from the flags after the change.
    pub new_rank: Rank,
    /// When the change was applied.
    pub at: DateTime<Utc>,
}
