//! Service layer: pricing, the order workflow, and account management.
//!
//! Services own authorization and sequencing; the storage traits own
//! atomicity. Handlers call services and never touch storage directly.

pub mod account_service;
pub mod order_service;
pub mod pricing;

pub use account_service::AccountService;
pub use order_service::{OrderService, PlacedOrder};
pub use pricing::price_cart;

use crate::error::ClubError;

/// Reports a failed audit write without propagating it. Audit tables are
/// best-effort by contract; the primary effect has already committed.
pub(crate) fn log_best_effort(what: &str, result: Result<(), ClubError>) {
    if let Err(err) = result {
        tracing::warn!(what, error = %err, "audit write failed");
    }
}
