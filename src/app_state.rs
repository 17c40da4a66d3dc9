//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::service::{AccountService, OrderService};
use crate::storage::AnyStorage;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Order workflow: placement, waiter lifecycle, shifts, catalog.
    pub orders: Arc<OrderService<AnyStorage>>,
    /// Accounts: registration, chips credits, roles.
    pub accounts: Arc<AccountService<AnyStorage>>,
}

impl AppState {
    /// Builds the state over the startup-selected backend.
    #[must_use]
    pub fn new(store: AnyStorage) -> Self {
        Self {
            orders: Arc::new(OrderService::new(store.clone())),
            accounts: Arc::new(AccountService::new(store)),
        }
    }
}
