//! REST endpoint handlers organized by resource.

pub mod accounts;
pub mod drinks;
pub mod orders;
pub mod shifts;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(accounts::routes())
        .merge(drinks::routes())
        .merge(orders::routes())
        .merge(shifts::routes())
}
