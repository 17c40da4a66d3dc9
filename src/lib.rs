//! # club-gateway
//!
//! REST gateway for a club-management backend: user accounts with a
//! "chips" currency ledger, a drinks ordering flow, waiter shift
//! tracking, and an append-only audit trail, all backed by SQLite.
//!
//! The ordering core is the interesting part: a cart is priced against
//! the current catalog, the buyer's chips balance is debited with a
//! single conditional statement, the order and its line items are
//! persisted, and the order then moves through a waiter-assignment
//! state machine (`new → taken → completed`) gated by active shifts.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── OrderService / AccountService (service/)
//!     ├── PricingEngine (service/pricing)
//!     │
//!     ├── Storage traits (storage/)
//!     │     ├── SqliteStorage (sqlx)
//!     │     └── MemoryStorage (tests, ephemeral deployments)
//!     │
//!     └── Domain model (domain/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod storage;
