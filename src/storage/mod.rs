//! Storage layer: component traits and the two concrete backends.
//!
//! Every store the services touch is behind a trait, so the backend is
//! chosen exactly once at startup and callers never know which one is
//! active. [`SqliteStorage`] is the production backend; [`MemoryStorage`]
//! backs tests and ephemeral deployments. [`AnyStorage`] is the
//! startup-selected dispatcher handed to the services.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

use crate::domain::{
    ChipsLogEntry, ConfirmationCode, Drink, DrinkId, DrinkPrice, NewUser, Order, OrderId,
    OrderItem, OrderLogEntry, PricedLine, RoleChangeLogEntry, RoleFlags, Shift, ShiftId, User,
    UserId, WaiterActionLogEntry,
};
use crate::error::ClubError;

/// One row of an order listing: the header joined with a human-readable
/// item summary, mirroring the reporting queries of the admin UI.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSummary {
    /// Order id.
    pub id: OrderId,
    /// The buyer.
    pub user_id: UserId,
    /// The assigned waiter, if taken.
    pub waiter_id: Option<UserId>,
    /// Current status string.
    pub status: String,
    /// Order total in chips.
    pub total_amount: Decimal,
    /// Pickup verification code.
    pub confirmation_code: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Item summary ("Name x2, Name x1").
    pub items: String,
}

/// Read-only drink price lookup plus the simple admin CRUD.
#[async_trait]
pub trait Catalog {
    /// Resolves the current price and availability of a drink.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::StoreUnavailable`] on store failure.
    async fn price_of(&self, drink_id: DrinkId) -> Result<Option<DrinkPrice>, ClubError>;

    /// Lists all currently available drinks.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::StoreUnavailable`] on store failure.
    async fn list_drinks(&self) -> Result<Vec<Drink>, ClubError>;

    /// Adds a drink to the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::StoreUnavailable`] on store failure.
    async fn create_drink(
        &self,
        name: &str,
        price: Decimal,
        category: Option<&str>,
    ) -> Result<Drink, ClubError>;

    /// Toggles a drink's availability.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::DrinkUnavailable`] if the drink does not exist
    /// and [`ClubError::StoreUnavailable`] on store failure.
    async fn set_drink_availability(
        &self,
        drink_id: DrinkId,
        available: bool,
    ) -> Result<(), ClubError>;
}

/// Per-user chips balances with atomic credit/debit.
///
/// Both mutations are single conditional statements in every backend, so
/// the non-negative invariant holds under concurrent callers without an
/// in-process lock manager.
#[async_trait]
pub trait Ledger {
    /// Returns the user's current balance (always ≥ 0).
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::UserNotFound`] if the user does not exist and
    /// [`ClubError::StoreUnavailable`] on store failure.
    async fn balance_of(&self, user_id: UserId) -> Result<Decimal, ClubError>;

    /// Increases the balance by `amount` and returns the new value.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::UserNotFound`] if the user does not exist and
    /// [`ClubError::StoreUnavailable`] on store failure.
    async fn credit(&self, user_id: UserId, amount: Decimal) -> Result<Decimal, ClubError>;

    /// Atomically decreases the balance by `amount` and returns the new
    /// value. The decrement and the `balance >= amount` check are one
    /// statement; zero affected rows means the funds were insufficient.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::InsufficientFunds`] if the balance is below
    /// `amount`, [`ClubError::UserNotFound`] if the user does not exist,
    /// and [`ClubError::StoreUnavailable`] on store failure.
    async fn debit(&self, user_id: UserId, amount: Decimal) -> Result<Decimal, ClubError>;
}

/// Order headers, immutable line items, and the status state machine.
#[async_trait]
pub trait OrderStore {
    /// Inserts a `new` order with its line items and a freshly generated
    /// confirmation code. Header and items are one unit: a partial item
    /// failure never leaves a dangling header.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::StoreUnavailable`] on store failure.
    async fn create_order(
        &self,
        user_id: UserId,
        total: Decimal,
        lines: &[PricedLine],
    ) -> Result<(OrderId, ConfirmationCode), ClubError>;

    /// Claims a `new` order for a waiter. The status predicate and the
    /// write are one conditional statement, so two waiters can never both
    /// win.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::AlreadyTaken`] if the order is past `new`,
    /// [`ClubError::OrderNotFound`] if it does not exist, and
    /// [`ClubError::StoreUnavailable`] on store failure.
    async fn take_order(&self, order_id: OrderId, waiter_id: UserId) -> Result<(), ClubError>;

    /// Completes a `taken` order held by the calling waiter.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::NotYours`] on waiter mismatch,
    /// [`ClubError::WrongState`] unless the status is exactly `taken`,
    /// [`ClubError::OrderNotFound`] if the order does not exist, and
    /// [`ClubError::StoreUnavailable`] on store failure.
    async fn complete_order(&self, order_id: OrderId, waiter_id: UserId) -> Result<(), ClubError>;

    /// Fetches an order with its items.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::StoreUnavailable`] on store failure.
    async fn get_order(
        &self,
        order_id: OrderId,
    ) -> Result<Option<(Order, Vec<OrderItem>)>, ClubError>;

    /// Lists `new` orders, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::StoreUnavailable`] on store failure.
    async fn list_pending(&self) -> Result<Vec<OrderSummary>, ClubError>;

    /// Lists a waiter's `taken` orders, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::StoreUnavailable`] on store failure.
    async fn list_active_for(&self, waiter_id: UserId) -> Result<Vec<OrderSummary>, ClubError>;

    /// Lists a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::StoreUnavailable`] on store failure.
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<OrderSummary>, ClubError>;

    /// Counts a waiter's in-flight (`taken`) orders. Gates shift close.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::StoreUnavailable`] on store failure.
    async fn count_taken_for(&self, waiter_id: UserId) -> Result<u64, ClubError>;
}

/// Waiter shift rows. The at-most-one-open-shift invariant is enforced by
/// the service, which checks [`ShiftStore::find_open_shift`] first.
#[async_trait]
pub trait ShiftStore {
    /// Opens a shift for a waiter.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::StoreUnavailable`] on store failure.
    async fn insert_shift(&self, waiter_id: UserId) -> Result<ShiftId, ClubError>;

    /// Finds the waiter's open shift, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::StoreUnavailable`] on store failure.
    async fn find_open_shift(&self, waiter_id: UserId) -> Result<Option<Shift>, ClubError>;

    /// Closes the waiter's most recent open shift. Returns `false` when
    /// there was none to close.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::StoreUnavailable`] on store failure.
    async fn close_open_shift(&self, waiter_id: UserId) -> Result<bool, ClubError>;
}

/// User accounts and role flags.
#[async_trait]
pub trait UserStore {
    /// Registers a user with zero balance and cleared role flags.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::Conflict`] if the external handle is already
    /// taken and [`ClubError::StoreUnavailable`] on store failure.
    async fn create_user(&self, new_user: &NewUser) -> Result<User, ClubError>;

    /// Fetches a user by id.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::StoreUnavailable`] on store failure.
    async fn get_user(&self, user_id: UserId) -> Result<Option<User>, ClubError>;

    /// Replaces a user's role flags.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::UserNotFound`] if the user does not exist and
    /// [`ClubError::StoreUnavailable`] on store failure.
    async fn update_roles(&self, user_id: UserId, roles: RoleFlags) -> Result<(), ClubError>;
}

/// Append-only audit tables. Callers treat these writes as best-effort;
/// the trait itself reports failures so the services can decide.
#[async_trait]
pub trait AuditLog {
    /// Appends a chips credit record.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::StoreUnavailable`] on store failure.
    async fn log_chips(&self, entry: &ChipsLogEntry) -> Result<(), ClubError>;

    /// Appends an order creation snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::StoreUnavailable`] on store failure.
    async fn log_order(&self, entry: &OrderLogEntry) -> Result<(), ClubError>;

    /// Appends a waiter shift/order action record.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::StoreUnavailable`] on store failure.
    async fn log_waiter_action(&self, entry: &WaiterActionLogEntry) -> Result<(), ClubError>;

    /// Appends a role mutation record.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::StoreUnavailable`] on store failure.
    async fn log_role_change(&self, entry: &RoleChangeLogEntry) -> Result<(), ClubError>;
}

/// Everything the services need from a backend, in one bound.
pub trait Storage:
    Catalog + Ledger + OrderStore + ShiftStore + UserStore + AuditLog + Send + Sync
{
}

impl<T> Storage for T where
    T: Catalog + Ledger + OrderStore + ShiftStore + UserStore + AuditLog + Send + Sync
{
}

/// The backend selected once at startup. Services and handlers are never
/// aware of which variant is active.
#[derive(Debug, Clone)]
pub enum AnyStorage {
    /// Durable SQLite backend.
    Sqlite(SqliteStorage),
    /// In-process backend (ephemeral deployments, tests).
    Memory(MemoryStorage),
}

macro_rules! dispatch {
    ($self:ident, $inner:ident => $call:expr) => {
        match $self {
            Self::Sqlite($inner) => $call,
            Self::Memory($inner) => $call,
        }
    };
}

#[async_trait]
impl Catalog for AnyStorage {
    async fn price_of(&self, drink_id: DrinkId) -> Result<Option<DrinkPrice>, ClubError> {
        dispatch!(self, s => s.price_of(drink_id).await)
    }

    async fn list_drinks(&self) -> Result<Vec<Drink>, ClubError> {
        dispatch!(self, s => s.list_drinks().await)
    }

    async fn create_drink(
        &self,
        name: &str,
        price: Decimal,
        category: Option<&str>,
    ) -> Result<Drink, ClubError> {
        dispatch!(self, s => s.create_drink(name, price, category).await)
    }

    async fn set_drink_availability(
        &self,
        drink_id: DrinkId,
        available: bool,
    ) -> Result<(), ClubError> {
        dispatch!(self, s => s.set_drink_availability(drink_id, available).await)
    }
}

#[async_trait]
impl Ledger for AnyStorage {
    async fn balance_of(&self, user_id: UserId) -> Result<Decimal, ClubError> {
        dispatch!(self, s => s.balance_of(user_id).await)
    }

    async fn credit(&self, user_id: UserId, amount: Decimal) -> Result<Decimal, ClubError> {
        dispatch!(self, s => s.credit(user_id, amount).await)
    }

    async fn debit(&self, user_id: UserId, amount: Decimal) -> Result<Decimal, ClubError> {
        dispatch!(self, s => s.debit(user_id, amount).await)
    }
}

#[async_trait]
impl OrderStore for AnyStorage {
    async fn create_order(
        &self,
        user_id: UserId,
        total: Decimal,
        lines: &[PricedLine],
    ) -> Result<(OrderId, ConfirmationCode), ClubError> {
        dispatch!(self, s => s.create_order(user_id, total, lines).await)
    }

    async fn take_order(&self, order_id: OrderId, waiter_id: UserId) -> Result<(), ClubError> {
        dispatch!(self, s => s.take_order(order_id, waiter_id).await)
    }

    async fn complete_order(&self, order_id: OrderId, waiter_id: UserId) -> Result<(), ClubError> {
        dispatch!(self, s => s.complete_order(order_id, waiter_id).await)
    }

    async fn get_order(
        &self,
        order_id: OrderId,
    ) -> Result<Option<(Order, Vec<OrderItem>)>, ClubError> {
        dispatch!(self, s => s.get_order(order_id).await)
    }

    async fn list_pending(&self) -> Result<Vec<OrderSummary>, ClubError> {
        dispatch!(self, s => s.list_pending().await)
    }

    async fn list_active_for(&self, waiter_id: UserId) -> Result<Vec<OrderSummary>, ClubError> {
        dispatch!(self, s => s.list_active_for(waiter_id).await)
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<OrderSummary>, ClubError> {
        dispatch!(self, s => s.list_for_user(user_id).await)
    }

    async fn count_taken_for(&self, waiter_id: UserId) -> Result<u64, ClubError> {
        dispatch!(self, s => s.count_taken_for(waiter_id).await)
    }
}

#[async_trait]
impl ShiftStore for AnyStorage {
    async fn insert_shift(&self, waiter_id: UserId) -> Result<ShiftId, ClubError> {
        dispatch!(self, s => s.insert_shift(waiter_id).await)
    }

    async fn find_open_shift(&self, waiter_id: UserId) -> Result<Option<Shift>, ClubError> {
        dispatch!(self, s => s.find_open_shift(waiter_id).await)
    }

    async fn close_open_shift(&self, waiter_id: UserId) -> Result<bool, ClubError> {
        dispatch!(self, s => s.close_open_shift(waiter_id).await)
    }
}

#[async_trait]
impl UserStore for AnyStorage {
    async fn create_user(&self, new_user: &NewUser) -> Result<User, ClubError> {
        dispatch!(self, s => s.create_user(new_user).await)
    }

    async fn get_user(&self, user_id: UserId) -> Result<Option<User>, ClubError> {
        dispatch!(self, s => s.get_user(user_id).await)
    }

    async fn update_roles(&self, user_id: UserId, roles: RoleFlags) -> Result<(), ClubError> {
        dispatch!(self, s => s.update_roles(user_id, roles).await)
    }
}

#[async_trait]
impl AuditLog for AnyStorage {
    async fn log_chips(&self, entry: &ChipsLogEntry) -> Result<(), ClubError> {
        dispatch!(self, s => s.log_chips(entry).await)
    }

    async fn log_order(&self, entry: &OrderLogEntry) -> Result<(), ClubError> {
        dispatch!(self, s => s.log_order(entry).await)
    }

    async fn log_waiter_action(&self, entry: &WaiterActionLogEntry) -> Result<(), ClubError> {
        dispatch!(self, s => s.log_waiter_action(entry).await)
    }

    async fn log_role_change(&self, entry: &RoleChangeLogEntry) -> Result<(), ClubError> {
        dispatch!(self, s => s.log_role_change(entry).await)
    }
}
