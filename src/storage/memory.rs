//! In-process implementation of the storage traits.
//!
//! Backs the service test suites and ephemeral deployments. Every
//! operation runs under a single lock acquisition, which gives the same
//! atomicity the SQLite backend gets from single conditional statements:
//! no interleaving between the check and the write of a debit or claim.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use super::{AuditLog, Catalog, Ledger, OrderStore, OrderSummary, ShiftStore, UserStore};
use crate::domain::{
    ChipsLogEntry, ConfirmationCode, Drink, DrinkId, DrinkPrice, NewUser, Order, OrderId,
    OrderItem, OrderLogEntry, OrderStatus, PricedLine, RoleChangeLogEntry, RoleFlags, Shift,
    ShiftId, ShiftStatus, User, UserId, WaiterActionLogEntry,
};
use crate::error::ClubError;

#[derive(Debug)]
struct Inner {
    next_id: i64,
    users: HashMap<i64, User>,
    drinks: HashMap<i64, Drink>,
    orders: HashMap<i64, Order>,
    order_items: HashMap<i64, Vec<OrderItem>>,
    shifts: Vec<Shift>,
    chips_logs: Vec<ChipsLogEntry>,
    order_logs: Vec<OrderLogEntry>,
    waiter_actions_logs: Vec<WaiterActionLogEntry>,
    role_change_logs: Vec<RoleChangeLogEntry>,
}

impl Inner {
    fn new() -> Self {
        Self {
            next_id: 1,
            users: HashMap::new(),
            drinks: HashMap::new(),
            orders: HashMap::new(),
            order_items: HashMap::new(),
            shifts: Vec::new(),
            chips_logs: Vec::new(),
            order_logs: Vec::new(),
            waiter_actions_logs: Vec::new(),
            role_change_logs: Vec::new(),
        }
    }

    fn next_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn summary_of(&self, order: &Order) -> OrderSummary {
        let items = self
            .order_items
            .get(&order.id.get())
            .map(|items| {
                items
                    .iter()
                    .map(|item| {
                        let name = self
                            .drinks
                            .get(&item.drink_id.get())
                            .map_or_else(|| format!("drink {}", item.drink_id), |d| d.name.clone());
                        format!("{name} x{}", item.quantity)
                    })
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default();

        OrderSummary {
            id: order.id,
            user_id: order.user_id,
            waiter_id: order.waiter_id,
            status: order.status.as_str().to_string(),
            total_amount: order.total_amount,
            confirmation_code: order.confirmation_code.as_str().to_string(),
            created_at: order.created_at,
            items,
        }
    }
}

/// In-memory storage over `Arc<RwLock<..>>`.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::new())),
        }
    }

    /// Returns a copy of the chips log (reporting/tests).
    pub async fn chips_log_entries(&self) -> Vec<ChipsLogEntry> {
        self.inner.read().await.chips_logs.clone()
    }

    /// Returns a copy of the order log (reporting/tests).
    pub async fn order_log_entries(&self) -> Vec<OrderLogEntry> {
        self.inner.read().await.order_logs.clone()
    }

    /// Returns a copy of the waiter action log (reporting/tests).
    pub async fn waiter_action_entries(&self) -> Vec<WaiterActionLogEntry> {
        self.inner.read().await.waiter_actions_logs.clone()
    }

    /// Returns a copy of the role change log (reporting/tests).
    pub async fn role_change_entries(&self) -> Vec<RoleChangeLogEntry> {
        self.inner.read().await.role_change_logs.clone()
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Catalog for MemoryStorage {
    async fn price_of(&self, drink_id: DrinkId) -> Result<Option<DrinkPrice>, ClubError> {
        let inner = self.inner.read().await;
        Ok(inner.drinks.get(&drink_id.get()).map(|d| DrinkPrice {
            name: d.name.clone(),
            price: d.price,
            available: d.is_available,
        }))
    }

    async fn list_drinks(&self) -> Result<Vec<Drink>, ClubError> {
        let inner = self.inner.read().await;
        let mut drinks: Vec<Drink> = inner
            .drinks
            .values()
            .filter(|d| d.is_available)
            .cloned()
            .collect();
        drinks.sort_by(|a, b| (&a.category, &a.name).cmp(&(&b.category, &b.name)));
        Ok(drinks)
    }

    async fn create_drink(
        &self,
        name: &str,
        price: Decimal,
        category: Option<&str>,
    ) -> Result<Drink, ClubError> {
        let mut inner = self.inner.write().await;
        let id = inner.next_id();
        let drink = Drink {
            id: DrinkId::new(id),
            name: name.to_string(),
            price,
            category: category.map(str::to_string),
            is_available: true,
        };
        inner.drinks.insert(id, drink.clone());
        Ok(drink)
    }

    async fn set_drink_availability(
        &self,
        drink_id: DrinkId,
        available: bool,
    ) -> Result<(), ClubError> {
        let mut inner = self.inner.write().await;
        let drink = inner
            .drinks
            .get_mut(&drink_id.get())
            .ok_or(ClubError::DrinkUnavailable(drink_id.get()))?;
        drink.is_available = available;
        Ok(())
    }
}

#[async_trait]
impl Ledger for MemoryStorage {
    async fn balance_of(&self, user_id: UserId) -> Result<Decimal, ClubError> {
        let inner = self.inner.read().await;
        inner
            .users
            .get(&user_id.get())
            .map(|u| u.chips)
            .ok_or(ClubError::UserNotFound(user_id.get()))
    }

    async fn credit(&self, user_id: UserId, amount: Decimal) -> Result<Decimal, ClubError> {
        let mut inner = self.inner.write().await;
        let user = inner
            .users
            .get_mut(&user_id.get())
            .ok_or(ClubError::UserNotFound(user_id.get()))?;
        user.chips += amount;
        user.updated_at = Utc::now();
        Ok(user.chips)
    }

    async fn debit(&self, user_id: UserId, amount: Decimal) -> Result<Decimal, ClubError> {
        // Check and decrement happen under one write-lock acquisition,
        // matching the single conditional UPDATE of the SQLite backend.
        let mut inner = self.inner.write().await;
        let user = inner
            .users
            .get_mut(&user_id.get())
            .ok_or(ClubError::UserNotFound(user_id.get()))?;
        if user.chips < amount {
            return Err(ClubError::InsufficientFunds {
                balance: user.chips,
                required: amount,
            });
        }
        user.chips -= amount;
        user.updated_at = Utc::now();
        Ok(user.chips)
    }
}

#[async_trait]
impl OrderStore for MemoryStorage {
    async fn create_order(
        &self,
        user_id: UserId,
        total: Decimal,
        lines: &[PricedLine],
    ) -> Result<(OrderId, ConfirmationCode), ClubError> {
        let mut inner = self.inner.write().await;
        let id = inner.next_id();
        let order_id = OrderId::new(id);
        let code = ConfirmationCode::generate();
        let now = Utc::now();

        inner.orders.insert(
            id,
            Order {
                id: order_id,
                user_id,
                waiter_id: None,
                status: OrderStatus::New,
                total_amount: total,
                confirmation_code: code.clone(),
                created_at: now,
                updated_at: now,
            },
        );
        inner.order_items.insert(
            id,
            lines
                .iter()
                .map(|line| OrderItem {
                    order_id,
                    drink_id: line.drink_id,
                    quantity: line.quantity,
                    price: line.unit_price,
                })
                .collect(),
        );

        Ok((order_id, code))
    }

    async fn take_order(&self, order_id: OrderId, waiter_id: UserId) -> Result<(), ClubError> {
        let mut inner = self.inner.write().await;
        let order = inner
            .orders
            .get_mut(&order_id.get())
            .ok_or(ClubError::OrderNotFound(order_id.get()))?;
        if !order.status.can_transition_to(OrderStatus::Taken) {
            return Err(ClubError::AlreadyTaken(order_id.get()));
        }
        order.waiter_id = Some(waiter_id);
        order.status = OrderStatus::Taken;
        order.updated_at = Utc::now();
        Ok(())
    }

    async fn complete_order(&self, order_id: OrderId, waiter_id: UserId) -> Result<(), ClubError> {
        let mut inner = self.inner.write().await;
        let order = inner
            .orders
            .get_mut(&order_id.get())
            .ok_or(ClubError::OrderNotFound(order_id.get()))?;
        if !order.status.can_transition_to(OrderStatus::Completed) {
            return Err(ClubError::WrongState {
                order_id: order_id.get(),
                status: order.status.as_str().to_string(),
                expected: OrderStatus::Taken.as_str().to_string(),
            });
        }
        if order.waiter_id != Some(waiter_id) {
            return Err(ClubError::NotYours(order_id.get()));
        }
        order.status = OrderStatus::Completed;
        order.updated_at = Utc::now();
        Ok(())
    }

    async fn get_order(
        &self,
        order_id: OrderId,
    ) -> Result<Option<(Order, Vec<OrderItem>)>, ClubError> {
        let inner = self.inner.read().await;
        Ok(inner.orders.get(&order_id.get()).map(|order| {
            (
                order.clone(),
                inner
                    .order_items
                    .get(&order_id.get())
                    .cloned()
                    .unwrap_or_default(),
            )
        }))
    }

    async fn list_pending(&self) -> Result<Vec<OrderSummary>, ClubError> {
        let inner = self.inner.read().await;
        let mut summaries: Vec<OrderSummary> = inner
            .orders
            .values()
            .filter(|o| o.status == OrderStatus::New)
            .map(|o| inner.summary_of(o))
            .collect();
        summaries.sort_by_key(|s| (s.created_at, s.id));
        Ok(summaries)
    }

    async fn list_active_for(&self, waiter_id: UserId) -> Result<Vec<OrderSummary>, ClubError> {
        let inner = self.inner.read().await;
        let mut summaries: Vec<OrderSummary> = inner
            .orders
            .values()
            .filter(|o| o.status == OrderStatus::Taken && o.waiter_id == Some(waiter_id))
            .map(|o| inner.summary_of(o))
            .collect();
        summaries.sort_by_key(|s| (s.created_at, s.id));
        Ok(summaries)
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<OrderSummary>, ClubError> {
        let inner = self.inner.read().await;
        let mut summaries: Vec<OrderSummary> = inner
            .orders
            .values()
            .filter(|o| o.user_id == user_id)
            .map(|o| inner.summary_of(o))
            .collect();
        summaries.sort_by_key(|s| std::cmp::Reverse((s.created_at, s.id)));
        Ok(summaries)
    }

    async fn count_taken_for(&self, waiter_id: UserId) -> Result<u64, ClubError> {
        let inner = self.inner.read().await;
        Ok(inner
            .orders
            .values()
            .filter(|o| o.status == OrderStatus::Taken && o.waiter_id == Some(waiter_id))
            .count() as u64)
    }
}

#[async_trait]
impl ShiftStore for MemoryStorage {
    async fn insert_shift(&self, waiter_id: UserId) -> Result<ShiftId, ClubError> {
        let mut inner = self.inner.write().await;
        let id = inner.next_id();
        inner.shifts.push(Shift {
            id: ShiftId::new(id),
            waiter_id,
            status: ShiftStatus::Working,
            start_time: Utc::now(),
            end_time: None,
        });
        Ok(ShiftId::new(id))
    }

    async fn find_open_shift(&self, waiter_id: UserId) -> Result<Option<Shift>, ClubError> {
        let inner = self.inner.read().await;
        Ok(inner
            .shifts
            .iter()
            .filter(|s| {
                s.waiter_id == waiter_id
                    && s.status == ShiftStatus::Working
                    && s.end_time.is_none()
            })
            .max_by_key(|s| (s.start_time, s.id))
            .cloned())
    }

    async fn close_open_shift(&self, waiter_id: UserId) -> Result<bool, ClubError> {
        let mut inner = self.inner.write().await;
        let open = inner
            .shifts
            .iter_mut()
            .filter(|s| {
                s.waiter_id == waiter_id
                    && s.status == ShiftStatus::Working
                    && s.end_time.is_none()
            })
            .max_by_key(|s| (s.start_time, s.id));

        match open {
            Some(shift) => {
                shift.status = ShiftStatus::Ended;
                shift.end_time = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl UserStore for MemoryStorage {
    async fn create_user(&self, new_user: &NewUser) -> Result<User, ClubError> {
        let mut inner = self.inner.write().await;

        let duplicate = inner.users.values().any(|u| {
            (new_user.username.is_some() && u.username == new_user.username)
                || (new_user.telegram_id.is_some() && u.telegram_id == new_user.telegram_id)
        });
        if duplicate {
            return Err(ClubError::Conflict(
                "username or telegram id already registered".to_string(),
            ));
        }

        let id = inner.next_id();
        let now = Utc::now();
        let user = User {
            id: UserId::new(id),
            telegram_id: new_user.telegram_id,
            username: new_user.username.clone(),
            first_name: new_user.first_name.clone(),
            last_name: new_user.last_name.clone(),
            phone: new_user.phone.clone(),
            roles: RoleFlags::default(),
            chips: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        };
        inner.users.insert(id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, user_id: UserId) -> Result<Option<User>, ClubError> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(&user_id.get()).cloned())
    }

    async fn update_roles(&self, user_id: UserId, roles: RoleFlags) -> Result<(), ClubError> {
        let mut inner = self.inner.write().await;
        let user = inner
            .users
            .get_mut(&user_id.get())
            .ok_or(ClubError::UserNotFound(user_id.get()))?;
        user.roles = roles;
        user.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl AuditLog for MemoryStorage {
    async fn log_chips(&self, entry: &ChipsLogEntry) -> Result<(), ClubError> {
        self.inner.write().await.chips_logs.push(entry.clone());
        Ok(())
    }

    async fn log_order(&self, entry: &OrderLogEntry) -> Result<(), ClubError> {
        self.inner.write().await.order_logs.push(entry.clone());
        Ok(())
    }

    async fn log_waiter_action(&self, entry: &WaiterActionLogEntry) -> Result<(), ClubError> {
        self.inner
            .write()
            .await
            .waiter_actions_logs
            .push(entry.clone());
        Ok(())
    }

    async fn log_role_change(&self, entry: &RoleChangeLogEntry) -> Result<(), ClubError> {
        self.inner
            .write()
            .await
            .role_change_logs
            .push(entry.clone());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    async fn store_with_user(chips: Decimal) -> (MemoryStorage, UserId) {
        let store = MemoryStorage::new();
        let user = store
            .create_user(&NewUser {
                telegram_id: None,
                username: Some("guest".to_string()),
                first_name: "Guest".to_string(),
                last_name: None,
                phone: None,
            })
            .await
            .ok();
        let Some(user) = user else {
            panic!("user creation failed");
        };
        if chips > Decimal::ZERO {
            let _ = store.credit(user.id, chips).await;
        }
        (store, user.id)
    }

    #[tokio::test]
    async fn debit_rejects_insufficient_funds() {
        let (store, user) = store_with_user(Decimal::new(10_000, 2)).await;

        let result = store.debit(user, Decimal::new(10_001, 2)).await;
        assert!(matches!(
            result,
            Err(ClubError::InsufficientFunds { .. })
        ));

        // Balance untouched.
        assert_eq!(store.balance_of(user).await.ok(), Some(Decimal::new(10_000, 2)));
    }

    #[tokio::test]
    async fn debit_to_exactly_zero_succeeds() {
        let (store, user) = store_with_user(Decimal::new(10_000, 2)).await;
        let new_balance = store.debit(user, Decimal::new(10_000, 2)).await.ok();
        assert_eq!(new_balance, Some(Decimal::ZERO));
    }

    #[tokio::test]
    async fn concurrent_debits_never_go_negative() {
        let (store, user) = store_with_user(Decimal::new(10_000, 2)).await;
        let amount = Decimal::new(6_000, 2);

        let a = {
            let store = store.clone();
            tokio::spawn(async move { store.debit(user, amount).await })
        };
        let b = {
            let store = store.clone();
            tokio::spawn(async move { store.debit(user, amount).await })
        };

        let (ra, rb) = (a.await, b.await);
        let results = [ra, rb];
        let successes = results
            .iter()
            .filter(|r| matches!(r, Ok(Ok(_))))
            .count();

        // 60 + 60 > 100: exactly one debit can win.
        assert_eq!(successes, 1);
        assert_eq!(
            store.balance_of(user).await.ok(),
            Some(Decimal::new(4_000, 2))
        );
    }

    #[tokio::test]
    async fn take_order_is_first_wins() {
        let (store, user) = store_with_user(Decimal::ZERO).await;
        let Ok((order_id, _)) = store.create_order(user, Decimal::ONE, &[]).await else {
            panic!("order creation failed");
        };

        let w1 = UserId::new(101);
        let w2 = UserId::new(102);
        assert!(store.take_order(order_id, w1).await.is_ok());
        assert!(matches!(
            store.take_order(order_id, w2).await,
            Err(ClubError::AlreadyTaken(_))
        ));

        let order = store.get_order(order_id).await.ok().flatten();
        let Some((order, _)) = order else {
            panic!("order missing");
        };
        assert_eq!(order.waiter_id, Some(w1));
        assert_eq!(order.status, OrderStatus::Taken);
    }

    #[tokio::test]
    async fn complete_order_distinguishes_not_yours_from_wrong_state() {
        let (store, user) = store_with_user(Decimal::ZERO).await;
        let Ok((order_id, _)) = store.create_order(user, Decimal::ONE, &[]).await else {
            panic!("order creation failed");
        };
        let w1 = UserId::new(101);
        let w2 = UserId::new(102);

        // Never taken: wrong state, not "not yours".
        assert!(matches!(
            store.complete_order(order_id, w1).await,
            Err(ClubError::WrongState { .. })
        ));

        let _ = store.take_order(order_id, w1).await;
        assert!(matches!(
            store.complete_order(order_id, w2).await,
            Err(ClubError::NotYours(_))
        ));

        assert!(store.complete_order(order_id, w1).await.is_ok());

        // Already completed: wrong state again.
        assert!(matches!(
            store.complete_order(order_id, w1).await,
            Err(ClubError::WrongState { .. })
        ));
    }

    #[tokio::test]
    async fn at_most_one_open_shift_row_is_closed() {
        let store = MemoryStorage::new();
        let waiter = UserId::new(7);

        let _ = store.insert_shift(waiter).await;
        assert!(store.find_open_shift(waiter).await.ok().flatten().is_some());

        assert_eq!(store.close_open_shift(waiter).await.ok(), Some(true));
        assert!(store.find_open_shift(waiter).await.ok().flatten().is_none());
        assert_eq!(store.close_open_shift(waiter).await.ok(), Some(false));
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let store = MemoryStorage::new();
        let new_user = NewUser {
            telegram_id: None,
            username: Some("dup".to_string()),
            first_name: "One".to_string(),
            last_name: None,
            phone: None,
        };
        assert!(store.create_user(&new_user).await.is_ok());
        assert!(matches!(
            store.create_user(&new_user).await,
            Err(ClubError::Conflict(_))
        ));
    }
}
