//! The order workflow: placement with atomic payment, the waiter
//! take/complete state machine, shift tracking, and catalog management.

use chrono::Utc;
use rust_decimal::Decimal;

use crate::domain::{
    Cart, Drink, DrinkId, Order, OrderId, OrderItem, OrderLogEntry, ShiftId, User, WaiterAction,
    WaiterActionLogEntry,
};
use crate::error::ClubError;
use crate::service::{log_best_effort, pricing};
use crate::storage::{OrderSummary, Storage};

/// Result of a successful order placement.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    /// The new order.
    pub order_id: OrderId,
    /// Pickup verification code, shown once to the buyer.
    pub confirmation_code: String,
    /// The debited total.
    pub total: Decimal,
    /// The buyer's balance after the debit.
    pub new_balance: Decimal,
}

/// Coordinates pricing, payment, persistence, and the waiter lifecycle.
///
/// Payment-before-persistence ordering is deliberate: an order row must
/// never exist without its chips having been debited. The reverse gap
/// (debited but not persisted) is closed by a compensating credit.
#[derive(Debug, Clone)]
pub struct OrderService<S> {
    store: S,
}

impl<S: Storage> OrderService<S> {
    /// Creates the service over the given backend.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Places an order: prices the cart, debits the buyer, persists the
    /// order, and records the audit snapshot.
    ///
    /// The balance precheck exists only to fail fast with a descriptive
    /// error; the debit itself is the authoritative funds check and can
    /// still reject under concurrent spending.
    ///
    /// # Errors
    ///
    /// Returns pricing errors ([`ClubError::EmptyCart`],
    /// [`ClubError::InvalidAmount`], [`ClubError::DrinkUnavailable`]),
    /// [`ClubError::InsufficientFunds`] when the balance does not cover
    /// the total, [`ClubError::CompensationFailed`] when persistence and
    /// the subsequent refund both fail, and
    /// [`ClubError::StoreUnavailable`] on store failure.
    pub async fn place_order(&self, user: &User, cart: &Cart) -> Result<PlacedOrder, ClubError> {
        let priced = pricing::price_cart(&self.store, cart).await?;

        let balance = self.store.balance_of(user.id).await?;
        if balance < priced.total {
            return Err(ClubError::InsufficientFunds {
                balance,
                required: priced.total,
            });
        }

        let new_balance = self.store.debit(user.id, priced.total).await?;

        let (order_id, code) = match self
            .store
            .create_order(user.id, priced.total, &priced.lines)
            .await
        {
            Ok(created) => created,
            Err(err) => {
                // The chips are gone but the order is not. Refund, and
                // escalate loudly if the refund fails too.
                if let Err(refund_err) = self.store.credit(user.id, priced.total).await {
                    tracing::error!(
                        user_id = %user.id,
                        amount = %priced.total,
                        error = %refund_err,
                        "compensating credit failed after order persistence failure"
                    );
                    return Err(ClubError::CompensationFailed {
                        user_id: user.id.get(),
                        amount: priced.total,
                    });
                }
                return Err(err);
            }
        };

        log_best_effort(
            "order_log",
            self.store
                .log_order(&OrderLogEntry {
                    order_id,
                    user_id: user.id,
                    total_amount: priced.total,
                    items_summary: priced.items_summary(),
                    at: Utc::now(),
                })
                .await,
        );

        tracing::info!(
            order_id = %order_id,
            user_id = %user.id,
            total = %priced.total,
            "order placed"
        );

        Ok(PlacedOrder {
            order_id,
            confirmation_code: code.as_str().to_string(),
            total: priced.total,
            new_balance,
        })
    }

    /// Claims a pending order for a waiter. First claim wins.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::Forbidden`] without the waiter role,
    /// [`ClubError::NotOnShift`] without an open shift,
    /// [`ClubError::OrderNotFound`] for an unknown order,
    /// [`ClubError::AlreadyTaken`] when another waiter got there first,
    /// and [`ClubError::StoreUnavailable`] on store failure.
    pub async fn take_order(&self, waiter: &User, order_id: OrderId) -> Result<(), ClubError> {
        self.require_on_shift(waiter).await?;
        self.store.take_order(order_id, waiter.id).await?;

        log_best_effort(
            "waiter_action",
            self.store
                .log_waiter_action(&WaiterActionLogEntry {
                    waiter_id: waiter.id,
                    order_id: Some(order_id),
                    action: WaiterAction::OrderTaken,
                    at: Utc::now(),
                })
                .await,
        );
        Ok(())
    }

    /// Completes an order the calling waiter has taken.
    ///
    /// No shift check here: a waiter who claimed an order may finish
    /// delivering it even if their shift ended in between.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::Forbidden`] without the waiter role,
    /// [`ClubError::OrderNotFound`] for an unknown order,
    /// [`ClubError::NotYours`] when another waiter holds it,
    /// [`ClubError::WrongState`] unless the order is `taken`, and
    /// [`ClubError::StoreUnavailable`] on store failure.
    pub async fn complete_order(&self, waiter: &User, order_id: OrderId) -> Result<(), ClubError> {
        Self::require_waiter(waiter)?;
        self.store.complete_order(order_id, waiter.id).await?;

        log_best_effort(
            "waiter_action",
            self.store
                .log_waiter_action(&WaiterActionLogEntry {
                    waiter_id: waiter.id,
                    order_id: Some(order_id),
                    action: WaiterAction::OrderCompleted,
                    at: Utc::now(),
                })
                .await,
        );
        Ok(())
    }

    /// Opens a shift for a waiter.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::Forbidden`] without the waiter role,
    /// [`ClubError::AlreadyOnShift`] when a shift is already open, and
    /// [`ClubError::StoreUnavailable`] on store failure.
    pub async fn start_shift(&self, waiter: &User) -> Result<ShiftId, ClubError> {
        Self::require_waiter(waiter)?;
        if self.store.find_open_shift(waiter.id).await?.is_some() {
            return Err(ClubError::AlreadyOnShift(waiter.id.get()));
        }
        let shift_id = self.store.insert_shift(waiter.id).await?;

        log_best_effort(
            "waiter_action",
            self.store
                .log_waiter_action(&WaiterActionLogEntry {
                    waiter_id: waiter.id,
                    order_id: None,
                    action: WaiterAction::ShiftStarted,
                    at: Utc::now(),
                })
                .await,
        );
        tracing::info!(waiter_id = %waiter.id, shift_id = %shift_id, "shift started");
        Ok(shift_id)
    }

    /// Closes the waiter's open shift. Refused while the waiter still
    /// holds taken orders, so no order is ever stranded mid-delivery.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::Forbidden`] without the waiter role,
    /// [`ClubError::NoActiveShift`] when no shift is open,
    /// [`ClubError::ActiveOrdersExist`] while taken orders remain, and
    /// [`ClubError::StoreUnavailable`] on store failure.
    pub async fn end_shift(&self, waiter: &User) -> Result<(), ClubError> {
        Self::require_waiter(waiter)?;
        if self.store.find_open_shift(waiter.id).await?.is_none() {
            return Err(ClubError::NoActiveShift(waiter.id.get()));
        }

        if self.store.count_taken_for(waiter.id).await? > 0 {
            return Err(ClubError::ActiveOrdersExist(waiter.id.get()));
        }

        if !self.store.close_open_shift(waiter.id).await? {
            return Err(ClubError::NoActiveShift(waiter.id.get()));
        }

        log_best_effort(
            "waiter_action",
            self.store
                .log_waiter_action(&WaiterActionLogEntry {
                    waiter_id: waiter.id,
                    order_id: None,
                    action: WaiterAction::ShiftEnded,
                    at: Utc::now(),
                })
                .await,
        );
        tracing::info!(waiter_id = %waiter.id, "shift ended");
        Ok(())
    }

    /// Whether the waiter currently has an open shift.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::StoreUnavailable`] on store failure.
    pub async fn is_on_shift(&self, waiter: &User) -> Result<bool, ClubError> {
        Ok(self.store.find_open_shift(waiter.id).await?.is_some())
    }

    /// Lists pending (`new`) orders for a waiter on shift, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::Forbidden`] without the waiter role,
    /// [`ClubError::NotOnShift`] without an open shift, and
    /// [`ClubError::StoreUnavailable`] on store failure.
    pub async fn pending_orders(&self, waiter: &User) -> Result<Vec<OrderSummary>, ClubError> {
        self.require_on_shift(waiter).await?;
        self.store.list_pending().await
    }

    /// Lists the waiter's own taken orders, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::Forbidden`] without the waiter role and
    /// [`ClubError::StoreUnavailable`] on store failure.
    pub async fn active_orders(&self, waiter: &User) -> Result<Vec<OrderSummary>, ClubError> {
        Self::require_waiter(waiter)?;
        self.store.list_active_for(waiter.id).await
    }

    /// Lists the calling user's own order history, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::StoreUnavailable`] on store failure.
    pub async fn orders_for_user(&self, user: &User) -> Result<Vec<OrderSummary>, ClubError> {
        self.store.list_for_user(user.id).await
    }

    /// Fetches one order with its items. Visible to the buyer, the
    /// assigned waiter, and administrators.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::OrderNotFound`] for an unknown order,
    /// [`ClubError::Forbidden`] for anyone else, and
    /// [`ClubError::StoreUnavailable`] on store failure.
    pub async fn get_order(
        &self,
        caller: &User,
        order_id: OrderId,
    ) -> Result<(Order, Vec<OrderItem>), ClubError> {
        let (order, items) = self
            .store
            .get_order(order_id)
            .await?
            .ok_or(ClubError::OrderNotFound(order_id.get()))?;

        let is_buyer = order.user_id == caller.id;
        let is_assigned = order.waiter_id == Some(caller.id);
        if !(is_buyer || is_assigned || caller.roles.is_admin()) {
            return Err(ClubError::Forbidden("not your order".to_string()));
        }
        Ok((order, items))
    }

    /// Lists all drinks in the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::StoreUnavailable`] on store failure.
    pub async fn list_drinks(&self) -> Result<Vec<Drink>, ClubError> {
        self.store.list_drinks().await
    }

    /// Adds a drink to the catalog. Administrators only.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::Forbidden`] without admin privileges,
    /// [`ClubError::InvalidAmount`] for a non-positive price, and
    /// [`ClubError::StoreUnavailable`] on store failure.
    pub async fn create_drink(
        &self,
        caller: &User,
        name: &str,
        price: Decimal,
        category: Option<&str>,
    ) -> Result<Drink, ClubError> {
        Self::require_admin(caller)?;
        if price <= Decimal::ZERO {
            return Err(ClubError::InvalidAmount(
                "drink price must be positive".to_string(),
            ));
        }
        self.store.create_drink(name, price, category).await
    }

    /// Toggles a drink's availability. Administrators only.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::Forbidden`] without admin privileges,
    /// [`ClubError::DrinkUnavailable`] for an unknown drink, and
    /// [`ClubError::StoreUnavailable`] on store failure.
    pub async fn set_drink_availability(
        &self,
        caller: &User,
        drink_id: DrinkId,
        available: bool,
    ) -> Result<(), ClubError> {
        Self::require_admin(caller)?;
        self.store.set_drink_availability(drink_id, available).await
    }

    fn require_waiter(user: &User) -> Result<(), ClubError> {
        if user.roles.waiter {
            Ok(())
        } else {
            Err(ClubError::Forbidden("waiter role required".to_string()))
        }
    }

    fn require_admin(user: &User) -> Result<(), ClubError> {
        if user.roles.is_admin() {
            Ok(())
        } else {
            Err(ClubError::Forbidden("admin role required".to_string()))
        }
    }

    async fn require_on_shift(&self, waiter: &User) -> Result<(), ClubError> {
        Self::require_waiter(waiter)?;
        if self.store.find_open_shift(waiter.id).await?.is_none() {
            return Err(ClubError::NotOnShift(waiter.id.get()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::domain::{
        CartLine, ChipsLogEntry, ConfirmationCode, DrinkPrice, NewUser, OrderStatus, PricedLine,
        RoleChangeLogEntry, RoleFlags, Shift, UserId,
    };
    use crate::storage::{
        AuditLog, Catalog, Ledger, MemoryStorage, OrderStore, ShiftStore, UserStore,
    };

    async fn make_user(store: &MemoryStorage, name: &str, roles: RoleFlags, chips: i64) -> User {
        let user = store
            .create_user(&NewUser {
                telegram_id: None,
                username: Some(name.to_string()),
                first_name: name.to_string(),
                last_name: None,
                phone: None,
            })
            .await
            .unwrap();
        store.update_roles(user.id, roles).await.unwrap();
        if chips > 0 {
            store
                .credit(user.id, Decimal::new(chips * 100, 2))
                .await
                .unwrap();
        }
        store.get_user(user.id).await.unwrap().unwrap()
    }

    fn waiter_flags() -> RoleFlags {
        RoleFlags {
            waiter: true,
            ..RoleFlags::default()
        }
    }

    async fn seeded() -> (OrderService<MemoryStorage>, MemoryStorage, DrinkId) {
        let store = MemoryStorage::new();
        let drink = store
            .create_drink("Negroni", Decimal::new(30_000, 2), Some("Cocktails"))
            .await
            .unwrap();
        (OrderService::new(store.clone()), store, drink.id)
    }

    fn cart_of(drink_id: DrinkId, quantity: u32) -> Cart {
        Cart {
            lines: vec![CartLine { drink_id, quantity }],
        }
    }

    #[tokio::test]
    async fn place_order_debits_and_persists() {
        let (svc, store, drink) = seeded().await;
        let buyer = make_user(&store, "buyer", RoleFlags::default(), 1000).await;

        let placed = svc.place_order(&buyer, &cart_of(drink, 2)).await.unwrap();
        assert_eq!(placed.total, Decimal::new(60_000, 2));
        assert_eq!(placed.new_balance, Decimal::new(40_000, 2));
        assert_eq!(placed.confirmation_code.len(), 4);

        let (order, items) = svc.get_order(&buyer, placed.order_id).await.unwrap();
        assert_eq!(order.status, OrderStatus::New);
        assert_eq!(order.total_amount, placed.total);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 2);

        // The placement snapshot landed in the audit trail.
        let logs = store.order_log_entries().await;
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].items_summary, "Negroni x2");
    }

    #[tokio::test]
    async fn place_order_rejects_insufficient_funds_without_side_effects() {
        let (svc, store, drink) = seeded().await;
        let buyer = make_user(&store, "poor", RoleFlags::default(), 100).await;

        let err = svc.place_order(&buyer, &cart_of(drink, 1)).await.unwrap_err();
        assert!(matches!(err, ClubError::InsufficientFunds { .. }));

        // Balance untouched, nothing persisted, nothing logged.
        assert_eq!(store.balance_of(buyer.id).await.unwrap(), Decimal::new(10_000, 2));
        assert!(store.list_for_user(buyer.id).await.unwrap().is_empty());
        assert!(store.order_log_entries().await.is_empty());
    }

    #[tokio::test]
    async fn exact_balance_order_succeeds() {
        let (svc, store, drink) = seeded().await;
        let buyer = make_user(&store, "exact", RoleFlags::default(), 300).await;

        let placed = svc.place_order(&buyer, &cart_of(drink, 1)).await.unwrap();
        assert_eq!(placed.new_balance, Decimal::ZERO);

        // One cent short is refused.
        let broke = make_user(&store, "short", RoleFlags::default(), 0).await;
        store
            .credit(broke.id, Decimal::new(29_999, 2))
            .await
            .unwrap();
        assert!(matches!(
            svc.place_order(&broke, &cart_of(drink, 1)).await,
            Err(ClubError::InsufficientFunds { .. })
        ));
        assert_eq!(
            store.balance_of(broke.id).await.unwrap(),
            Decimal::new(29_999, 2)
        );
    }

    #[tokio::test]
    async fn order_totals_survive_catalog_edits() {
        let (svc, store, drink) = seeded().await;
        let buyer = make_user(&store, "buyer", RoleFlags::default(), 1000).await;
        let placed = svc.place_order(&buyer, &cart_of(drink, 1)).await.unwrap();

        // Pulling the drink from the catalog must not touch the order.
        store.set_drink_availability(drink, false).await.unwrap();

        let (order, items) = svc.get_order(&buyer, placed.order_id).await.unwrap();
        assert_eq!(order.total_amount, Decimal::new(30_000, 2));
        assert_eq!(items[0].price, Decimal::new(30_000, 2));
    }

    #[tokio::test]
    async fn take_requires_role_and_open_shift() {
        let (svc, store, drink) = seeded().await;
        let buyer = make_user(&store, "buyer", RoleFlags::default(), 1000).await;
        let placed = svc.place_order(&buyer, &cart_of(drink, 1)).await.unwrap();

        let guest = make_user(&store, "guest", RoleFlags::default(), 0).await;
        assert!(matches!(
            svc.take_order(&guest, placed.order_id).await,
            Err(ClubError::Forbidden(_))
        ));

        let waiter = make_user(&store, "waiter", waiter_flags(), 0).await;
        assert!(matches!(
            svc.take_order(&waiter, placed.order_id).await,
            Err(ClubError::NotOnShift(_))
        ));

        svc.start_shift(&waiter).await.unwrap();
        svc.take_order(&waiter, placed.order_id).await.unwrap();

        let actions = store.waiter_action_entries().await;
        assert!(
            actions
                .iter()
                .any(|a| a.action == WaiterAction::OrderTaken
                    && a.order_id == Some(placed.order_id))
        );
    }

    #[tokio::test]
    async fn second_waiter_cannot_take_a_taken_order() {
        let (svc, store, drink) = seeded().await;
        let buyer = make_user(&store, "buyer", RoleFlags::default(), 1000).await;
        let placed = svc.place_order(&buyer, &cart_of(drink, 1)).await.unwrap();

        let first = make_user(&store, "first", waiter_flags(), 0).await;
        let second = make_user(&store, "second", waiter_flags(), 0).await;
        svc.start_shift(&first).await.unwrap();
        svc.start_shift(&second).await.unwrap();

        svc.take_order(&first, placed.order_id).await.unwrap();
        assert!(matches!(
            svc.take_order(&second, placed.order_id).await,
            Err(ClubError::AlreadyTaken(_))
        ));
    }

    #[tokio::test]
    async fn complete_walks_the_full_lifecycle() {
        let (svc, store, drink) = seeded().await;
        let buyer = make_user(&store, "buyer", RoleFlags::default(), 1000).await;
        let placed = svc.place_order(&buyer, &cart_of(drink, 1)).await.unwrap();

        let waiter = make_user(&store, "waiter", waiter_flags(), 0).await;
        svc.start_shift(&waiter).await.unwrap();
        svc.take_order(&waiter, placed.order_id).await.unwrap();
        svc.complete_order(&waiter, placed.order_id).await.unwrap();

        let (order, _) = svc.get_order(&buyer, placed.order_id).await.unwrap();
        assert_eq!(order.status, OrderStatus::Completed);

        // Completing twice hits the terminal-state guard.
        assert!(matches!(
            svc.complete_order(&waiter, placed.order_id).await,
            Err(ClubError::WrongState { .. })
        ));
    }

    #[tokio::test]
    async fn only_the_assigned_waiter_may_complete() {
        let (svc, store, drink) = seeded().await;
        let buyer = make_user(&store, "buyer", RoleFlags::default(), 1000).await;
        let placed = svc.place_order(&buyer, &cart_of(drink, 1)).await.unwrap();

        let owner = make_user(&store, "owner", waiter_flags(), 0).await;
        let other = make_user(&store, "other", waiter_flags(), 0).await;
        svc.start_shift(&owner).await.unwrap();
        svc.take_order(&owner, placed.order_id).await.unwrap();

        assert!(matches!(
            svc.complete_order(&other, placed.order_id).await,
            Err(ClubError::NotYours(_))
        ));
    }

    #[tokio::test]
    async fn shift_lifecycle_and_double_start() {
        let (svc, store, _) = seeded().await;
        let waiter = make_user(&store, "waiter", waiter_flags(), 0).await;

        assert!(!svc.is_on_shift(&waiter).await.unwrap());
        svc.start_shift(&waiter).await.unwrap();
        assert!(svc.is_on_shift(&waiter).await.unwrap());

        assert!(matches!(
            svc.start_shift(&waiter).await,
            Err(ClubError::AlreadyOnShift(_))
        ));

        svc.end_shift(&waiter).await.unwrap();
        assert!(!svc.is_on_shift(&waiter).await.unwrap());
        assert!(matches!(
            svc.end_shift(&waiter).await,
            Err(ClubError::NoActiveShift(_))
        ));
    }

    #[tokio::test]
    async fn end_shift_refused_while_orders_in_flight() {
        let (svc, store, drink) = seeded().await;
        let buyer = make_user(&store, "buyer", RoleFlags::default(), 1000).await;
        let placed = svc.place_order(&buyer, &cart_of(drink, 1)).await.unwrap();

        let waiter = make_user(&store, "waiter", waiter_flags(), 0).await;
        svc.start_shift(&waiter).await.unwrap();
        svc.take_order(&waiter, placed.order_id).await.unwrap();

        assert!(matches!(
            svc.end_shift(&waiter).await,
            Err(ClubError::ActiveOrdersExist(_))
        ));

        svc.complete_order(&waiter, placed.order_id).await.unwrap();
        svc.end_shift(&waiter).await.unwrap();
    }

    #[tokio::test]
    async fn pending_listing_is_shift_gated() {
        let (svc, store, drink) = seeded().await;
        let buyer = make_user(&store, "buyer", RoleFlags::default(), 1000).await;
        svc.place_order(&buyer, &cart_of(drink, 1)).await.unwrap();

        let waiter = make_user(&store, "waiter", waiter_flags(), 0).await;
        assert!(matches!(
            svc.pending_orders(&waiter).await,
            Err(ClubError::NotOnShift(_))
        ));

        svc.start_shift(&waiter).await.unwrap();
        let pending = svc.pending_orders(&waiter).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].items, "Negroni x1");
    }

    #[tokio::test]
    async fn order_detail_visibility() {
        let (svc, store, drink) = seeded().await;
        let buyer = make_user(&store, "buyer", RoleFlags::default(), 1000).await;
        let placed = svc.place_order(&buyer, &cart_of(drink, 1)).await.unwrap();

        let stranger = make_user(&store, "stranger", RoleFlags::default(), 0).await;
        assert!(matches!(
            svc.get_order(&stranger, placed.order_id).await,
            Err(ClubError::Forbidden(_))
        ));

        let admin = make_user(
            &store,
            "admin",
            RoleFlags {
                admin: true,
                ..RoleFlags::default()
            },
            0,
        )
        .await;
        assert!(svc.get_order(&admin, placed.order_id).await.is_ok());
        assert!(svc.get_order(&buyer, placed.order_id).await.is_ok());
    }

    #[tokio::test]
    async fn catalog_mutations_are_admin_only() {
        let (svc, store, drink) = seeded().await;
        let guest = make_user(&store, "guest", RoleFlags::default(), 0).await;

        assert!(matches!(
            svc.create_drink(&guest, "Spritz", Decimal::new(25_000, 2), None)
                .await,
            Err(ClubError::Forbidden(_))
        ));
        assert!(matches!(
            svc.set_drink_availability(&guest, drink, false).await,
            Err(ClubError::Forbidden(_))
        ));

        let admin = make_user(
            &store,
            "admin",
            RoleFlags {
                admin: true,
                ..RoleFlags::default()
            },
            0,
        )
        .await;
        assert!(matches!(
            svc.create_drink(&admin, "Free", Decimal::ZERO, None).await,
            Err(ClubError::InvalidAmount(_))
        ));
        let spritz = svc
            .create_drink(&admin, "Spritz", Decimal::new(25_000, 2), None)
            .await
            .unwrap();
        svc.set_drink_availability(&admin, spritz.id, false)
            .await
            .unwrap();
    }

    /// Delegating wrapper with switchable failure injection.
    #[derive(Clone)]
    struct FailingStore {
        inner: MemoryStorage,
        fail_create_order: Arc<AtomicBool>,
        fail_credit: Arc<AtomicBool>,
        fail_logs: Arc<AtomicBool>,
    }

    impl FailingStore {
        fn new(inner: MemoryStorage) -> Self {
            Self {
                inner,
                fail_create_order: Arc::new(AtomicBool::new(false)),
                fail_credit: Arc::new(AtomicBool::new(false)),
                fail_logs: Arc::new(AtomicBool::new(false)),
            }
        }

        fn broken() -> Result<(), ClubError> {
            Err(ClubError::StoreUnavailable("injected failure".to_string()))
        }
    }

    #[async_trait]
    impl Catalog for FailingStore {
        async fn price_of(&self, drink_id: DrinkId) -> Result<Option<DrinkPrice>, ClubError> {
            self.inner.price_of(drink_id).await
        }
        async fn list_drinks(&self) -> Result<Vec<Drink>, ClubError> {
            self.inner.list_drinks().await
        }
        async fn create_drink(
            &self,
            name: &str,
            price: Decimal,
            category: Option<&str>,
        ) -> Result<Drink, ClubError> {
            self.inner.create_drink(name, price, category).await
        }
        async fn set_drink_availability(
            &self,
            drink_id: DrinkId,
            available: bool,
        ) -> Result<(), ClubError> {
            self.inner.set_drink_availability(drink_id, available).await
        }
    }

    #[async_trait]
    impl Ledger for FailingStore {
        async fn balance_of(&self, user_id: UserId) -> Result<Decimal, ClubError> {
            self.inner.balance_of(user_id).await
        }
        async fn credit(&self, user_id: UserId, amount: Decimal) -> Result<Decimal, ClubError> {
            if self.fail_credit.load(Ordering::SeqCst) {
                Self::broken()?;
            }
            self.inner.credit(user_id, amount).await
        }
        async fn debit(&self, user_id: UserId, amount: Decimal) -> Result<Decimal, ClubError> {
            self.inner.debit(user_id, amount).await
        }
    }

    #[async_trait]
    impl OrderStore for FailingStore {
        async fn create_order(
            &self,
            user_id: UserId,
            total: Decimal,
            lines: &[PricedLine],
        ) -> Result<(OrderId, ConfirmationCode), ClubError> {
            if self.fail_create_order.load(Ordering::SeqCst) {
                Self::broken()?;
            }
            self.inner.create_order(user_id, total, lines).await
        }
        async fn take_order(&self, order_id: OrderId, waiter_id: UserId) -> Result<(), ClubError> {
            self.inner.take_order(order_id, waiter_id).await
        }
        async fn complete_order(
            &self,
            order_id: OrderId,
            waiter_id: UserId,
        ) -> Result<(), ClubError> {
            self.inner.complete_order(order_id, waiter_id).await
        }
        async fn get_order(
            &self,
            order_id: OrderId,
        ) -> Result<Option<(Order, Vec<OrderItem>)>, ClubError> {
            self.inner.get_order(order_id).await
        }
        async fn list_pending(&self) -> Result<Vec<OrderSummary>, ClubError> {
            self.inner.list_pending().await
        }
        async fn list_active_for(&self, waiter_id: UserId) -> Result<Vec<OrderSummary>, ClubError> {
            self.inner.list_active_for(waiter_id).await
        }
        async fn list_for_user(&self, user_id: UserId) -> Result<Vec<OrderSummary>, ClubError> {
            self.inner.list_for_user(user_id).await
        }
        async fn count_taken_for(&self, waiter_id: UserId) -> Result<u64, ClubError> {
            self.inner.count_taken_for(waiter_id).await
        }
    }

    #[async_trait]
    impl ShiftStore for FailingStore {
        async fn insert_shift(&self, waiter_id: UserId) -> Result<ShiftId, ClubError> {
            self.inner.insert_shift(waiter_id).await
        }
        async fn find_open_shift(&self, waiter_id: UserId) -> Result<Option<Shift>, ClubError> {
            self.inner.find_open_shift(waiter_id).await
        }
        async fn close_open_shift(&self, waiter_id: UserId) -> Result<bool, ClubError> {
            self.inner.close_open_shift(waiter_id).await
        }
    }

    #[async_trait]
    impl UserStore for FailingStore {
        async fn create_user(&self, new_user: &NewUser) -> Result<User, ClubError> {
            self.inner.create_user(new_user).await
        }
        async fn get_user(&self, user_id: UserId) -> Result<Option<User>, ClubError> {
            self.inner.get_user(user_id).await
        }
        async fn update_roles(&self, user_id: UserId, roles: RoleFlags) -> Result<(), ClubError> {
            self.inner.update_roles(user_id, roles).await
        }
    }

    #[async_trait]
    impl AuditLog for FailingStore {
        async fn log_chips(&self, entry: &ChipsLogEntry) -> Result<(), ClubError> {
            if self.fail_logs.load(Ordering::SeqCst) {
                Self::broken()?;
            }
            self.inner.log_chips(entry).await
        }
        async fn log_order(&self, entry: &OrderLogEntry) -> Result<(), ClubError> {
            if self.fail_logs.load(Ordering::SeqCst) {
                Self::broken()?;
            }
            self.inner.log_order(entry).await
        }
        async fn log_waiter_action(&self, entry: &WaiterActionLogEntry) -> Result<(), ClubError> {
            if self.fail_logs.load(Ordering::SeqCst) {
                Self::broken()?;
            }
            self.inner.log_waiter_action(entry).await
        }
        async fn log_role_change(&self, entry: &RoleChangeLogEntry) -> Result<(), ClubError> {
            if self.fail_logs.load(Ordering::SeqCst) {
                Self::broken()?;
            }
            self.inner.log_role_change(entry).await
        }
    }

    #[tokio::test]
    async fn persistence_failure_refunds_the_debit() {
        let inner = MemoryStorage::new();
        let drink = inner
            .create_drink("Negroni", Decimal::new(30_000, 2), None)
            .await
            .unwrap();
        let buyer = make_user(&inner, "buyer", RoleFlags::default(), 1000).await;

        let failing = FailingStore::new(inner.clone());
        failing.fail_create_order.store(true, Ordering::SeqCst);
        let svc = OrderService::new(failing);

        let err = svc
            .place_order(&buyer, &cart_of(drink.id, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, ClubError::StoreUnavailable(_)));

        // The compensating credit restored the full balance.
        assert_eq!(
            inner.balance_of(buyer.id).await.unwrap(),
            Decimal::new(100_000, 2)
        );
    }

    #[tokio::test]
    async fn double_failure_escalates_to_compensation_failed() {
        let inner = MemoryStorage::new();
        let drink = inner
            .create_drink("Negroni", Decimal::new(30_000, 2), None)
            .await
            .unwrap();
        let buyer = make_user(&inner, "buyer", RoleFlags::default(), 1000).await;

        let failing = FailingStore::new(inner.clone());
        failing.fail_create_order.store(true, Ordering::SeqCst);
        failing.fail_credit.store(true, Ordering::SeqCst);
        let svc = OrderService::new(failing);

        let err = svc
            .place_order(&buyer, &cart_of(drink.id, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, ClubError::CompensationFailed { .. }));
    }

    #[tokio::test]
    async fn audit_failures_never_fail_the_operation() {
        let inner = MemoryStorage::new();
        let drink = inner
            .create_drink("Negroni", Decimal::new(30_000, 2), None)
            .await
            .unwrap();
        let buyer = make_user(&inner, "buyer", RoleFlags::default(), 1000).await;
        let waiter = make_user(&inner, "waiter", waiter_flags(), 0).await;

        let failing = FailingStore::new(inner.clone());
        failing.fail_logs.store(true, Ordering::SeqCst);
        let svc = OrderService::new(failing);

        let placed = svc.place_order(&buyer, &cart_of(drink.id, 1)).await.unwrap();
        svc.start_shift(&waiter).await.unwrap();
        svc.take_order(&waiter, placed.order_id).await.unwrap();
        svc.complete_order(&waiter, placed.order_id).await.unwrap();

        // Nothing was recorded, but every primary effect committed.
        assert!(inner.order_log_entries().await.is_empty());
        assert!(inner.waiter_action_entries().await.is_empty());
        let (order, _) = inner.get_order(placed.order_id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Completed);
    }
}
