//! Account management: registration, chips credits, and role changes.

use chrono::Utc;
use rust_decimal::Decimal;

use crate::domain::{
    Actor, ChipsLogEntry, NewUser, Rank, RoleChangeLogEntry, RoleFlags, User, UserId,
};
use crate::error::ClubError;
use crate::service::log_best_effort;
use crate::storage::Storage;

/// Registration, balances, chips credits, and role administration.
#[derive(Debug, Clone)]
pub struct AccountService<S> {
    store: S,
}

impl<S: Storage> AccountService<S> {
    /// Creates the service over the given backend.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Registers a new user with a zero balance and no roles.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::InvalidAmount`] for an empty display name,
    /// [`ClubError::Conflict`] when the handle is already taken, and
    /// [`ClubError::StoreUnavailable`] on store failure.
    pub async fn register(&self, new_user: &NewUser) -> Result<User, ClubError> {
        if new_user.first_name.trim().is_empty() {
            return Err(ClubError::InvalidAmount(
                "first name must not be empty".to_string(),
            ));
        }
        let user = self.store.create_user(new_user).await?;
        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Fetches a user by id.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::UserNotFound`] for an unknown id and
    /// [`ClubError::StoreUnavailable`] on store failure.
    pub async fn get_user(&self, user_id: UserId) -> Result<User, ClubError> {
        self.store
            .get_user(user_id)
            .await?
            .ok_or(ClubError::UserNotFound(user_id.get()))
    }

    /// Returns the user's current chips balance.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::UserNotFound`] for an unknown id and
    /// [`ClubError::StoreUnavailable`] on store failure.
    pub async fn balance_of(&self, user_id: UserId) -> Result<Decimal, ClubError> {
        self.store.balance_of(user_id).await
    }

    /// Credits chips to a user on behalf of a bartender or administrator
    /// and returns the new balance. The credit is recorded in the chips
    /// log; administrators are logged without a bartender id.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::Forbidden`] when the caller is neither a
    /// bartender nor an administrator, [`ClubError::InvalidAmount`] for a
    /// non-positive amount, [`ClubError::UserNotFound`] for an unknown
    /// recipient, and [`ClubError::StoreUnavailable`] on store failure.
    pub async fn add_chips(
        &self,
        caller: &User,
        user_id: UserId,
        amount: Decimal,
        reason: Option<String>,
    ) -> Result<Decimal, ClubError> {
        let actor = Actor::from_user(caller).ok_or_else(|| {
            ClubError::Forbidden("bartender or admin role required".to_string())
        })?;
        if amount <= Decimal::ZERO {
            return Err(ClubError::InvalidAmount(
                "credit amount must be positive".to_string(),
            ));
        }

        let new_balance = self.store.credit(user_id, amount).await?;

        log_best_effort(
            "chips_log",
            self.store
                .log_chips(&ChipsLogEntry {
                    user_id,
                    actor,
                    amount,
                    reason,
                    at: Utc::now(),
                })
                .await,
        );

        tracing::info!(user_id = %user_id, amount = %amount, "chips credited");
        Ok(new_balance)
    }

    /// Replaces a user's role flags. Administrators only. When the change
    /// moves the derived rank, the transition is recorded in the role
    /// change log under the acting admin.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::Forbidden`] without admin privileges,
    /// [`ClubError::UserNotFound`] for an unknown user, and
    /// [`ClubError::StoreUnavailable`] on store failure.
    pub async fn change_roles(
        &self,
        caller: &User,
        user_id: UserId,
        roles: RoleFlags,
    ) -> Result<User, ClubError> {
        if !caller.roles.is_admin() {
            return Err(ClubError::Forbidden("admin role required".to_string()));
        }

        let before = self
            .store
            .get_user(user_id)
            .await?
            .ok_or(ClubError::UserNotFound(user_id.get()))?;

        self.store.update_roles(user_id, roles).await?;

        let old_rank = Rank::from_flags(&before.roles);
        let new_rank = Rank::from_flags(&roles);
        if old_rank != new_rank {
            log_best_effort(
                "role_change_log",
                self.store
                    .log_role_change(&RoleChangeLogEntry {
                        admin_id: caller.id,
                        user_id,
                        old_rank,
                        new_rank,
                        at: Utc::now(),
                    })
                    .await,
            );
        }

        self.store
            .get_user(user_id)
            .await?
            .ok_or(ClubError::UserNotFound(user_id.get()))
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::storage::{Ledger, MemoryStorage, UserStore};

    fn registration(name: &str) -> NewUser {
        NewUser {
            telegram_id: None,
            username: Some(name.to_string()),
            first_name: name.to_string(),
            last_name: None,
            phone: None,
        }
    }

    async fn user_with(svc: &AccountService<MemoryStorage>, store: &MemoryStorage, name: &str, roles: RoleFlags) -> User {
        let user = svc.register(&registration(name)).await.unwrap();
        store.update_roles(user.id, roles).await.unwrap();
        store.get_user(user.id).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn registration_starts_clean() {
        let store = MemoryStorage::new();
        let svc = AccountService::new(store.clone());

        let user = svc.register(&registration("alice")).await.unwrap();
        assert_eq!(user.chips, Decimal::ZERO);
        assert_eq!(user.roles, RoleFlags::default());

        assert!(matches!(
            svc.register(&registration("  ")).await,
            Err(ClubError::InvalidAmount(_))
        ));
        assert!(matches!(
            svc.register(&registration("alice")).await,
            Err(ClubError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn bartender_credit_is_logged_with_their_id() {
        let store = MemoryStorage::new();
        let svc = AccountService::new(store.clone());

        let bartender = user_with(
            &svc,
            &store,
            "bar",
            RoleFlags {
                bartender: true,
                ..RoleFlags::default()
            },
        )
        .await;
        let guest = svc.register(&registration("guest")).await.unwrap();

        let balance = svc
            .add_chips(&bartender, guest.id, Decimal::new(50_000, 2), Some("top-up".to_string()))
            .await
            .unwrap();
        assert_eq!(balance, Decimal::new(50_000, 2));

        let logs = store.chips_log_entries().await;
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].actor, Actor::Bartender(bartender.id));
        assert_eq!(logs[0].reason.as_deref(), Some("top-up"));
    }

    #[tokio::test]
    async fn admin_credit_is_logged_without_bartender_id() {
        let store = MemoryStorage::new();
        let svc = AccountService::new(store.clone());

        let admin = user_with(
            &svc,
            &store,
            "admin",
            RoleFlags {
                admin: true,
                ..RoleFlags::default()
            },
        )
        .await;
        let guest = svc.register(&registration("guest")).await.unwrap();

        svc.add_chips(&admin, guest.id, Decimal::new(10_000, 2), None)
            .await
            .unwrap();

        let logs = store.chips_log_entries().await;
        assert_eq!(logs[0].actor, Actor::Administrator);
        assert_eq!(logs[0].actor.bartender_id(), None);
    }

    #[tokio::test]
    async fn credit_rejects_unprivileged_callers_and_bad_amounts() {
        let store = MemoryStorage::new();
        let svc = AccountService::new(store.clone());

        let guest = svc.register(&registration("guest")).await.unwrap();
        let other = svc.register(&registration("other")).await.unwrap();

        assert!(matches!(
            svc.add_chips(&guest, other.id, Decimal::ONE, None).await,
            Err(ClubError::Forbidden(_))
        ));

        let admin = user_with(
            &svc,
            &store,
            "admin",
            RoleFlags {
                admin: true,
                ..RoleFlags::default()
            },
        )
        .await;
        assert!(matches!(
            svc.add_chips(&admin, other.id, Decimal::ZERO, None).await,
            Err(ClubError::InvalidAmount(_))
        ));
        assert!(matches!(
            svc.add_chips(&admin, other.id, Decimal::new(-100, 2), None)
                .await,
            Err(ClubError::InvalidAmount(_))
        ));

        // Nothing logged, nothing credited.
        assert!(store.chips_log_entries().await.is_empty());
        assert_eq!(store.balance_of(other.id).await.unwrap(), Decimal::ZERO);
    }

    #[tokio::test]
    async fn role_change_records_the_rank_transition() {
        let store = MemoryStorage::new();
        let svc = AccountService::new(store.clone());

        let admin = user_with(
            &svc,
            &store,
            "admin",
            RoleFlags {
                admin: true,
                ..RoleFlags::default()
            },
        )
        .await;
        let guest = svc.register(&registration("guest")).await.unwrap();

        let updated = svc
            .change_roles(
                &admin,
                guest.id,
                RoleFlags {
                    waiter: true,
                    ..RoleFlags::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.roles.waiter);

        let logs = store.role_change_entries().await;
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].admin_id, admin.id);
        assert_eq!(logs[0].old_rank, Rank::Guest);
        assert_eq!(logs[0].new_rank, Rank::Waiter);
        assert_eq!(logs[0].new_rank.name(), "Waiter");
    }

    #[tokio::test]
    async fn same_rank_change_is_not_logged() {
        let store = MemoryStorage::new();
        let svc = AccountService::new(store.clone());

        let admin = user_with(
            &svc,
            &store,
            "admin",
            RoleFlags {
                admin: true,
                ..RoleFlags::default()
            },
        )
        .await;
        let guest = svc.register(&registration("guest")).await.unwrap();

        // Bartender does not participate in the rank ladder.
        svc.change_roles(
            &admin,
            guest.id,
            RoleFlags {
                bartender: true,
                ..RoleFlags::default()
            },
        )
        .await
        .unwrap();

        assert!(store.role_change_entries().await.is_empty());
    }

    #[tokio::test]
    async fn role_change_requires_admin() {
        let store = MemoryStorage::new();
        let svc = AccountService::new(store.clone());

        let guest = svc.register(&registration("guest")).await.unwrap();
        let other = svc.register(&registration("other")).await.unwrap();

        assert!(matches!(
            svc.change_roles(
                &guest,
                other.id,
                RoleFlags {
                    admin: true,
                    ..RoleFlags::default()
                }
            )
            .await,
            Err(ClubError::Forbidden(_))
        ));

        let admin = user_with(
            &svc,
            &store,
            "admin",
            RoleFlags {
                admin: true,
                ..RoleFlags::default()
            },
        )
        .await;
        assert!(matches!(
            svc.change_roles(&admin, UserId::new(999), RoleFlags::default())
                .await,
            Err(ClubError::UserNotFound(999))
        ));
    }
}
