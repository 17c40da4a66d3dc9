//! SQLite implementation of the storage traits, backed by `sqlx`.
//!
//! Money is persisted as integer minor units (cents of a chip) so the
//! ledger's conditional debit and the order state machine's claims are
//! plain integer arithmetic inside single `UPDATE` statements.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use super::{AuditLog, Catalog, Ledger, OrderStore, OrderSummary, ShiftStore, UserStore};
use crate::domain::{
    ChipsLogEntry, ConfirmationCode, Drink, DrinkId, DrinkPrice, NewUser, Order, OrderId,
    OrderItem, OrderLogEntry, OrderStatus, PricedLine, RoleChangeLogEntry, RoleFlags, Shift,
    ShiftId, ShiftStatus, User, UserId, WaiterActionLogEntry,
};
use crate::error::ClubError;

/// All tables the gateway owns. Mirrors the original club schema with the
/// four audit tables added; money columns are integer minor units.
const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    telegram_id INTEGER UNIQUE,
    username TEXT UNIQUE,
    first_name TEXT NOT NULL,
    last_name TEXT,
    phone TEXT,
    is_resident INTEGER NOT NULL DEFAULT 0,
    is_waiter INTEGER NOT NULL DEFAULT 0,
    is_bartender INTEGER NOT NULL DEFAULT 0,
    is_admin INTEGER NOT NULL DEFAULT 0,
    is_super_admin INTEGER NOT NULL DEFAULT 0,
    chips INTEGER NOT NULL DEFAULT 0 CHECK (chips >= 0),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS drinks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    price INTEGER NOT NULL,
    category TEXT,
    is_available INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS orders (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users (id),
    waiter_id INTEGER REFERENCES users (id),
    status TEXT NOT NULL DEFAULT 'new',
    total_amount INTEGER NOT NULL,
    confirmation_code TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS order_items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    order_id INTEGER NOT NULL REFERENCES orders (id),
    drink_id INTEGER NOT NULL REFERENCES drinks (id),
    quantity INTEGER NOT NULL,
    price INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS waiter_shifts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    waiter_id INTEGER NOT NULL REFERENCES users (id),
    status TEXT NOT NULL DEFAULT 'working',
    start_time TEXT NOT NULL,
    end_time TEXT
);

CREATE TABLE IF NOT EXISTS chips_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    bartender_id INTEGER,
    amount INTEGER NOT NULL,
    reason TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS order_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    order_id INTEGER NOT NULL,
    user_id INTEGER NOT NULL,
    total_amount INTEGER NOT NULL,
    items_summary TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS waiter_actions_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    waiter_id INTEGER NOT NULL,
    order_id INTEGER,
    action TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS role_change_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    admin_id INTEGER NOT NULL,
    user_id INTEGER NOT NULL,
    old_role TEXT NOT NULL,
    new_role TEXT NOT NULL,
    created_at TEXT NOT NULL
);
";

/// Converts a chips amount to integer minor units (2 decimal places).
fn to_cents(amount: Decimal) -> Result<i64, ClubError> {
    amount
        .round_dp(2)
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|cents| cents.to_i64())
        .ok_or_else(|| ClubError::InvalidAmount(format!("amount out of range: {amount}")))
}

/// Converts integer minor units back to a chips amount.
fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// SQLite-backed storage using `sqlx::SqlitePool`.
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Opens (creating if missing) the database at `url` and ensures the
    /// schema exists.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::StoreUnavailable`] if the database cannot be
    /// opened or the schema cannot be created.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, ClubError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| ClubError::StoreUnavailable(e.to_string()))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let storage = Self { pool };
        storage.init_schema().await?;
        Ok(storage)
    }

    /// Creates all tables if they do not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::StoreUnavailable`] on database failure.
    pub async fn init_schema(&self) -> Result<(), ClubError> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    /// Returns a reference to the underlying pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

type UserRow = (
    i64,
    Option<i64>,
    Option<String>,
    String,
    Option<String>,
    Option<String>,
    bool,
    bool,
    bool,
    bool,
    bool,
    i64,
    DateTime<Utc>,
    DateTime<Utc>,
);

const USER_COLUMNS: &str = "id, telegram_id, username, first_name, last_name, phone, \
     is_resident, is_waiter, is_bartender, is_admin, is_super_admin, \
     chips, created_at, updated_at";

fn user_from_row(row: UserRow) -> User {
    let (
        id,
        telegram_id,
        username,
        first_name,
        last_name,
        phone,
        resident,
        waiter,
        bartender,
        admin,
        super_admin,
        chips,
        created_at,
        updated_at,
    ) = row;
    User {
        id: UserId::new(id),
        telegram_id,
        username,
        first_name,
        last_name,
        phone,
        roles: RoleFlags {
            resident,
            waiter,
            bartender,
            admin,
            super_admin,
        },
        chips: from_cents(chips),
        created_at,
        updated_at,
    }
}

type SummaryRow = (
    i64,
    i64,
    Option<i64>,
    String,
    i64,
    String,
    DateTime<Utc>,
    String,
);

fn summary_from_row(row: SummaryRow) -> OrderSummary {
    let (id, user_id, waiter_id, status, total, code, created_at, items) = row;
    OrderSummary {
        id: OrderId::new(id),
        user_id: UserId::new(user_id),
        waiter_id: waiter_id.map(UserId::new),
        status,
        total_amount: from_cents(total),
        confirmation_code: code,
        created_at,
        items,
    }
}

const SUMMARY_SELECT: &str = "SELECT o.id, o.user_id, o.waiter_id, o.status, o.total_amount, \
     o.confirmation_code, o.created_at, \
     COALESCE(GROUP_CONCAT(d.name || ' x' || oi.quantity, ', '), '') AS items \
     FROM orders o \
     LEFT JOIN order_items oi ON oi.order_id = o.id \
     LEFT JOIN drinks d ON d.id = oi.drink_id";

#[async_trait]
impl Catalog for SqliteStorage {
    async fn price_of(&self, drink_id: DrinkId) -> Result<Option<DrinkPrice>, ClubError> {
        let row = sqlx::query_as::<_, (String, i64, bool)>(
            "SELECT name, price, is_available FROM drinks WHERE id = ?",
        )
        .bind(drink_id.get())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(name, price, available)| DrinkPrice {
            name,
            price: from_cents(price),
            available,
        }))
    }

    async fn list_drinks(&self) -> Result<Vec<Drink>, ClubError> {
        let rows = sqlx::query_as::<_, (i64, String, i64, Option<String>, bool)>(
            "SELECT id, name, price, category, is_available FROM drinks \
             WHERE is_available = 1 ORDER BY category, name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name, price, category, is_available)| Drink {
                id: DrinkId::new(id),
                name,
                price: from_cents(price),
                category,
                is_available,
            })
            .collect())
    }

    async fn create_drink(
        &self,
        name: &str,
        price: Decimal,
        category: Option<&str>,
    ) -> Result<Drink, ClubError> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO drinks (name, price, category, is_available, created_at, updated_at) \
             VALUES (?, ?, ?, 1, ?, ?)",
        )
        .bind(name)
        .bind(to_cents(price)?)
        .bind(category)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Drink {
            id: DrinkId::new(result.last_insert_rowid()),
            name: name.to_string(),
            price,
            category: category.map(str::to_string),
            is_available: true,
        })
    }

    async fn set_drink_availability(
        &self,
        drink_id: DrinkId,
        available: bool,
    ) -> Result<(), ClubError> {
        let result =
            sqlx::query("UPDATE drinks SET is_available = ?, updated_at = ? WHERE id = ?")
                .bind(available)
                .bind(Utc::now())
                .bind(drink_id.get())
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(ClubError::DrinkUnavailable(drink_id.get()));
        }
        Ok(())
    }
}

#[async_trait]
impl Ledger for SqliteStorage {
    async fn balance_of(&self, user_id: UserId) -> Result<Decimal, ClubError> {
        let chips = sqlx::query_scalar::<_, i64>("SELECT chips FROM users WHERE id = ?")
            .bind(user_id.get())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ClubError::UserNotFound(user_id.get()))?;

        Ok(from_cents(chips))
    }

    async fn credit(&self, user_id: UserId, amount: Decimal) -> Result<Decimal, ClubError> {
        let result = sqlx::query("UPDATE users SET chips = chips + ?, updated_at = ? WHERE id = ?")
            .bind(to_cents(amount)?)
            .bind(Utc::now())
            .bind(user_id.get())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ClubError::UserNotFound(user_id.get()));
        }
        self.balance_of(user_id).await
    }

    async fn debit(&self, user_id: UserId, amount: Decimal) -> Result<Decimal, ClubError> {
        let cents = to_cents(amount)?;

        // Decrement and the non-negative check are one statement; zero
        // affected rows means the predicate failed, never a lost update.
        let result = sqlx::query(
            "UPDATE users SET chips = chips - ?, updated_at = ? WHERE id = ? AND chips >= ?",
        )
        .bind(cents)
        .bind(Utc::now())
        .bind(user_id.get())
        .bind(cents)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let balance = self.balance_of(user_id).await?;
            return Err(ClubError::InsufficientFunds {
                balance,
                required: amount,
            });
        }
        self.balance_of(user_id).await
    }
}

#[async_trait]
impl OrderStore for SqliteStorage {
    async fn create_order(
        &self,
        user_id: UserId,
        total: Decimal,
        lines: &[PricedLine],
    ) -> Result<(OrderId, ConfirmationCode), ClubError> {
        let code = ConfirmationCode::generate();
        let now = Utc::now();

        // Header and items commit together; a failed item insert rolls the
        // header back.
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO orders (user_id, status, total_amount, confirmation_code, created_at, updated_at) \
             VALUES (?, 'new', ?, ?, ?, ?)",
        )
        .bind(user_id.get())
        .bind(to_cents(total)?)
        .bind(code.as_str())
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let order_id = OrderId::new(result.last_insert_rowid());

        for line in lines {
            sqlx::query(
                "INSERT INTO order_items (order_id, drink_id, quantity, price) VALUES (?, ?, ?, ?)",
            )
            .bind(order_id.get())
            .bind(line.drink_id.get())
            .bind(i64::from(line.quantity))
            .bind(to_cents(line.unit_price)?)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok((order_id, code))
    }

    async fn take_order(&self, order_id: OrderId, waiter_id: UserId) -> Result<(), ClubError> {
        // Optimistic claim: the status predicate and the write are one
        // statement, so two waiters can never both win.
        let result = sqlx::query(
            "UPDATE orders SET waiter_id = ?, status = 'taken', updated_at = ? \
             WHERE id = ? AND status = 'new'",
        )
        .bind(waiter_id.get())
        .bind(Utc::now())
        .bind(order_id.get())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM orders WHERE id = ?")
                .bind(order_id.get())
                .fetch_optional(&self.pool)
                .await?;
            return Err(match exists {
                Some(_) => ClubError::AlreadyTaken(order_id.get()),
                None => ClubError::OrderNotFound(order_id.get()),
            });
        }
        Ok(())
    }

    async fn complete_order(&self, order_id: OrderId, waiter_id: UserId) -> Result<(), ClubError> {
        let result = sqlx::query(
            "UPDATE orders SET status = 'completed', updated_at = ? \
             WHERE id = ? AND status = 'taken' AND waiter_id = ?",
        )
        .bind(Utc::now())
        .bind(order_id.get())
        .bind(waiter_id.get())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Diagnose why the conditional update missed.
            let row = sqlx::query_as::<_, (Option<i64>, String)>(
                "SELECT waiter_id, status FROM orders WHERE id = ?",
            )
            .bind(order_id.get())
            .fetch_optional(&self.pool)
            .await?;

            let Some((assigned, status)) = row else {
                return Err(ClubError::OrderNotFound(order_id.get()));
            };
            if status != OrderStatus::Taken.as_str() {
                return Err(ClubError::WrongState {
                    order_id: order_id.get(),
                    status,
                    expected: OrderStatus::Taken.as_str().to_string(),
                });
            }
            if assigned != Some(waiter_id.get()) {
                return Err(ClubError::NotYours(order_id.get()));
            }
            // The row matched both predicates on re-read, so the miss was
            // a concurrent transition; the caller may retry the read.
            return Err(ClubError::StoreUnavailable(
                "order transition raced, retry".to_string(),
            ));
        }
        Ok(())
    }

    async fn get_order(
        &self,
        order_id: OrderId,
    ) -> Result<Option<(Order, Vec<OrderItem>)>, ClubError> {
        let row = sqlx::query_as::<
            _,
            (
                i64,
                i64,
                Option<i64>,
                String,
                i64,
                String,
                DateTime<Utc>,
                DateTime<Utc>,
            ),
        >(
            "SELECT id, user_id, waiter_id, status, total_amount, confirmation_code, \
             created_at, updated_at FROM orders WHERE id = ?",
        )
        .bind(order_id.get())
        .fetch_optional(&self.pool)
        .await?;

        let Some((id, user_id, waiter_id, status, total, code, created_at, updated_at)) = row
        else {
            return Ok(None);
        };

        let status = OrderStatus::parse(&status)
            .ok_or_else(|| ClubError::StoreUnavailable(format!("bad order status: {status}")))?;

        let item_rows = sqlx::query_as::<_, (i64, i64, i64)>(
            "SELECT drink_id, quantity, price FROM order_items WHERE order_id = ?",
        )
        .bind(order_id.get())
        .fetch_all(&self.pool)
        .await?;

        let mut items = Vec::with_capacity(item_rows.len());
        for (drink_id, quantity, price) in item_rows {
            let quantity = u32::try_from(quantity).map_err(|_| {
                ClubError::StoreUnavailable(format!("bad item quantity: {quantity}"))
            })?;
            items.push(OrderItem {
                order_id,
                drink_id: DrinkId::new(drink_id),
                quantity,
                price: from_cents(price),
            });
        }

        Ok(Some((
            Order {
                id: OrderId::new(id),
                user_id: UserId::new(user_id),
                waiter_id: waiter_id.map(UserId::new),
                status,
                total_amount: from_cents(total),
                confirmation_code: ConfirmationCode::from_string(code),
                created_at,
                updated_at,
            },
            items,
        )))
    }

    async fn list_pending(&self) -> Result<Vec<OrderSummary>, ClubError> {
        let rows = sqlx::query_as::<_, SummaryRow>(&format!(
            "{SUMMARY_SELECT} WHERE o.status = 'new' GROUP BY o.id ORDER BY o.created_at ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(summary_from_row).collect())
    }

    async fn list_active_for(&self, waiter_id: UserId) -> Result<Vec<OrderSummary>, ClubError> {
        let rows = sqlx::query_as::<_, SummaryRow>(&format!(
            "{SUMMARY_SELECT} WHERE o.waiter_id = ? AND o.status = 'taken' \
             GROUP BY o.id ORDER BY o.created_at ASC"
        ))
        .bind(waiter_id.get())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(summary_from_row).collect())
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<OrderSummary>, ClubError> {
        let rows = sqlx::query_as::<_, SummaryRow>(&format!(
            "{SUMMARY_SELECT} WHERE o.user_id = ? GROUP BY o.id ORDER BY o.created_at DESC"
        ))
        .bind(user_id.get())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(summary_from_row).collect())
    }

    async fn count_taken_for(&self, waiter_id: UserId) -> Result<u64, ClubError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM orders WHERE waiter_id = ? AND status = 'taken'",
        )
        .bind(waiter_id.get())
        .fetch_one(&self.pool)
        .await?;

        Ok(u64::try_from(count).unwrap_or(0))
    }
}

#[async_trait]
impl ShiftStore for SqliteStorage {
    async fn insert_shift(&self, waiter_id: UserId) -> Result<ShiftId, ClubError> {
        let result = sqlx::query(
            "INSERT INTO waiter_shifts (waiter_id, status, start_time) VALUES (?, 'working', ?)",
        )
        .bind(waiter_id.get())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(ShiftId::new(result.last_insert_rowid()))
    }

    async fn find_open_shift(&self, waiter_id: UserId) -> Result<Option<Shift>, ClubError> {
        let row = sqlx::query_as::<_, (i64, i64, String, DateTime<Utc>, Option<DateTime<Utc>>)>(
            "SELECT id, waiter_id, status, start_time, end_time FROM waiter_shifts \
             WHERE waiter_id = ? AND status = 'working' AND end_time IS NULL \
             ORDER BY start_time DESC LIMIT 1",
        )
        .bind(waiter_id.get())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, waiter_id, status, start_time, end_time)| Shift {
            id: ShiftId::new(id),
            waiter_id: UserId::new(waiter_id),
            status: ShiftStatus::parse(&status).unwrap_or(ShiftStatus::Working),
            start_time,
            end_time,
        }))
    }

    async fn close_open_shift(&self, waiter_id: UserId) -> Result<bool, ClubError> {
        let result = sqlx::query(
            "UPDATE waiter_shifts SET status = 'ended', end_time = ? \
             WHERE id = (SELECT id FROM waiter_shifts \
                         WHERE waiter_id = ? AND status = 'working' AND end_time IS NULL \
                         ORDER BY start_time DESC LIMIT 1)",
        )
        .bind(Utc::now())
        .bind(waiter_id.get())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UserStore for SqliteStorage {
    async fn create_user(&self, new_user: &NewUser) -> Result<User, ClubError> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO users (telegram_id, username, first_name, last_name, phone, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(new_user.telegram_id)
        .bind(new_user.username.as_deref())
        .bind(&new_user.first_name)
        .bind(new_user.last_name.as_deref())
        .bind(new_user.phone.as_deref())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error()
                .is_some_and(|d| d.is_unique_violation())
            {
                ClubError::Conflict("username or telegram id already registered".to_string())
            } else {
                ClubError::StoreUnavailable(e.to_string())
            }
        })?;

        Ok(User {
            id: UserId::new(result.last_insert_rowid()),
            telegram_id: new_user.telegram_id,
            username: new_user.username.clone(),
            first_name: new_user.first_name.clone(),
            last_name: new_user.last_name.clone(),
            phone: new_user.phone.clone(),
            roles: RoleFlags::default(),
            chips: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_user(&self, user_id: UserId) -> Result<Option<User>, ClubError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(user_id.get())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(user_from_row))
    }

    async fn update_roles(&self, user_id: UserId, roles: RoleFlags) -> Result<(), ClubError> {
        let result = sqlx::query(
            "UPDATE users SET is_resident = ?, is_waiter = ?, is_bartender = ?, \
             is_admin = ?, is_super_admin = ?, updated_at = ? WHERE id = ?",
        )
        .bind(roles.resident)
        .bind(roles.waiter)
        .bind(roles.bartender)
        .bind(roles.admin)
        .bind(roles.super_admin)
        .bind(Utc::now())
        .bind(user_id.get())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ClubError::UserNotFound(user_id.get()));
        }
        Ok(())
    }
}

#[async_trait]
impl AuditLog for SqliteStorage {
    async fn log_chips(&self, entry: &ChipsLogEntry) -> Result<(), ClubError> {
        sqlx::query(
            "INSERT INTO chips_logs (user_id, bartender_id, amount, reason, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(entry.user_id.get())
        .bind(entry.actor.bartender_id().map(|id| id.get()))
        .bind(to_cents(entry.amount)?)
        .bind(entry.reason.as_deref())
        .bind(entry.at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn log_order(&self, entry: &OrderLogEntry) -> Result<(), ClubError> {
        sqlx::query(
            "INSERT INTO order_logs (order_id, user_id, total_amount, items_summary, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(entry.order_id.get())
        .bind(entry.user_id.get())
        .bind(to_cents(entry.total_amount)?)
        .bind(&entry.items_summary)
        .bind(entry.at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn log_waiter_action(&self, entry: &WaiterActionLogEntry) -> Result<(), ClubError> {
        sqlx::query(
            "INSERT INTO waiter_actions_logs (waiter_id, order_id, action, created_at) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(entry.waiter_id.get())
        .bind(entry.order_id.map(|id| id.get()))
        .bind(entry.action.as_str())
        .bind(entry.at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn log_role_change(&self, entry: &RoleChangeLogEntry) -> Result<(), ClubError> {
        sqlx::query(
            "INSERT INTO role_change_logs (admin_id, user_id, old_role, new_role, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(entry.admin_id.get())
        .bind(entry.user_id.get())
        .bind(entry.old_rank.name())
        .bind(entry.new_rank.name())
        .bind(entry.at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
