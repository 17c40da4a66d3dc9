//! DTOs for user registration, balances, chips credits, and roles.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{NewUser, Rank, RoleFlags, User, UserId};

/// Registration payload.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// Optional external chat identity.
    #[serde(default)]
    pub telegram_id: Option<i64>,
    /// Optional external handle, unique when present.
    #[serde(default)]
    pub username: Option<String>,
    /// Display name. Required, non-empty.
    pub first_name: String,
    /// Optional family name.
    #[serde(default)]
    pub last_name: Option<String>,
    /// Optional phone number.
    #[serde(default)]
    pub phone: Option<String>,
}

impl From<RegisterRequest> for NewUser {
    fn from(req: RegisterRequest) -> Self {
        Self {
            telegram_id: req.telegram_id,
            username: req.username,
            first_name: req.first_name,
            last_name: req.last_name,
            phone: req.phone,
        }
    }
}

/// A user account as returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    /// User id.
    pub id: UserId,
    /// External handle, if set.
    pub username: Option<String>,
    /// Display name.
    pub first_name: String,
    /// Family name, if set.
    pub last_name: Option<String>,
    /// Phone number, if set.
    pub phone: Option<String>,
    /// Role flags.
    pub roles: RoleFlags,
    /// Human-readable rank derived from the flags.
    pub rank: String,
    /// Chips balance.
    pub chips: Decimal,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let rank = Rank::from_flags(&user.roles).name().to_string();
        Self {
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            phone: user.phone,
            roles: user.roles,
            rank,
            chips: user.chips,
            created_at: user.created_at,
        }
    }
}

/// Chips credit payload.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AddChipsRequest {
    /// Amount to credit. Must be positive.
    pub amount: Decimal,
    /// Optional free-text reason recorded in the chips log.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Balance query result.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BalanceResponse {
    /// The queried user.
    pub user_id: UserId,
    /// Current chips balance.
    pub balance: Decimal,
}

/// Role replacement payload. Flags not present default to `false`, so
/// the request always states the complete new set.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateRolesRequest {
    /// The complete new role flags.
    pub roles: RoleFlags,
}
