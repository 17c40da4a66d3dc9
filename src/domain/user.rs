//! User accounts, role flags, the rank ladder, and the acting party.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ids::UserId;

/// Independent role flags held by a user. Not mutually exclusive: a
/// waiter can also be a resident, an admin can also tend the bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RoleFlags {
    /// Club resident.
    #[serde(default)]
    pub resident: bool,
    /// May take and complete orders (shift-gated).
    #[serde(default)]
    pub waiter: bool,
    /// May credit chips to users.
    #[serde(default)]
    pub bartender: bool,
    /// May mutate roles and read all orders.
    #[serde(default)]
    pub admin: bool,
    /// Full administrative access.
    #[serde(default)]
    pub super_admin: bool,
}

impl RoleFlags {
    /// Whether the holder has administrative privileges of either level.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.admin || self.super_admin
    }
}

/// Effective rank derived from role flags by priority.
///
/// Used only for human-readable audit descriptions in role-change logs;
/// authorization decisions always consult the individual flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Rank {
    /// Highest priority.
    SuperAdmin,
    /// Administrative access.
    Admin,
    /// Serving staff.
    Waiter,
    /// Club resident.
    Resident,
    /// No special flags.
    Guest,
}

impl Rank {
    /// Derives the rank from role flags, highest priority first.
    #[must_use]
    pub const fn from_flags(flags: &RoleFlags) -> Self {
        if flags.super_admin {
            Self::SuperAdmin
        } else if flags.admin {
            Self::Admin
        } else if flags.waiter {
            Self::Waiter
        } else if flags.resident {
            Self::Resident
        } else {
            Self::Guest
        }
    }

    /// Human-readable rank name for audit descriptions.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "Super admin",
            Self::Admin => "Admin",
            Self::Waiter => "Waiter",
            Self::Resident => "Resident",
            Self::Guest => "Guest",
        }
    }
}

/// A registered user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Surrogate key, assigned on first persistence and never reused.
    pub id: UserId,
    /// Optional external chat identity.
    pub telegram_id: Option<i64>,
    /// Optional external handle, unique when present.
    pub username: Option<String>,
    /// Display name.
    pub first_name: String,
    /// Optional family name.
    pub last_name: Option<String>,
    /// Optional phone number.
    pub phone: Option<String>,
    /// Role flags.
    pub roles: RoleFlags,
    /// Chips balance. Non-negative by invariant.
    pub chips: Decimal,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Data required to register a new user. Balance starts at zero and all
/// role flags start cleared.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Optional external chat identity.
    pub telegram_id: Option<i64>,
    /// Optional external handle, unique when present.
    pub username: Option<String>,
    /// Display name.
    pub first_name: String,
    /// Optional family name.
    pub last_name: Option<String>,
    /// Optional phone number.
    pub phone: Option<String>,
}

/// The party performing a chips credit.
///
/// Replaces the legacy "bartender id 0 means administrator" sentinel with
/// an explicit tagged union. Administrators are persisted as a NULL
/// bartender id in the chips log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    /// An administrator (either admin level) acting outside the bar.
    Administrator,
    /// A bartender acting under their own account.
    Bartender(UserId),
}

impl Actor {
    /// Derives the acting party from a caller's roles.
    ///
    /// Administrators take precedence over the bartender flag; a user
    /// with neither privilege yields `None`.
    #[must_use]
    pub const fn from_user(user: &User) -> Option<Self> {
        if user.roles.is_admin() {
            Some(Self::Administrator)
        } else if user.roles.bartender {
            Some(Self::Bartender(user.id))
        } else {
            None
        }
    }

    /// The bartender id to persist in the chips log, if any.
    #[must_use]
    pub const fn bartender_id(&self) -> Option<UserId> {
        match self {
            Self::Administrator => None,
            Self::Bartender(id) => Some(*id),
        }
    }
}
