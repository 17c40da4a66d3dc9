//! Waiter shifts.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ids::{ShiftId, UserId};

/// Shift lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ShiftStatus {
    /// The shift is open.
    Working,
    /// The shift has been closed.
    Ended,
}

impl ShiftStatus {
    /// Stable string form used in the relational store.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Working => "working",
            Self::Ended => "ended",
        }
    }

    /// Parses the stored string form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "working" => Some(Self::Working),
            "ended" => Some(Self::Ended),
            _ => None,
        }
    }
}

impl fmt::Display for ShiftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A waiter's bounded work session.
///
/// Invariant: at most one shift per waiter is open (`end_time` null,
/// status `working`) at any instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shift {
    /// Surrogate key.
    pub id: ShiftId,
    /// The waiter working this shift.
    pub waiter_id: UserId,
    /// Lifecycle status.
    pub status: ShiftStatus,
    /// When the shift opened.
    pub start_time: DateTime<Utc>,
    /// When the shift closed. Null while open.
    pub end_time: Option<DateTime<Utc>>,
}
