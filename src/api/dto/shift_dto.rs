//! DTOs for waiter shifts.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ShiftId;

/// Result of opening a shift.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ShiftStartResponse {
    /// The new shift.
    pub shift_id: ShiftId,
}

/// Current shift state for the calling waiter.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ShiftStatusResponse {
    /// Whether the caller has an open shift.
    pub on_shift: bool,
}
