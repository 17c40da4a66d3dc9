//! Waiter shift handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{ShiftStartResponse, ShiftStatusResponse};
use crate::api::identity::Identity;
use crate::app_state::AppState;
use crate::error::{ClubError, ErrorResponse};

/// `POST /shifts/start` — Open a shift for the calling waiter.
///
/// # Errors
///
/// Returns [`ClubError::Forbidden`] without the waiter role and
/// [`ClubError::AlreadyOnShift`] when a shift is already open.
#[utoipa::path(
    post,
    path = "/api/v1/shifts/start",
    tag = "Shifts",
    summary = "Start a shift",
    description = "Opens a shift for the calling waiter. A waiter can hold at most one open shift.",
    responses(
        (status = 201, description = "Shift opened", body = ShiftStartResponse),
        (status = 403, description = "Waiter role required", body = ErrorResponse),
        (status = 409, description = "Shift already open", body = ErrorResponse),
    )
)]
pub async fn start_shift(
    State(state): State<AppState>,
    Identity(caller): Identity,
) -> Result<impl IntoResponse, ClubError> {
    let shift_id = state.orders.start_shift(&caller).await?;
    Ok((StatusCode::CREATED, Json(ShiftStartResponse { shift_id })))
}

/// `POST /shifts/end` — Close the calling waiter's open shift.
///
/// # Errors
///
/// Returns [`ClubError::Forbidden`] without the waiter role,
/// [`ClubError::NoActiveShift`] when no shift is open, and
/// [`ClubError::ActiveOrdersExist`] while taken orders remain.
#[utoipa::path(
    post,
    path = "/api/v1/shifts/end",
    tag = "Shifts",
    summary = "End a shift",
    description = "Closes the open shift. Refused while the waiter still has taken orders in progress.",
    responses(
        (status = 204, description = "Shift closed"),
        (status = 403, description = "Waiter role required", body = ErrorResponse),
        (status = 409, description = "No open shift or orders in progress", body = ErrorResponse),
    )
)]
pub async fn end_shift(
    State(state): State<AppState>,
    Identity(caller): Identity,
) -> Result<impl IntoResponse, ClubError> {
    state.orders.end_shift(&caller).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /shifts/status` — Whether the caller has an open shift.
///
/// # Errors
///
/// Returns [`ClubError::StoreUnavailable`] on store failure.
#[utoipa::path(
    get,
    path = "/api/v1/shifts/status",
    tag = "Shifts",
    summary = "Shift status",
    description = "Returns whether the caller currently has an open shift.",
    responses(
        (status = 200, description = "Shift status", body = ShiftStatusResponse),
        (status = 401, description = "Unknown caller", body = ErrorResponse),
    )
)]
pub async fn shift_status(
    State(state): State<AppState>,
    Identity(caller): Identity,
) -> Result<impl IntoResponse, ClubError> {
    let on_shift = state.orders.is_on_shift(&caller).await?;
    Ok(Json(ShiftStatusResponse { on_shift }))
}

/// Shift routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/shifts/start", post(start_shift))
        .route("/shifts/end", post(end_shift))
        .route("/shifts/status", get(shift_status))
}
