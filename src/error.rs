//! Gateway error types with HTTP status code mapping.
//!
//! [`ClubError`] is the central error type for the gateway. Each variant
//! maps to a specific HTTP status code and structured JSON error response,
//! and every variant carries its own human-readable message — callers never
//! see a generic "error occurred".

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rust_decimal::Decimal;
use serde::Serialize;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 4001,
///     "message": "insufficient funds: balance 100.00, required 150.00",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`ClubError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category               | HTTP Status                |
/// |-----------|------------------------|----------------------------|
/// | 1000–1999 | Validation / identity  | 400 / 401 / 403            |
/// | 2000–2999 | Not found / conflicts  | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server / storage       | 500 Internal Server Error  |
/// | 4000–4999 | Ledger-specific        | 400 Bad Request            |
#[derive(Debug, thiserror::Error)]
pub enum ClubError {
    /// A cart was submitted with zero lines.
    #[error("cart must contain at least one item")]
    EmptyCart,

    /// A caller-supplied amount or quantity failed a precondition.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// A drink in the cart does not exist or is currently unavailable.
    #[error("drink {0} is unknown or unavailable")]
    DrinkUnavailable(i64),

    /// Balance below the required total. Carries both values for display.
    #[error("insufficient funds: balance {balance}, required {required}")]
    InsufficientFunds {
        /// The user's current chips balance.
        balance: Decimal,
        /// The total the operation required.
        required: Decimal,
    },

    /// No verified caller identity was supplied.
    #[error("missing or unknown caller identity")]
    Unauthorized,

    /// The caller lacks the role required for this operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A waiter attempted an order action without an active shift.
    #[error("waiter {0} is not on shift")]
    NotOnShift(i64),

    /// Referenced user does not exist.
    #[error("user {0} not found")]
    UserNotFound(i64),

    /// Referenced order does not exist.
    #[error("order {0} not found")]
    OrderNotFound(i64),

    /// The order was already claimed by another waiter.
    #[error("order {0} has already been taken")]
    AlreadyTaken(i64),

    /// The order is not in the state the transition requires.
    #[error("order {order_id} is '{status}', expected '{expected}'")]
    WrongState {
        /// The order in question.
        order_id: i64,
        /// Its current status.
        status: String,
        /// The status the transition required.
        expected: String,
    },

    /// The order is assigned to a different waiter.
    #[error("order {0} is assigned to another waiter")]
    NotYours(i64),

    /// The waiter already has an open shift.
    #[error("waiter {0} is already on shift")]
    AlreadyOnShift(i64),

    /// The waiter still has taken orders and cannot close the shift.
    #[error("waiter {0} still has orders in progress")]
    ActiveOrdersExist(i64),

    /// The waiter has no open shift to close.
    #[error("waiter {0} has no active shift")]
    NoActiveShift(i64),

    /// A uniqueness constraint was violated (e.g. duplicate handle).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The relational store failed to respond. Retryable by the caller.
    #[error("storage unavailable: {0}")]
    StoreUnavailable(String),

    /// A debit was taken but order creation failed AND the compensating
    /// credit also failed. Requires manual operator intervention.
    #[error(
        "order creation failed and the compensating credit of {amount} \
         to user {user_id} also failed; manual intervention required"
    )]
    CompensationFailed {
        /// The user whose chips could not be restored.
        user_id: i64,
        /// The amount that was debited and not re-credited.
        amount: Decimal,
    },
}

impl ClubError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::EmptyCart => 1001,
            Self::InvalidAmount(_) => 1002,
            Self::DrinkUnavailable(_) => 1003,
            Self::Unauthorized => 1100,
            Self::Forbidden(_) => 1101,
            Self::NotOnShift(_) => 1102,
            Self::UserNotFound(_) => 2001,
            Self::OrderNotFound(_) => 2002,
            Self::AlreadyTaken(_) => 2101,
            Self::WrongState { .. } => 2102,
            Self::NotYours(_) => 2103,
            Self::AlreadyOnShift(_) => 2104,
            Self::ActiveOrdersExist(_) => 2105,
            Self::NoActiveShift(_) => 2106,
            Self::Conflict(_) => 2107,
            Self::StoreUnavailable(_) => 3001,
            Self::CompensationFailed { .. } => 3002,
            Self::InsufficientFunds { .. } => 4001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::EmptyCart
            | Self::InvalidAmount(_)
            | Self::DrinkUnavailable(_)
            | Self::InsufficientFunds { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) | Self::NotOnShift(_) | Self::NotYours(_) => StatusCode::FORBIDDEN,
            Self::UserNotFound(_) | Self::OrderNotFound(_) => StatusCode::NOT_FOUND,
            Self::AlreadyTaken(_)
            | Self::WrongState { .. }
            | Self::AlreadyOnShift(_)
            | Self::ActiveOrdersExist(_)
            | Self::NoActiveShift(_)
            | Self::Conflict(_) => StatusCode::CONFLICT,
            Self::StoreUnavailable(_) | Self::CompensationFailed { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ClubError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

impl From<sqlx::Error> for ClubError {
    fn from(e: sqlx::Error) -> Self {
        Self::StoreUnavailable(e.to_string())
    }
}
