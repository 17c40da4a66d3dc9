//! User account handlers: registration, lookup, balances, chips
//! credits, and role administration.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};

use crate::api::dto::{
    AddChipsRequest, BalanceResponse, RegisterRequest, UpdateRolesRequest, UserResponse,
};
use crate::api::identity::Identity;
use crate::app_state::AppState;
use crate::domain::{NewUser, UserId};
use crate::error::{ClubError, ErrorResponse};

/// `POST /users` — Register a new user.
///
/// Registration is open: no identity header is required, since the
/// caller does not exist yet.
///
/// # Errors
///
/// Returns [`ClubError::InvalidAmount`] for an empty display name and
/// [`ClubError::Conflict`] for a duplicate handle.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "Users",
    summary = "Register a new user",
    description = "Creates a user account with a zero chips balance and no roles.",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = UserResponse),
        (status = 400, description = "Invalid registration data", body = ErrorResponse),
        (status = 409, description = "Handle already taken", body = ErrorResponse),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ClubError> {
    let user = state.accounts.register(&NewUser::from(req)).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// `GET /users/:id` — Fetch a user account. Self or admin only.
///
/// # Errors
///
/// Returns [`ClubError::Forbidden`] for other callers and
/// [`ClubError::UserNotFound`] for an unknown id.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "Users",
    summary = "Get a user account",
    description = "Returns the account. Visible to the account owner and administrators.",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User account", body = UserResponse),
        (status = 403, description = "Not the owner or an admin", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Identity(caller): Identity,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ClubError> {
    let target = UserId::new(id);
    if caller.id != target && !caller.roles.is_admin() {
        return Err(ClubError::Forbidden("not your account".to_string()));
    }
    let user = state.accounts.get_user(target).await?;
    Ok(Json(UserResponse::from(user)))
}

/// `GET /users/:id/balance` — Current chips balance. Self, bartender,
/// or admin.
///
/// # Errors
///
/// Returns [`ClubError::Forbidden`] for other callers and
/// [`ClubError::UserNotFound`] for an unknown id.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/balance",
    tag = "Users",
    summary = "Get a chips balance",
    description = "Returns the user's current chips balance. Bartenders may check any balance before a top-up.",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "Current balance", body = BalanceResponse),
        (status = 403, description = "Not permitted", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn get_balance(
    State(state): State<AppState>,
    Identity(caller): Identity,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ClubError> {
    let target = UserId::new(id);
    let allowed = caller.id == target || caller.roles.bartender || caller.roles.is_admin();
    if !allowed {
        return Err(ClubError::Forbidden("not your balance".to_string()));
    }
    let balance = state.accounts.balance_of(target).await?;
    Ok(Json(BalanceResponse {
        user_id: target,
        balance,
    }))
}

/// `POST /users/:id/chips` — Credit chips to a user. Bartender or admin.
///
/// # Errors
///
/// Returns [`ClubError::Forbidden`] for unprivileged callers,
/// [`ClubError::InvalidAmount`] for a non-positive amount, and
/// [`ClubError::UserNotFound`] for an unknown recipient.
#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/chips",
    tag = "Users",
    summary = "Credit chips",
    description = "Adds chips to the user's balance and records the credit in the chips log.",
    params(("id" = i64, Path, description = "Recipient user id")),
    request_body = AddChipsRequest,
    responses(
        (status = 200, description = "New balance", body = BalanceResponse),
        (status = 400, description = "Non-positive amount", body = ErrorResponse),
        (status = 403, description = "Bartender or admin role required", body = ErrorResponse),
        (status = 404, description = "Recipient not found", body = ErrorResponse),
    )
)]
pub async fn add_chips(
    State(state): State<AppState>,
    Identity(caller): Identity,
    Path(id): Path<i64>,
    Json(req): Json<AddChipsRequest>,
) -> Result<impl IntoResponse, ClubError> {
    let target = UserId::new(id);
    let balance = state
        .accounts
        .add_chips(&caller, target, req.amount, req.reason)
        .await?;
    Ok(Json(BalanceResponse {
        user_id: target,
        balance,
    }))
}

/// `PUT /users/:id/roles` — Replace a user's role flags. Admin only.
///
/// # Errors
///
/// Returns [`ClubError::Forbidden`] without admin privileges and
/// [`ClubError::UserNotFound`] for an unknown user.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}/roles",
    tag = "Users",
    summary = "Replace role flags",
    description = "Replaces the user's role flags. Rank transitions are recorded in the role change log.",
    params(("id" = i64, Path, description = "User id")),
    request_body = UpdateRolesRequest,
    responses(
        (status = 200, description = "Updated account", body = UserResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn update_roles(
    State(state): State<AppState>,
    Identity(caller): Identity,
    Path(id): Path<i64>,
    Json(req): Json<UpdateRolesRequest>,
) -> Result<impl IntoResponse, ClubError> {
    let user = state
        .accounts
        .change_roles(&caller, UserId::new(id), req.roles)
        .await?;
    Ok(Json(UserResponse::from(user)))
}

/// User account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(register))
        .route("/users/{id}", get(get_user))
        .route("/users/{id}/balance", get(get_balance))
        .route("/users/{id}/chips", post(add_chips))
        .route("/users/{id}/roles", put(update_roles))
}
