//! Order handlers: placement, listings, detail, and the waiter
//! take/complete lifecycle.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    OrderDetailResponse, OrderSummaryDto, PlaceOrderRequest, PlaceOrderResponse,
};
use crate::api::identity::Identity;
use crate::app_state::AppState;
use crate::domain::{Cart, OrderId};
use crate::error::{ClubError, ErrorResponse};

/// `POST /orders` — Place an order.
///
/// # Errors
///
/// Returns [`ClubError::EmptyCart`], [`ClubError::InvalidAmount`],
/// [`ClubError::DrinkUnavailable`], or [`ClubError::InsufficientFunds`]
/// on validation failures.
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    tag = "Orders",
    summary = "Place an order",
    description = "Prices the cart, atomically debits the caller's chips, and creates the order. The confirmation code in the response is presented at pickup.",
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = PlaceOrderResponse),
        (status = 400, description = "Invalid cart or insufficient funds", body = ErrorResponse),
        (status = 401, description = "Unknown caller", body = ErrorResponse),
    )
)]
pub async fn place_order(
    State(state): State<AppState>,
    Identity(caller): Identity,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<impl IntoResponse, ClubError> {
    let placed = state.orders.place_order(&caller, &Cart::from(req)).await?;
    Ok((StatusCode::CREATED, Json(PlaceOrderResponse::from(placed))))
}

/// `GET /orders/my` — The caller's own orders, newest first.
///
/// # Errors
///
/// Returns [`ClubError::StoreUnavailable`] on store failure.
#[utoipa::path(
    get,
    path = "/api/v1/orders/my",
    tag = "Orders",
    summary = "List own orders",
    description = "Returns the caller's order history, newest first.",
    responses(
        (status = 200, description = "Order history", body = Vec<OrderSummaryDto>),
        (status = 401, description = "Unknown caller", body = ErrorResponse),
    )
)]
pub async fn my_orders(
    State(state): State<AppState>,
    Identity(caller): Identity,
) -> Result<impl IntoResponse, ClubError> {
    let summaries = state.orders.orders_for_user(&caller).await?;
    Ok(Json(
        summaries
            .into_iter()
            .map(OrderSummaryDto::from)
            .collect::<Vec<_>>(),
    ))
}

/// `GET /orders/pending` — Unclaimed orders. Waiter on shift only.
///
/// # Errors
///
/// Returns [`ClubError::Forbidden`] without the waiter role and
/// [`ClubError::NotOnShift`] without an open shift.
#[utoipa::path(
    get,
    path = "/api/v1/orders/pending",
    tag = "Orders",
    summary = "List pending orders",
    description = "Returns unclaimed orders, oldest first. Requires the waiter role and an open shift.",
    responses(
        (status = 200, description = "Pending orders", body = Vec<OrderSummaryDto>),
        (status = 403, description = "Not a waiter or not on shift", body = ErrorResponse),
    )
)]
pub async fn pending_orders(
    State(state): State<AppState>,
    Identity(caller): Identity,
) -> Result<impl IntoResponse, ClubError> {
    let summaries = state.orders.pending_orders(&caller).await?;
    Ok(Json(
        summaries
            .into_iter()
            .map(OrderSummaryDto::from)
            .collect::<Vec<_>>(),
    ))
}

/// `GET /orders/active` — The waiter's own taken orders.
///
/// # Errors
///
/// Returns [`ClubError::Forbidden`] without the waiter role.
#[utoipa::path(
    get,
    path = "/api/v1/orders/active",
    tag = "Orders",
    summary = "List own taken orders",
    description = "Returns the orders the calling waiter has taken and not yet completed, oldest first.",
    responses(
        (status = 200, description = "Taken orders", body = Vec<OrderSummaryDto>),
        (status = 403, description = "Waiter role required", body = ErrorResponse),
    )
)]
pub async fn active_orders(
    State(state): State<AppState>,
    Identity(caller): Identity,
) -> Result<impl IntoResponse, ClubError> {
    let summaries = state.orders.active_orders(&caller).await?;
    Ok(Json(
        summaries
            .into_iter()
            .map(OrderSummaryDto::from)
            .collect::<Vec<_>>(),
    ))
}

/// `GET /orders/:id` — Order detail. Buyer, assigned waiter, or admin.
///
/// # Errors
///
/// Returns [`ClubError::OrderNotFound`] for an unknown order and
/// [`ClubError::Forbidden`] for other callers.
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    tag = "Orders",
    summary = "Get order detail",
    description = "Returns the order header with its line items.",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order detail", body = OrderDetailResponse),
        (status = 403, description = "Not visible to this caller", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse),
    )
)]
pub async fn get_order(
    State(state): State<AppState>,
    Identity(caller): Identity,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ClubError> {
    let (order, items) = state.orders.get_order(&caller, OrderId::new(id)).await?;
    Ok(Json(OrderDetailResponse::from_parts(order, items)))
}

/// `POST /orders/:id/take` — Claim a pending order. First claim wins.
///
/// # Errors
///
/// Returns [`ClubError::Forbidden`], [`ClubError::NotOnShift`],
/// [`ClubError::OrderNotFound`], or [`ClubError::AlreadyTaken`].
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/take",
    tag = "Orders",
    summary = "Take an order",
    description = "Claims a pending order for the calling waiter. Exactly one waiter can win a contested claim.",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 204, description = "Order taken"),
        (status = 403, description = "Not a waiter or not on shift", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse),
        (status = 409, description = "Already taken", body = ErrorResponse),
    )
)]
pub async fn take_order(
    State(state): State<AppState>,
    Identity(caller): Identity,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ClubError> {
    state.orders.take_order(&caller, OrderId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /orders/:id/complete` — Complete a taken order.
///
/// # Errors
///
/// Returns [`ClubError::Forbidden`], [`ClubError::OrderNotFound`],
/// [`ClubError::NotYours`], or [`ClubError::WrongState`].
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/complete",
    tag = "Orders",
    summary = "Complete an order",
    description = "Marks a taken order as delivered. Only the waiter who took it may complete it.",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 204, description = "Order completed"),
        (status = 403, description = "Not the assigned waiter", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse),
        (status = 409, description = "Order is not in the taken state", body = ErrorResponse),
    )
)]
pub async fn complete_order(
    State(state): State<AppState>,
    Identity(caller): Identity,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ClubError> {
    state
        .orders
        .complete_order(&caller, OrderId::new(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Order routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", post(place_order))
        .route("/orders/my", get(my_orders))
        .route("/orders/pending", get(pending_orders))
        .route("/orders/active", get(active_orders))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/take", post(take_order))
        .route("/orders/{id}/complete", post(complete_order))
}
