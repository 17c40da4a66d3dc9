//! Drink catalog handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router};

use crate::api::dto::{CreateDrinkRequest, SetAvailabilityRequest};
use crate::api::identity::Identity;
use crate::app_state::AppState;
use crate::domain::{Drink, DrinkId};
use crate::error::{ClubError, ErrorResponse};

/// `GET /drinks` — List the catalog.
///
/// # Errors
///
/// Returns [`ClubError::StoreUnavailable`] on store failure.
#[utoipa::path(
    get,
    path = "/api/v1/drinks",
    tag = "Drinks",
    summary = "List drinks",
    description = "Returns all available drinks with current prices.",
    responses(
        (status = 200, description = "Drink catalog", body = Vec<Drink>),
    )
)]
pub async fn list_drinks(State(state): State<AppState>) -> Result<impl IntoResponse, ClubError> {
    let drinks = state.orders.list_drinks().await?;
    Ok(Json(drinks))
}

/// `POST /drinks` — Add a drink to the catalog. Admin only.
///
/// # Errors
///
/// Returns [`ClubError::Forbidden`] without admin privileges and
/// [`ClubError::InvalidAmount`] for a non-positive price.
#[utoipa::path(
    post,
    path = "/api/v1/drinks",
    tag = "Drinks",
    summary = "Create a drink",
    description = "Adds a drink to the catalog, available immediately.",
    request_body = CreateDrinkRequest,
    responses(
        (status = 201, description = "Drink created", body = Drink),
        (status = 400, description = "Non-positive price", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
    )
)]
pub async fn create_drink(
    State(state): State<AppState>,
    Identity(caller): Identity,
    Json(req): Json<CreateDrinkRequest>,
) -> Result<impl IntoResponse, ClubError> {
    let drink = state
        .orders
        .create_drink(&caller, &req.name, req.price, req.category.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(drink)))
}

/// `PUT /drinks/:id/availability` — Toggle a drink. Admin only.
///
/// # Errors
///
/// Returns [`ClubError::Forbidden`] without admin privileges and
/// [`ClubError::DrinkUnavailable`] for an unknown drink.
#[utoipa::path(
    put,
    path = "/api/v1/drinks/{id}/availability",
    tag = "Drinks",
    summary = "Toggle drink availability",
    description = "Enables or disables ordering of a drink without deleting it.",
    params(("id" = i64, Path, description = "Drink id")),
    request_body = SetAvailabilityRequest,
    responses(
        (status = 204, description = "Availability updated"),
        (status = 400, description = "Unknown drink", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
    )
)]
pub async fn set_availability(
    State(state): State<AppState>,
    Identity(caller): Identity,
    Path(id): Path<i64>,
    Json(req): Json<SetAvailabilityRequest>,
) -> Result<impl IntoResponse, ClubError> {
    state
        .orders
        .set_drink_availability(&caller, DrinkId::new(id), req.available)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Drink catalog routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/drinks", get(list_drinks).post(create_drink))
        .route("/drinks/{id}/availability", put(set_availability))
}
