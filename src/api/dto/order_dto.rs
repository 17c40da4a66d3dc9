//! DTOs for order placement, listings, and details.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Cart, CartLine, DrinkId, Order, OrderId, OrderItem, UserId};
use crate::service::PlacedOrder;
use crate::storage::OrderSummary;

/// Order placement payload: the cart.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PlaceOrderRequest {
    /// The (drink, quantity) lines. Must be non-empty.
    pub lines: Vec<CartLine>,
}

impl From<PlaceOrderRequest> for Cart {
    fn from(req: PlaceOrderRequest) -> Self {
        Self { lines: req.lines }
    }
}

/// Result of a successful placement. The confirmation code is shown
/// here once; listings repeat it only to the order's owner.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlaceOrderResponse {
    /// The new order.
    pub order_id: OrderId,
    /// Pickup verification code.
    pub confirmation_code: String,
    /// The debited total.
    pub total: Decimal,
    /// The buyer's balance after the debit.
    pub new_balance: Decimal,
}

impl From<PlacedOrder> for PlaceOrderResponse {
    fn from(placed: PlacedOrder) -> Self {
        Self {
            order_id: placed.order_id,
            confirmation_code: placed.confirmation_code,
            total: placed.total,
            new_balance: placed.new_balance,
        }
    }
}

/// One row of an order listing.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderSummaryDto {
    /// Order id.
    pub id: OrderId,
    /// The buyer.
    pub user_id: UserId,
    /// The assigned waiter, if taken.
    pub waiter_id: Option<UserId>,
    /// Current status.
    pub status: String,
    /// Order total in chips.
    pub total_amount: Decimal,
    /// Pickup verification code.
    pub confirmation_code: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Item summary ("Name x2, Name x1").
    pub items: String,
}

impl From<OrderSummary> for OrderSummaryDto {
    fn from(summary: OrderSummary) -> Self {
        Self {
            id: summary.id,
            user_id: summary.user_id,
            waiter_id: summary.waiter_id,
            status: summary.status,
            total_amount: summary.total_amount,
            confirmation_code: summary.confirmation_code,
            created_at: summary.created_at,
            items: summary.items,
        }
    }
}

/// One line item of an order detail.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderItemDto {
    /// The drink ordered.
    pub drink_id: DrinkId,
    /// Quantity.
    pub quantity: u32,
    /// Unit price captured at order time.
    pub price: Decimal,
}

impl From<OrderItem> for OrderItemDto {
    fn from(item: OrderItem) -> Self {
        Self {
            drink_id: item.drink_id,
            quantity: item.quantity,
            price: item.price,
        }
    }
}

/// Full order detail: header plus items.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderDetailResponse {
    /// Order id.
    pub id: OrderId,
    /// The buyer.
    pub user_id: UserId,
    /// The assigned waiter, if taken.
    pub waiter_id: Option<UserId>,
    /// Current status.
    pub status: String,
    /// Order total in chips.
    pub total_amount: Decimal,
    /// Pickup verification code.
    pub confirmation_code: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last transition timestamp.
    pub updated_at: DateTime<Utc>,
    /// The line items.
    pub items: Vec<OrderItemDto>,
}

impl OrderDetailResponse {
    /// Assembles the detail view from a header and its items.
    #[must_use]
    pub fn from_parts(order: Order, items: Vec<OrderItem>) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            waiter_id: order.waiter_id,
            status: order.status.to_string(),
            total_amount: order.total_amount,
            confirmation_code: order.confirmation_code.as_str().to_string(),
            created_at: order.created_at,
            updated_at: order.updated_at,
            items: items.into_iter().map(OrderItemDto::from).collect(),
        }
    }
}
