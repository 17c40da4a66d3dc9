//! Domain layer: identifiers, users and roles, the drink catalog, carts,
//! orders with their state machine, waiter shifts, and audit records.

pub mod audit;
pub mod cart;
pub mod drink;
pub mod ids;
pub mod order;
pub mod shift;
pub mod user;

pub use audit::{ChipsLogEntry, OrderLogEntry, RoleChangeLogEntry, WaiterAction, WaiterActionLogEntry};
pub use cart::{Cart, CartLine, PricedCart, PricedLine};
pub use drink::{Drink, DrinkPrice};
pub use ids::{DrinkId, OrderId, ShiftId, UserId};
pub use order::{ConfirmationCode, Order, OrderItem, OrderStatus};
pub use shift::{Shift, ShiftStatus};
pub use user::{Actor, NewUser, Rank, RoleFlags, User};
