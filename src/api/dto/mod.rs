//! Data Transfer Objects for REST request/response serialization.
//!
//! Money amounts use `rust_decimal::Decimal`, which serializes as a JSON
//! number with exact decimal representation.

pub mod account_dto;
pub mod drink_dto;
pub mod order_dto;
pub mod shift_dto;

pub use account_dto::*;
pub use drink_dto::*;
pub use order_dto::*;
pub use shift_dto::*;
