//! Core type definitions.
//!
//! Newtype wrappers and enums shared across the workspace.

pub mod email;
pub mod id;
pub mod price;
pub mod status;

pub use email::{Email, EmailError};
pub use id::{OrderId, ProductId, UserId};
pub use price::Price;
pub use status::{DeliveryMethod, OrderStatus};
