//! Business logic services.

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod session;

pub use auth::{AuthError, AuthService};
pub use cart::{CartEvent, CartService};
pub use checkout::{CheckoutError, CheckoutService};
pub use session::{SessionEvent, SessionService};
