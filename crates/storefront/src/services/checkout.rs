//! Checkout: order placement and quotation requests.
//!
//! The flow is strictly ordered: delivery-address precondition, cart
//! snapshot, fee computation, order append, and only then the cart clear.
//! Any failure leaves the cart untouched; nothing is retried.

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use thiserror::Error;

use pepsa_core::{DeliveryMethod, Order, OrderId, OrderStatus, UserId};

use crate::db::{ProfileStore, RepositoryError};
use crate::services::cart::CartService;

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart has no items.
    #[error("cart is empty")]
    EmptyCart,

    /// The profile is missing or has no complete delivery address.
    #[error("delivery address required")]
    MissingDeliveryAddress,

    /// The referenced order does not exist.
    #[error("order not found")]
    OrderNotFound,

    /// Resubmission is only valid for Invoice orders.
    #[error("order is not an invoice")]
    NotAnInvoice,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Checkout service.
#[derive(Clone)]
pub struct CheckoutService {
    store: Arc<dyn ProfileStore>,
    carts: CartService,
}

impl CheckoutService {
    #[must_use]
    pub const fn new(store: Arc<dyn ProfileStore>, carts: CartService) -> Self {
        Self { store, carts }
    }

    /// Place a paid order from the cart.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::MissingDeliveryAddress` if the profile is
    /// absent or lacks a complete address, `CheckoutError::EmptyCart` for an
    /// empty cart.
    pub async fn place_order(
        &self,
        uid: &UserId,
        cart_token: &str,
        method: DeliveryMethod,
    ) -> Result<Order, CheckoutError> {
        self.submit(uid, cart_token, method, OrderStatus::Paid).await
    }

    /// Request a quotation: same flow, order lands with status `Invoice`.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`CheckoutService::place_order`].
    pub async fn request_quotation(
        &self,
        uid: &UserId,
        cart_token: &str,
        method: DeliveryMethod,
    ) -> Result<Order, CheckoutError> {
        self.submit(uid, cart_token, method, OrderStatus::Invoice)
            .await
    }

    /// Resubmit an invoice as a paid order, keeping its durable id.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::OrderNotFound` if the order does not exist,
    /// `CheckoutError::NotAnInvoice` if its status is not `Invoice`.
    pub async fn resubmit_invoice(
        &self,
        uid: &UserId,
        order_id: OrderId,
    ) -> Result<(), CheckoutError> {
        let profile = self
            .store
            .profile(uid)
            .await?
            .ok_or(CheckoutError::OrderNotFound)?;
        let order = profile.order(order_id).ok_or(CheckoutError::OrderNotFound)?;

        if order.status != OrderStatus::Invoice {
            return Err(CheckoutError::NotAnInvoice);
        }

        self.store
            .set_order_status(uid, order_id, OrderStatus::Paid)
            .await?;
        Ok(())
    }

    async fn submit(
        &self,
        uid: &UserId,
        cart_token: &str,
        method: DeliveryMethod,
        status: OrderStatus,
    ) -> Result<Order, CheckoutError> {
        let profile = self
            .store
            .profile(uid)
            .await?
            .filter(pepsa_core::UserProfile::has_delivery_address)
            .ok_or(CheckoutError::MissingDeliveryAddress)?;

        let cart = self.carts.items(cart_token).await?;
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let order = Order::place(generate_order_id(), Utc::now(), status, method, cart.items());
        self.store.append_order(&profile.uid, &order).await?;

        // Clear only after the order is durably appended
        self.carts.clear(cart_token).await?;

        tracing::info!(
            uid = %profile.uid,
            order_id = %order.order_id,
            status = %order.status,
            total = %order.fees.total,
            "order placed"
        );
        Ok(order)
    }
}

/// Random 8-digit order number.
fn generate_order_id() -> OrderId {
    OrderId::new(rand::rng().random_range(10_000_000..100_000_000))
}
