//! Orders and checkout fee arithmetic.
//!
//! An order is an immutable snapshot of the cart at checkout plus a fee
//! breakdown. Lines copy the name and unit price out of the catalog, so a
//! later catalog edit never changes what a historical order says was bought.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::CartItem;
use crate::types::{DeliveryMethod, OrderId, OrderStatus, Price, ProductId};

/// Flat discount applied to every order.
const FLAT_DISCOUNT_NAIRA: i64 = 1_000;
/// Flat service fee applied to every order.
const SERVICE_FEE_NAIRA: i64 = 100;

/// One ordered line, snapshotted from the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Variation color label, when a variation was selected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub unit_price: Price,
    pub quantity: u32,
    pub line_total: Price,
}

impl From<&CartItem> for OrderLine {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product.id,
            name: item.product.name.clone(),
            image: item.product.primary_image().map(ToOwned::to_owned),
            color: item
                .selected_variation
                .as_ref()
                .map(|v| v.color.clone()),
            unit_price: item.unit_price(),
            quantity: item.quantity,
            line_total: item.line_total(),
        }
    }
}

/// The checkout fee breakdown.
///
/// `total` is always `subtotal - discount + service_fee + vat +
/// delivery_fee`; the only constructor is [`FeeBreakdown::compute`], so the
/// invariant holds wherever a breakdown exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeBreakdown {
    pub subtotal: Price,
    pub discount: Price,
    pub service_fee: Price,
    pub vat: Price,
    pub delivery_fee: Price,
    pub total: Price,
}

impl FeeBreakdown {
    /// Compute the breakdown for a cart subtotal and delivery method.
    #[must_use]
    pub fn compute(subtotal: Price, method: DeliveryMethod) -> Self {
        let discount = Price::from_naira(FLAT_DISCOUNT_NAIRA);
        let service_fee = Price::from_naira(SERVICE_FEE_NAIRA);
        let vat = Price::ZERO;
        let delivery_fee = method.fee();

        Self {
            subtotal,
            discount,
            service_fee,
            vat,
            delivery_fee,
            total: subtotal - discount + service_fee + vat + delivery_fee,
        }
    }
}

/// A placed order as stored in the owner's profile document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Durable order number; the same number identifies the order through
    /// every status it passes through.
    pub order_id: OrderId,
    /// Stamped server-side; defaults to now when absent on input.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub delivery_method: DeliveryMethod,
    pub items: Vec<OrderLine>,
    #[serde(flatten)]
    pub fees: FeeBreakdown,
}

impl Order {
    /// Assemble an order from cart items.
    ///
    /// The caller decides the status (`Paid` for a paid checkout, `Invoice`
    /// for a quotation request) and supplies the already-generated order
    /// number.
    #[must_use]
    pub fn place(
        order_id: OrderId,
        created_at: DateTime<Utc>,
        status: OrderStatus,
        method: DeliveryMethod,
        cart_items: &[CartItem],
    ) -> Self {
        let items: Vec<OrderLine> = cart_items.iter().map(OrderLine::from).collect();
        let subtotal = items.iter().map(|l| l.line_total).sum();

        Self {
            order_id,
            created_at,
            status,
            delivery_method: method,
            items,
            fees: FeeBreakdown::compute(subtotal, method),
        }
    }
}
