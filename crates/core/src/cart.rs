//! The shopping cart and its mutation rules.
//!
//! A cart is an ordered list of items. The identity of an item is the full
//! variation key `(product id, variation color, variation price)`; add,
//! remove, and quantity updates all match on that same key, so two
//! variations sharing a color but differing in price are distinct items.
//!
//! Quantity floor policy: quantities are clamped at 1. A decrement at
//! quantity 1 leaves the item in place; items only leave the cart through
//! [`Cart::remove`] or [`Cart::clear`].

use serde::{Deserialize, Serialize};

use crate::catalog::{Product, Variation};
use crate::types::{Price, ProductId};

/// A single cart line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product: Product,
    /// Always >= 1.
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_variation: Option<Variation>,
}

impl CartItem {
    /// Whether this item matches the given full variation key.
    fn matches(&self, product_id: ProductId, variation: Option<&Variation>) -> bool {
        self.product.id == product_id && self.selected_variation.as_ref() == variation
    }

    /// Unit price: the selected variation's price if present, else the
    /// product's base price.
    #[must_use]
    pub fn unit_price(&self) -> Price {
        self.selected_variation
            .as_ref()
            .map_or(self.product.price, |v| v.price)
    }

    /// Line total (unit price x quantity).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price() * self.quantity
    }
}

/// The outcome of a cart mutation, used to drive notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartMutation {
    /// A new line was appended.
    Added,
    /// An existing line's quantity was increased by an add.
    Merged,
    /// An existing line's quantity changed (or was clamped).
    QuantityUpdated,
    /// One or more lines were removed.
    Removed,
    /// The cart was emptied.
    Cleared,
    /// No line matched the given key; the cart is unchanged.
    NoMatch,
}

/// An ordered list of cart items.
///
/// Serializes transparently as a JSON array, which is also the persisted
/// shape of the cart's `items` column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// All items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add `quantity` units of a product (optionally a specific variation).
    ///
    /// If a line with the same full variation key exists its quantity is
    /// incremented, otherwise a new line is appended. A `quantity` of 0 is
    /// treated as 1.
    pub fn add(
        &mut self,
        product: Product,
        variation: Option<Variation>,
        quantity: u32,
    ) -> CartMutation {
        let quantity = quantity.max(1);

        if let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.matches(product.id, variation.as_ref()))
        {
            item.quantity = item.quantity.saturating_add(quantity);
            return CartMutation::Merged;
        }

        self.items.push(CartItem {
            product,
            quantity,
            selected_variation: variation,
        });
        CartMutation::Added
    }

    /// Remove the line matching the full variation key.
    pub fn remove(&mut self, product_id: ProductId, variation: Option<&Variation>) -> CartMutation {
        let before = self.items.len();
        self.items
            .retain(|item| !item.matches(product_id, variation));

        if self.items.len() == before {
            CartMutation::NoMatch
        } else {
            CartMutation::Removed
        }
    }

    /// Apply a quantity delta to the matching line, clamping at 1.
    pub fn update_quantity(
        &mut self,
        product_id: ProductId,
        delta: i32,
        variation: Option<&Variation>,
    ) -> CartMutation {
        let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.matches(product_id, variation))
        else {
            return CartMutation::NoMatch;
        };

        let updated = i64::from(item.quantity) + i64::from(delta);
        item.quantity = u32::try_from(updated.max(1)).unwrap_or(u32::MAX);
        CartMutation::QuantityUpdated
    }

    /// Empty the cart. Idempotent.
    pub fn clear(&mut self) -> CartMutation {
        self.items.clear();
        CartMutation::Cleared
    }

    /// Sum of line totals.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i64, price: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: Price::from_naira(price),
            images: vec![format!("https://cdn.pepsa.example/{id}.jpg")],
            variations: Vec::new(),
        }
    }

    fn variation(color: &str, price: i64) -> Variation {
        Variation {
            color: color.to_owned(),
            price: Price::from_naira(price),
        }
    }

    #[test]
    fn test_add_distinct_keys_tracks_quantities() {
        let mut cart = Cart::default();
        cart.add(product(1, 1_000), None, 2);
        cart.add(product(1, 1_000), Some(variation("black", 1_000)), 1);
        cart.add(product(2, 500), None, 4);
        cart.add(product(1, 1_000), Some(variation("black", 1_000)), 2);

        // Three distinct keys, per-key quantity is the sum of adds
        assert_eq!(cart.len(), 3);
        let quantities: Vec<u32> = cart.items().iter().map(|i| i.quantity).collect();
        assert_eq!(quantities, vec![2, 3, 4]);
    }

    #[test]
    fn test_add_merges_same_product() {
        // Same product added twice: one entry with the summed quantity
        let mut cart = Cart::default();
        assert_eq!(cart.add(product(1, 1_000), None, 2), CartMutation::Added);
        assert_eq!(cart.add(product(1, 1_000), None, 1), CartMutation::Merged);

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].quantity, 3);
        assert_eq!(cart.subtotal(), Price::from_naira(3_000));
    }

    #[test]
    fn test_same_color_different_price_are_distinct() {
        let mut cart = Cart::default();
        cart.add(product(1, 1_000), Some(variation("black", 1_000)), 1);
        cart.add(product(1, 1_000), Some(variation("black", 1_200)), 1);
        assert_eq!(cart.len(), 2);

        // Removal matches the full key, so only one of the two goes
        cart.remove(ProductId::new(1), Some(&variation("black", 1_200)));
        assert_eq!(cart.len(), 1);
        assert_eq!(
            cart.items()[0].selected_variation,
            Some(variation("black", 1_000))
        );
    }

    #[test]
    fn test_remove_leaves_other_products() {
        let mut cart = Cart::default();
        cart.add(product(1, 1_000), None, 1);
        cart.add(product(2, 2_000), None, 1);

        assert_eq!(
            cart.remove(ProductId::new(1), None),
            CartMutation::Removed
        );
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].product.id, ProductId::new(2));
    }

    #[test]
    fn test_decrement_clamps_at_one() {
        let mut cart = Cart::default();
        cart.add(product(1, 1_000), None, 1);

        assert_eq!(
            cart.update_quantity(ProductId::new(1), -1, None),
            CartMutation::QuantityUpdated
        );
        assert_eq!(cart.items()[0].quantity, 1);
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_update_quantity_applies_delta() {
        let mut cart = Cart::default();
        cart.add(product(1, 1_000), None, 2);
        cart.update_quantity(ProductId::new(1), 3, None);
        assert_eq!(cart.items()[0].quantity, 5);
        cart.update_quantity(ProductId::new(1), -4, None);
        assert_eq!(cart.items()[0].quantity, 1);
    }

    #[test]
    fn test_add_saturates_instead_of_overflowing() {
        let mut cart = Cart::default();
        cart.add(product(1, 1_000), None, u32::MAX);

        assert_eq!(cart.add(product(1, 1_000), None, 5), CartMutation::Merged);
        assert_eq!(cart.items()[0].quantity, u32::MAX);
    }

    #[test]
    fn test_update_quantity_unknown_key() {
        let mut cart = Cart::default();
        cart.add(product(1, 1_000), None, 1);
        assert_eq!(
            cart.update_quantity(ProductId::new(2), 1, None),
            CartMutation::NoMatch
        );
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut cart = Cart::default();
        cart.add(product(1, 1_000), None, 2);

        assert_eq!(cart.clear(), CartMutation::Cleared);
        assert!(cart.is_empty());
        assert_eq!(cart.clear(), CartMutation::Cleared);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_json_roundtrip_preserves_order_and_fields() {
        let mut cart = Cart::default();
        cart.add(product(3, 750), Some(variation("gold", 900)), 2);
        cart.add(product(1, 1_000), None, 1);

        let json = serde_json::to_string(&cart).expect("serialize");
        let back: Cart = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, cart);
        assert_eq!(back.items()[0].product.id, ProductId::new(3));
    }

    #[test]
    fn test_variation_price_used_for_subtotal() {
        let mut cart = Cart::default();
        cart.add(product(1, 1_000), Some(variation("gold", 1_200)), 2);
        assert_eq!(cart.subtotal(), Price::from_naira(2_400));
    }
}
