//! The static product catalog.
//!
//! Products are immutable and sourced from a catalog document shipped with
//! the service. Orders snapshot the lines they contain, so later catalog
//! edits never alter historical orders.

use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};

/// A purchasable option of a product carrying its own price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variation {
    /// Color label, e.g. "black".
    pub color: String,
    /// Price override for this variation.
    pub price: Price,
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Base unit price, used when no variation is selected.
    pub price: Price,
    /// Image URLs, first entry is the primary image.
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub variations: Vec<Variation>,
}

impl Product {
    /// Look up a variation by its color label.
    #[must_use]
    pub fn variation(&self, color: &str) -> Option<&Variation> {
        self.variations.iter().find(|v| v.color == color)
    }

    /// The primary image URL, if any.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// The full product catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Build a catalog from an in-memory product list.
    #[must_use]
    pub const fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Parse a catalog from its JSON document.
    ///
    /// # Errors
    ///
    /// Returns a `serde_json::Error` if the document is malformed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Look up a product by ID.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// All products in catalog order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Catalog {
        Catalog::from_json(
            r#"{
                "products": [
                    {
                        "id": 1,
                        "name": "Premium Vegetable Oil 25L",
                        "price": "1000",
                        "images": ["https://cdn.pepsa.example/oil-25l.jpg"],
                        "variations": [
                            { "color": "black", "price": "1000" },
                            { "color": "gold", "price": "1200" }
                        ]
                    },
                    { "id": 2, "name": "Parboiled Rice 50kg", "price": "86000" }
                ]
            }"#,
        )
        .expect("valid catalog")
    }

    #[test]
    fn test_catalog_lookup() {
        let catalog = sample();
        assert_eq!(catalog.len(), 2);
        let oil = catalog.get(ProductId::new(1)).expect("product 1");
        assert_eq!(oil.name, "Premium Vegetable Oil 25L");
        assert!(catalog.get(ProductId::new(99)).is_none());
    }

    #[test]
    fn test_variation_lookup() {
        let catalog = sample();
        let oil = catalog.get(ProductId::new(1)).expect("product 1");
        assert_eq!(
            oil.variation("gold").map(|v| v.price),
            Some(Price::from_naira(1_200))
        );
        assert!(oil.variation("red").is_none());
    }

    #[test]
    fn test_missing_fields_default() {
        let rice = sample();
        let rice = rice.get(ProductId::new(2)).expect("product 2");
        assert!(rice.variations.is_empty());
        assert!(rice.primary_image().is_none());
    }
}
