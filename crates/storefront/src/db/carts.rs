//! Persisted cart storage.
//!
//! Carts are keyed by an opaque token (the `pepsa_cart` cookie) and stored
//! as a JSONB item list. The cart service writes through this interface on
//! every mutation.

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::types::Json;

use pepsa_core::Cart;

use super::RepositoryError;

/// Narrow load/save interface the cart service writes through.
#[async_trait]
pub trait CartStorage: Send + Sync {
    /// Load the cart for a token. A missing row is an empty cart.
    async fn load(&self, token: &str) -> Result<Option<Cart>, RepositoryError>;

    /// Persist the whole item list for a token.
    async fn save(&self, token: &str, cart: &Cart) -> Result<(), RepositoryError>;
}

/// `PostgreSQL`-backed cart storage.
#[derive(Clone)]
pub struct PgCartStorage {
    pool: PgPool,
}

impl PgCartStorage {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CartStorage for PgCartStorage {
    async fn load(&self, token: &str) -> Result<Option<Cart>, RepositoryError> {
        let items: Option<Json<Cart>> =
            sqlx::query_scalar("SELECT items FROM cart WHERE token = $1")
                .bind(token)
                .fetch_optional(&self.pool)
                .await?;

        Ok(items.map(|Json(cart)| cart))
    }

    async fn save(&self, token: &str, cart: &Cart) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO cart (token, items, updated_at)
             VALUES ($1, $2, now())
             ON CONFLICT (token) DO UPDATE SET items = EXCLUDED.items, updated_at = now()",
        )
        .bind(token)
        .bind(Json(cart))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// In-memory cart storage for tests.
#[derive(Default)]
pub struct MemoryCartStorage {
    carts: std::sync::Mutex<std::collections::HashMap<String, Cart>>,
}

impl MemoryCartStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CartStorage for MemoryCartStorage {
    async fn load(&self, token: &str) -> Result<Option<Cart>, RepositoryError> {
        let carts = self
            .carts
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(carts.get(token).cloned())
    }

    async fn save(&self, token: &str, cart: &Cart) -> Result<(), RepositoryError> {
        let mut carts = self
            .carts
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        carts.insert(token.to_owned(), cart.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pepsa_core::{Price, Product, ProductId};

    fn cart_with_one_item() -> Cart {
        let mut cart = Cart::default();
        cart.add(
            Product {
                id: ProductId::new(1),
                name: "Premium Vegetable Oil 25L".to_owned(),
                price: Price::from_naira(1_000),
                images: Vec::new(),
                variations: Vec::new(),
            },
            None,
            2,
        );
        cart
    }

    #[tokio::test]
    async fn test_memory_storage_roundtrip() {
        let storage = MemoryCartStorage::new();
        assert!(storage.load("tok").await.expect("load").is_none());

        let cart = cart_with_one_item();
        storage.save("tok", &cart).await.expect("save");

        let loaded = storage.load("tok").await.expect("load").expect("present");
        assert_eq!(loaded, cart);
    }

    #[tokio::test]
    async fn test_memory_storage_isolated_by_token() {
        let storage = MemoryCartStorage::new();
        storage
            .save("alpha", &cart_with_one_item())
            .await
            .expect("save");
        assert!(storage.load("beta").await.expect("load").is_none());
    }
}
