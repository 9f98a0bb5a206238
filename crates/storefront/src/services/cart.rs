//! Cart service.
//!
//! Owns cart state behind the [`CartStorage`] interface. Every mutation
//! loads the token's cart, applies the change, and persists the whole item
//! list before returning; a mutation that changed nothing is not persisted.
//! Each applied mutation emits one [`CartEvent`] on a broadcast channel for
//! anyone showing cart notifications; dropped events are harmless.

use std::sync::Arc;

use tokio::sync::broadcast;

use pepsa_core::{Cart, CartMutation, Product, ProductId, Variation};

use crate::db::{CartStorage, RepositoryError};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// A cart mutation that was applied and persisted.
#[derive(Debug, Clone)]
pub struct CartEvent {
    pub token: String,
    pub mutation: CartMutation,
}

/// Write-through cart service.
#[derive(Clone)]
pub struct CartService {
    storage: Arc<dyn CartStorage>,
    events: broadcast::Sender<CartEvent>,
}

impl CartService {
    #[must_use]
    pub fn new(storage: Arc<dyn CartStorage>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { storage, events }
    }

    /// Subscribe to cart mutation events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CartEvent> {
        self.events.subscribe()
    }

    /// The current cart for a token. A token with no stored cart is empty.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the storage read fails.
    pub async fn items(&self, token: &str) -> Result<Cart, RepositoryError> {
        Ok(self.storage.load(token).await?.unwrap_or_default())
    }

    /// Add a product (optionally a variation) to the cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if loading or persisting fails.
    pub async fn add(
        &self,
        token: &str,
        product: Product,
        variation: Option<Variation>,
        quantity: u32,
    ) -> Result<Cart, RepositoryError> {
        let mut cart = self.items(token).await?;
        let mutation = cart.add(product, variation, quantity);
        self.persist(token, &cart, mutation).await?;
        Ok(cart)
    }

    /// Remove the line matching the full variation key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if loading or persisting fails.
    pub async fn remove(
        &self,
        token: &str,
        product_id: ProductId,
        variation: Option<&Variation>,
    ) -> Result<Cart, RepositoryError> {
        let mut cart = self.items(token).await?;
        let mutation = cart.remove(product_id, variation);
        self.persist(token, &cart, mutation).await?;
        Ok(cart)
    }

    /// Apply a quantity delta to the matching line, clamping at 1.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if loading or persisting fails.
    pub async fn update_quantity(
        &self,
        token: &str,
        product_id: ProductId,
        delta: i32,
        variation: Option<&Variation>,
    ) -> Result<Cart, RepositoryError> {
        let mut cart = self.items(token).await?;
        let mutation = cart.update_quantity(product_id, delta, variation);
        self.persist(token, &cart, mutation).await?;
        Ok(cart)
    }

    /// Empty the cart. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if persisting fails.
    pub async fn clear(&self, token: &str) -> Result<Cart, RepositoryError> {
        let mut cart = self.items(token).await?;
        let mutation = cart.clear();
        self.persist(token, &cart, mutation).await?;
        Ok(cart)
    }

    async fn persist(
        &self,
        token: &str,
        cart: &Cart,
        mutation: CartMutation,
    ) -> Result<(), RepositoryError> {
        if mutation == CartMutation::NoMatch {
            return Ok(());
        }
        self.storage.save(token, cart).await?;
        // No subscribers is fine
        let _ = self.events.send(CartEvent {
            token: token.to_owned(),
            mutation,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryCartStorage;
    use pepsa_core::Price;

    fn service() -> CartService {
        CartService::new(Arc::new(MemoryCartStorage::new()))
    }

    fn product(id: i64, price: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: Price::from_naira(price),
            images: Vec::new(),
            variations: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_mutations_persist_across_loads() {
        let carts = service();
        carts.add("tok", product(1, 1_000), None, 2).await.expect("add");
        carts.add("tok", product(1, 1_000), None, 1).await.expect("add");

        let cart = carts.items("tok").await.expect("items");
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].quantity, 3);
    }

    #[tokio::test]
    async fn test_each_mutation_emits_one_event() {
        let carts = service();
        let mut events = carts.subscribe();

        carts.add("tok", product(1, 1_000), None, 1).await.expect("add");
        carts.remove("tok", ProductId::new(1), None).await.expect("remove");

        let first = events.recv().await.expect("event");
        assert_eq!(first.mutation, CartMutation::Added);
        let second = events.recv().await.expect("event");
        assert_eq!(second.mutation, CartMutation::Removed);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_no_match_emits_nothing() {
        let carts = service();
        let mut events = carts.subscribe();

        carts
            .update_quantity("tok", ProductId::new(9), 1, None)
            .await
            .expect("update");
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_tokens_are_isolated() {
        let carts = service();
        carts.add("alpha", product(1, 1_000), None, 1).await.expect("add");

        let beta = carts.items("beta").await.expect("items");
        assert!(beta.is_empty());
    }

    #[tokio::test]
    async fn test_clear_twice_is_fine() {
        let carts = service();
        carts.add("tok", product(1, 1_000), None, 1).await.expect("add");

        let cleared = carts.clear("tok").await.expect("clear");
        assert!(cleared.is_empty());
        let cleared = carts.clear("tok").await.expect("clear again");
        assert!(cleared.is_empty());
    }
}
