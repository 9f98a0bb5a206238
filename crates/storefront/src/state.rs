//! Application state shared across handlers.

use std::sync::Arc;

use pepsa_core::Catalog;

use crate::config::StorefrontConfig;
use crate::db::{CartStorage, ProfileStore};
use crate::services::{AuthService, CartService, CheckoutService, SessionService};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources: the document store, the catalog, and the services.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
    profiles: Arc<dyn ProfileStore>,
    auth: AuthService,
    carts: CartService,
    sessions: SessionService,
    checkout: CheckoutService,
}

impl AppState {
    /// Create a new application state over the given store implementations.
    #[must_use]
    pub fn new(
        config: StorefrontConfig,
        catalog: Catalog,
        profiles: Arc<dyn ProfileStore>,
        cart_storage: Arc<dyn CartStorage>,
    ) -> Self {
        let carts = CartService::new(cart_storage);
        let sessions = SessionService::new(config.idle_timeout);
        let checkout = CheckoutService::new(Arc::clone(&profiles), carts.clone());
        let auth = AuthService::new(Arc::clone(&profiles));

        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                profiles,
                auth,
                carts,
                sessions,
                checkout,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get a reference to the user document store.
    #[must_use]
    pub fn profiles(&self) -> &Arc<dyn ProfileStore> {
        &self.inner.profiles
    }

    /// Get a reference to the authentication service.
    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    /// Get a reference to the cart service.
    #[must_use]
    pub fn carts(&self) -> &CartService {
        &self.inner.carts
    }

    /// Get a reference to the session service.
    #[must_use]
    pub fn sessions(&self) -> &SessionService {
        &self.inner.sessions
    }

    /// Get a reference to the checkout service.
    #[must_use]
    pub fn checkout(&self) -> &CheckoutService {
        &self.inner.checkout
    }
}
