//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (store reachable)
//!
//! # Products
//! GET  /products               - Product listing
//! GET  /products/{id}          - Product detail
//!
//! # Cart
//! GET  /cart                   - Cart contents with subtotal
//! POST /cart/add               - Add to cart (merge on full variation key)
//! POST /cart/update            - Apply quantity delta (clamps at 1)
//! POST /cart/remove            - Remove item (full variation key)
//! POST /cart/clear             - Empty the cart
//!
//! # Auth
//! POST /auth/register          - Register action
//! POST /auth/login             - Login action (email or phone)
//! POST /auth/logout            - Logout action
//! POST /auth/password          - Change password
//!
//! # Account (requires session)
//! GET  /account                - Profile document
//! POST /account                - Patch contact fields
//! POST /account/delivery       - Patch delivery address
//! GET  /account/orders         - Order history
//! GET  /account/orders/{id}    - Order detail
//! POST /account/orders/{id}/resubmit - Resubmit an invoice as paid
//!
//! # Checkout (requires session)
//! POST /checkout/order         - Place a paid order
//! POST /checkout/quotation     - Request a quotation (Invoice)
//!
//! # Document API (401 instead of redirect on missing session)
//! POST   /api/register         - Create auth identifier + profile document
//! GET    /api/user/{uid}       - Both records (password hash never returned)
//! PUT    /api/user/{uid}       - Whole-document overwrite (last writer wins)
//! DELETE /api/user/{uid}       - Delete both records
//! POST   /api/user/{uid}/order - Append an order (server stamps createdAt)
//! ```

pub mod account;
pub mod api;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/password", post(auth::change_password))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::show).post(account::patch_contact))
        .route("/delivery", post(account::patch_delivery))
        .route("/orders", get(account::orders))
        .route("/orders/{id}", get(account::order_detail))
        .route("/orders/{id}/resubmit", post(account::resubmit))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/order", post(checkout::place_order))
        .route("/quotation", post(checkout::request_quotation))
}

/// Create the document API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(api::register))
        .route(
            "/user/{uid}",
            get(api::get_user).put(api::put_user).delete(api::delete_user),
        )
        .route("/user/{uid}/order", post(api::append_order))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/auth", auth_routes())
        .nest("/account", account_routes())
        .nest("/checkout", checkout_routes())
        .nest("/api", api_routes())
}
