//! Cart routes.
//!
//! Mutations resolve the product (and variation, when a color is given)
//! from the catalog, so the cart always carries catalog-sourced snapshots.

use axum::{
    Json,
    extract::State,
    response::{AppendHeaders, IntoResponse},
};
use serde::{Deserialize, Serialize};

use pepsa_core::{Cart, CartItem, Price, Product, ProductId, Variation};

use crate::error::{AppError, Result};
use crate::middleware::CartToken;
use crate::state::AppState;

/// Wire shape for the cart: items plus the running subtotal.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub items: Vec<CartItem>,
    pub subtotal: Price,
}

impl From<Cart> for CartResponse {
    fn from(cart: Cart) -> Self {
        Self {
            subtotal: cart.subtotal(),
            items: cart.items().to_vec(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddRequest {
    pub product_id: i64,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub quantity: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    pub product_id: i64,
    pub delta: i32,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveRequest {
    pub product_id: i64,
    #[serde(default)]
    pub color: Option<String>,
}

/// Resolve a catalog product and, when a color is given, its variation.
fn resolve(
    state: &AppState,
    product_id: i64,
    color: Option<&str>,
) -> Result<(Product, Option<Variation>)> {
    let product = state
        .catalog()
        .get(ProductId::new(product_id))
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;

    let variation = match color {
        Some(color) => Some(
            product
                .variation(color)
                .cloned()
                .ok_or_else(|| AppError::BadRequest(format!("unknown variation: {color}")))?,
        ),
        None => None,
    };

    Ok((product, variation))
}

/// `GET /cart` - current cart with subtotal.
#[tracing::instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    token: CartToken,
) -> Result<impl IntoResponse> {
    let cart = state.carts().items(&token.token).await?;
    Ok((
        AppendHeaders(token.cookie_headers()),
        Json(CartResponse::from(cart)),
    ))
}

/// `POST /cart/add` - add a product (merges on the full variation key).
#[tracing::instrument(skip_all, fields(product_id = request.product_id))]
pub async fn add(
    State(state): State<AppState>,
    token: CartToken,
    Json(request): Json<AddRequest>,
) -> Result<impl IntoResponse> {
    let (product, variation) = resolve(&state, request.product_id, request.color.as_deref())?;
    let cart = state
        .carts()
        .add(
            &token.token,
            product,
            variation,
            request.quantity.unwrap_or(1),
        )
        .await?;

    Ok((
        AppendHeaders(token.cookie_headers()),
        Json(CartResponse::from(cart)),
    ))
}

/// `POST /cart/update` - apply a quantity delta (clamps at 1).
#[tracing::instrument(skip_all, fields(product_id = request.product_id))]
pub async fn update(
    State(state): State<AppState>,
    token: CartToken,
    Json(request): Json<UpdateRequest>,
) -> Result<impl IntoResponse> {
    let (product, variation) = resolve(&state, request.product_id, request.color.as_deref())?;
    let cart = state
        .carts()
        .update_quantity(&token.token, product.id, request.delta, variation.as_ref())
        .await?;

    Ok((
        AppendHeaders(token.cookie_headers()),
        Json(CartResponse::from(cart)),
    ))
}

/// `POST /cart/remove` - remove the line matching the full variation key.
#[tracing::instrument(skip_all, fields(product_id = request.product_id))]
pub async fn remove(
    State(state): State<AppState>,
    token: CartToken,
    Json(request): Json<RemoveRequest>,
) -> Result<impl IntoResponse> {
    let (product, variation) = resolve(&state, request.product_id, request.color.as_deref())?;
    let cart = state
        .carts()
        .remove(&token.token, product.id, variation.as_ref())
        .await?;

    Ok((
        AppendHeaders(token.cookie_headers()),
        Json(CartResponse::from(cart)),
    ))
}

/// `POST /cart/clear` - empty the cart.
#[tracing::instrument(skip_all)]
pub async fn clear(
    State(state): State<AppState>,
    token: CartToken,
) -> Result<impl IntoResponse> {
    let cart = state.carts().clear(&token.token).await?;
    Ok((
        AppendHeaders(token.cookie_headers()),
        Json(CartResponse::from(cart)),
    ))
}
