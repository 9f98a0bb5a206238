//! Product catalog routes.

use axum::{
    Json,
    extract::{Path, State},
};

use pepsa_core::{Product, ProductId};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// `GET /products` - the full catalog.
pub async fn index(State(state): State<AppState>) -> Json<Vec<Product>> {
    Json(state.catalog().products().to_vec())
}

/// `GET /products/{id}` - one product.
pub async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Product>> {
    state
        .catalog()
        .get(ProductId::new(id))
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}
