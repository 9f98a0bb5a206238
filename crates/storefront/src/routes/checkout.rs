//! Checkout routes.
//!
//! The session extractor runs before anything else, so an anonymous
//! checkout is redirected to `/login` without a single store access. A
//! profile without a complete delivery address redirects to the address
//! page with the cart untouched.

use axum::{
    Json,
    extract::State,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use pepsa_core::DeliveryMethod;

use crate::error::{AppError, Result};
use crate::middleware::{CartToken, RequireSession};
use crate::services::checkout::CheckoutError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub delivery_method: DeliveryMethod,
}

fn respond(
    token: &CartToken,
    result: std::result::Result<pepsa_core::Order, CheckoutError>,
) -> Result<Response> {
    match result {
        Ok(order) => Ok((
            AppendHeaders(token.cookie_headers()),
            Json(order),
        )
            .into_response()),
        // Address first; the cart is untouched
        Err(CheckoutError::MissingDeliveryAddress) => {
            Ok(Redirect::to("/account/delivery").into_response())
        }
        Err(err) => Err(AppError::from(err)),
    }
}

/// `POST /checkout/order` - place a paid order from the cart.
#[tracing::instrument(skip_all, fields(uid = %session.user_id))]
pub async fn place_order(
    State(state): State<AppState>,
    session: RequireSession,
    token: CartToken,
    Json(request): Json<CheckoutRequest>,
) -> Result<Response> {
    let result = state
        .checkout()
        .place_order(&session.user_id, &token.token, request.delivery_method)
        .await;
    respond(&token, result)
}

/// `POST /checkout/quotation` - request a quotation (status `Invoice`).
#[tracing::instrument(skip_all, fields(uid = %session.user_id))]
pub async fn request_quotation(
    State(state): State<AppState>,
    session: RequireSession,
    token: CartToken,
    Json(request): Json<CheckoutRequest>,
) -> Result<Response> {
    let result = state
        .checkout()
        .request_quotation(&session.user_id, &token.token, request.delivery_method)
        .await;
    respond(&token, result)
}
