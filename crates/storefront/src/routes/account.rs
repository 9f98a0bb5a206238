//! Account routes: profile, delivery address, order history.
//!
//! All routes require a live session. Contact and address edits go through
//! the store's targeted patch operation, never a whole-document write.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use pepsa_core::{Order, OrderId, ProfilePatch, UserProfile};

use crate::error::{AppError, Result};
use crate::middleware::RequireSession;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryRequest {
    pub address: String,
    pub landmark: String,
    pub house_number: String,
}

async fn load_profile(state: &AppState, session: &RequireSession) -> Result<UserProfile> {
    state
        .profiles()
        .profile(&session.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("profile".to_owned()))
}

/// `GET /account` - the caller's profile document.
#[tracing::instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    session: RequireSession,
) -> Result<Json<UserProfile>> {
    Ok(Json(load_profile(&state, &session).await?))
}

/// `POST /account` - patch contact fields.
#[tracing::instrument(skip_all)]
pub async fn patch_contact(
    State(state): State<AppState>,
    session: RequireSession,
    Json(request): Json<ContactRequest>,
) -> Result<StatusCode> {
    let patch = ProfilePatch {
        name: request.name,
        phone: request.phone,
        ..ProfilePatch::default()
    };
    if patch.is_empty() {
        return Err(AppError::BadRequest("nothing to update".to_owned()));
    }

    state.profiles().apply_patch(&session.user_id, &patch).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /account/delivery` - set the delivery address.
#[tracing::instrument(skip_all)]
pub async fn patch_delivery(
    State(state): State<AppState>,
    session: RequireSession,
    Json(request): Json<DeliveryRequest>,
) -> Result<StatusCode> {
    if [&request.address, &request.landmark, &request.house_number]
        .iter()
        .any(|field| field.trim().is_empty())
    {
        return Err(AppError::BadRequest(
            "address, landmark and house number are all required".to_owned(),
        ));
    }

    let patch = ProfilePatch {
        address: Some(request.address),
        landmark: Some(request.landmark),
        house_number: Some(request.house_number),
        ..ProfilePatch::default()
    };
    state.profiles().apply_patch(&session.user_id, &patch).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /account/orders` - order history, newest first.
#[tracing::instrument(skip_all)]
pub async fn orders(
    State(state): State<AppState>,
    session: RequireSession,
) -> Result<Json<Vec<Order>>> {
    let mut orders = load_profile(&state, &session).await?.orders;
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(Json(orders))
}

/// `GET /account/orders/{id}` - one order.
#[tracing::instrument(skip_all, fields(order_id = id))]
pub async fn order_detail(
    State(state): State<AppState>,
    session: RequireSession,
    Path(id): Path<i64>,
) -> Result<Json<Order>> {
    load_profile(&state, &session)
        .await?
        .order(OrderId::new(id))
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))
}

/// `POST /account/orders/{id}/resubmit` - resubmit an invoice as paid.
///
/// The order keeps its durable id through the transition.
#[tracing::instrument(skip_all, fields(order_id = id))]
pub async fn resubmit(
    State(state): State<AppState>,
    session: RequireSession,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    state
        .checkout()
        .resubmit_invoice(&session.user_id, OrderId::new(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
