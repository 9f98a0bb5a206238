//! The raw document API.
//!
//! These are the CRUD pass-throughs over the two-record store. The PUT is
//! a whole-document overwrite with last-writer-wins semantics: two
//! concurrent read-modify-write cycles through it will silently drop one
//! side's changes. First-party flows use the targeted operations instead.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pepsa_core::{Order, UserId, UserProfile};

use crate::db::RepositoryError;
use crate::error::{AppError, Result};
use crate::middleware::RequireSession;
use crate::services::auth::Registration;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRegisterRequest {
    pub name: String,
    pub email: String,
    /// Full phone number including the dialling code.
    pub phone: String,
    pub password: String,
}

/// The credential record as exposed over the API. No password hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthView {
    pub uid: String,
    pub email: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDocument {
    pub auth: AuthView,
    pub profile: UserProfile,
}

fn map_not_found(err: RepositoryError, uid: &str) -> AppError {
    match err {
        RepositoryError::NotFound => AppError::NotFound(format!("user {uid}")),
        other => AppError::Database(other),
    }
}

/// `POST /api/register` - create the auth identifier and profile document.
#[tracing::instrument(skip_all, fields(email = %request.email))]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<ApiRegisterRequest>,
) -> Result<impl IntoResponse> {
    let auth = state
        .auth()
        .register(Registration {
            name: request.name,
            email: request.email,
            country_code: String::new(),
            phone_number: request.phone,
            password: request.password.clone(),
            confirm_password: request.password,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "uid": auth.uid.as_str() })),
    ))
}

/// `GET /api/user/{uid}` - both records for a customer.
#[tracing::instrument(skip_all, fields(uid = %uid))]
pub async fn get_user(
    State(state): State<AppState>,
    _session: RequireSession,
    Path(uid): Path<String>,
) -> Result<Json<UserDocument>> {
    let uid = UserId::new(uid);
    let auth = state
        .profiles()
        .auth(&uid)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {uid}")))?;
    let profile = state
        .profiles()
        .profile(&uid)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {uid}")))?;

    Ok(Json(UserDocument {
        auth: AuthView {
            uid: auth.uid.into_inner(),
            email: auth.email.into_inner(),
            phone: auth.phone,
            created_at: auth.created_at,
        },
        profile,
    }))
}

/// `PUT /api/user/{uid}` - whole-document overwrite. Last writer wins.
#[tracing::instrument(skip_all, fields(uid = %uid))]
pub async fn put_user(
    State(state): State<AppState>,
    _session: RequireSession,
    Path(uid): Path<String>,
    Json(profile): Json<UserProfile>,
) -> Result<StatusCode> {
    let uid = UserId::new(uid);
    if profile.uid != uid {
        return Err(AppError::BadRequest(
            "document uid does not match the path".to_owned(),
        ));
    }

    state.profiles().put_profile(&uid, &profile).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/user/{uid}` - remove both records.
#[tracing::instrument(skip_all, fields(uid = %uid))]
pub async fn delete_user(
    State(state): State<AppState>,
    _session: RequireSession,
    Path(uid): Path<String>,
) -> Result<StatusCode> {
    let user_id = UserId::new(uid.clone());
    state
        .profiles()
        .delete(&user_id)
        .await
        .map_err(|e| map_not_found(e, &uid))?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/user/{uid}/order` - append an order to the history.
///
/// The server stamps `createdAt`; whatever the client sent is ignored.
#[tracing::instrument(skip_all, fields(uid = %uid))]
pub async fn append_order(
    State(state): State<AppState>,
    _session: RequireSession,
    Path(uid): Path<String>,
    Json(mut order): Json<Order>,
) -> Result<impl IntoResponse> {
    order.created_at = Utc::now();

    let user_id = UserId::new(uid.clone());
    state
        .profiles()
        .append_order(&user_id, &order)
        .await
        .map_err(|e| map_not_found(e, &uid))?;

    Ok((StatusCode::CREATED, Json(order)))
}
