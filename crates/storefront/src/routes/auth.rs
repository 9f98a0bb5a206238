//! Authentication routes.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{AppendHeaders, IntoResponse},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::auth::{SESSION_COOKIE, clear_cookie, set_cookie};
use crate::middleware::RequireSession;
use crate::services::auth::Registration;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub country_code: String,
    pub phone_number: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address or phone number.
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub uid: String,
}

/// `POST /auth/register` - create a new customer account.
#[tracing::instrument(skip_all, fields(email = %request.email))]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    let auth = state
        .auth()
        .register(Registration {
            name: request.name,
            email: request.email,
            country_code: request.country_code,
            phone_number: request.phone_number,
            password: request.password,
            confirm_password: request.confirm_password,
        })
        .await?;

    tracing::info!(uid = %auth.uid, "customer registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            uid: auth.uid.into_inner(),
        }),
    ))
}

/// `POST /auth/login` - login with email or phone plus password.
#[tracing::instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let auth = state
        .auth()
        .login(&request.identifier, &request.password)
        .await?;

    let token = state.sessions().login(auth.uid.clone());
    set_sentry_user(&auth.uid, Some(auth.email.as_str()));
    tracing::info!(uid = %auth.uid, "customer logged in");

    Ok((
        AppendHeaders([(header::SET_COOKIE, set_cookie(SESSION_COOKIE, &token))]),
        Json(json!({ "uid": auth.uid.as_str() })),
    ))
}

/// `POST /auth/logout` - end the session.
#[tracing::instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    session: RequireSession,
) -> impl IntoResponse {
    state.sessions().logout(&session.token);
    clear_sentry_user();
    tracing::info!(uid = %session.user_id, "customer logged out");

    (
        AppendHeaders([(header::SET_COOKIE, clear_cookie(SESSION_COOKIE))]),
        StatusCode::NO_CONTENT,
    )
}

/// `POST /auth/password` - change the password.
#[tracing::instrument(skip_all)]
pub async fn change_password(
    State(state): State<AppState>,
    session: RequireSession,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<StatusCode> {
    state
        .auth()
        .change_password(
            &session.user_id,
            &request.current_password,
            &request.new_password,
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
