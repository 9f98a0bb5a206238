//! Session extractors and cookie plumbing.
//!
//! The `pepsa_session` cookie is the sole authentication signal; the
//! `pepsa_cart` cookie keys the persisted cart. Any authenticated request
//! counts as activity and re-arms the session's idle timer.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, HeaderName, StatusCode, header, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use uuid::Uuid;

use pepsa_core::UserId;

use crate::state::AppState;

/// Session cookie name.
pub const SESSION_COOKIE: &str = "pepsa_session";

/// Cart token cookie name.
pub const CART_COOKIE: &str = "pepsa_cart";

/// Read a named cookie from the request headers.
#[must_use]
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_owned())
}

/// Build a `Set-Cookie` header value for a session or cart cookie.
#[must_use]
pub fn set_cookie(name: &str, value: &str) -> String {
    format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax")
}

/// Build a `Set-Cookie` header value that clears a cookie.
#[must_use]
pub fn clear_cookie(name: &str) -> String {
    format!("{name}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Error returned when authentication is required but no live session exists.
pub enum AuthRejection {
    /// Redirect to the login page (for storefront requests).
    RedirectToLogin,
    /// Unauthorized response (for `/api/` requests).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

/// Extractor that requires a live session.
///
/// Extraction itself counts as activity and re-arms the idle timer.
pub struct RequireSession {
    pub user_id: UserId,
    pub token: String,
}

impl FromRequestParts<AppState> for RequireSession {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let reject = || {
            if parts.uri.path().starts_with("/api/") {
                AuthRejection::Unauthorized
            } else {
                AuthRejection::RedirectToLogin
            }
        };

        let token = cookie_value(&parts.headers, SESSION_COOKIE).ok_or_else(reject)?;
        let user_id = state.sessions().current(&token).ok_or_else(reject)?;

        // Activity event
        state.sessions().touch(&token);

        Ok(Self { user_id, token })
    }
}

/// Extractor that optionally resolves the current session.
///
/// Unlike `RequireSession`, this does not reject anonymous requests. A live
/// session still counts as activity.
pub struct OptionalSession(pub Option<UserId>);

impl FromRequestParts<AppState> for OptionalSession {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user_id = cookie_value(&parts.headers, SESSION_COOKIE).and_then(|token| {
            let user_id = state.sessions().current(&token)?;
            state.sessions().touch(&token);
            Some(user_id)
        });

        Ok(Self(user_id))
    }
}

/// Extractor for the cart token, minting a fresh one when absent.
///
/// Handlers append [`CartToken::cookie_headers`] to their response so a
/// minted token sticks.
pub struct CartToken {
    pub token: String,
    minted: bool,
}

impl CartToken {
    /// `Set-Cookie` headers to append to the response (empty if the token
    /// came from the request).
    #[must_use]
    pub fn cookie_headers(&self) -> Vec<(HeaderName, String)> {
        if self.minted {
            vec![(header::SET_COOKIE, set_cookie(CART_COOKIE, &self.token))]
        } else {
            Vec::new()
        }
    }
}

impl<S> FromRequestParts<S> for CartToken
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match cookie_value(&parts.headers, CART_COOKIE) {
            Some(token) => Ok(Self {
                token,
                minted: false,
            }),
            None => Ok(Self {
                token: Uuid::new_v4().to_string(),
                minted: true,
            }),
        }
    }
}
