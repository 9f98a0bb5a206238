//! Integration tests for the Pepsa storefront.
//!
//! Tests drive the full router in-process over the in-memory stores, so no
//! database or running server is required. Requests go through
//! `tower::ServiceExt::oneshot` against the same route tree the binary
//! serves.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p pepsa-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `checkout_flow` - Cart to order, including the anonymous and
//!   missing-address redirects
//! - `user_documents` - CRUD over the raw document API
//! - `lost_update` - Whole-document PUT versus the targeted order append
//! - `session_timeout` - Idle expiry and activity renewal

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use axum::response::Response;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use pepsa_core::Catalog;
use pepsa_storefront::config::StorefrontConfig;
use pepsa_storefront::db::{MemoryCartStorage, MemoryProfileStore, ProfileStore};
use pepsa_storefront::routes;
use pepsa_storefront::state::AppState;

pub use pepsa_storefront::middleware::auth::{CART_COOKIE, SESSION_COOKIE};

/// Idle timeout used by the test application.
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Password used for every test account.
pub const PASSWORD: &str = "secret6";

/// Two-product catalog for tests; product 1 has variations, product 2
/// does not.
const CATALOG: &str = r#"{
  "products": [
    {
      "id": 1,
      "name": "12.5kg Gas Cylinder",
      "price": "28500",
      "images": ["/images/products/cylinder-12-5kg-front.jpg"],
      "variations": [
        { "color": "Red", "price": "28500" },
        { "color": "Silver", "price": "29000" }
      ]
    },
    {
      "id": 2,
      "name": "Leak Detector Spray",
      "price": "2100",
      "images": [],
      "variations": []
    }
  ]
}"#;

/// The storefront application wired over in-memory stores.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    /// Kept concrete so tests can read the operation counter.
    pub store: Arc<MemoryProfileStore>,
}

impl TestApp {
    #[must_use]
    pub fn new() -> Self {
        let config = StorefrontConfig {
            database_url: SecretString::from("postgres://unused"),
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            base_url: "http://storefront.test".to_owned(),
            idle_timeout: IDLE_TIMEOUT,
            catalog_path: String::new(),
            sentry_dsn: None,
            sentry_environment: None,
        };
        let catalog = Catalog::from_json(CATALOG).expect("test catalog parses");
        let store = Arc::new(MemoryProfileStore::new());
        let state = AppState::new(
            config,
            catalog,
            Arc::clone(&store) as Arc<dyn ProfileStore>,
            Arc::new(MemoryCartStorage::new()),
        );
        let router = Router::new().merge(routes::routes()).with_state(state.clone());

        Self {
            router,
            state,
            store,
        }
    }

    /// Send one request through the router.
    ///
    /// # Panics
    ///
    /// Panics if the router fails, which it never does (`Infallible`).
    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

fn builder(
    method: Method,
    uri: &str,
    cookies: &[(&str, &str)],
) -> axum::http::request::Builder {
    let mut builder = Request::builder().method(method).uri(uri);
    if !cookies.is_empty() {
        let value = cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ");
        builder = builder.header(header::COOKIE, value);
    }
    builder
}

/// Build a GET request carrying the given cookies.
///
/// # Panics
///
/// Panics if the URI is invalid.
#[must_use]
pub fn get(uri: &str, cookies: &[(&str, &str)]) -> Request<Body> {
    builder(Method::GET, uri, cookies)
        .body(Body::empty())
        .expect("request builds")
}

/// Build a DELETE request carrying the given cookies.
///
/// # Panics
///
/// Panics if the URI is invalid.
#[must_use]
pub fn delete(uri: &str, cookies: &[(&str, &str)]) -> Request<Body> {
    builder(Method::DELETE, uri, cookies)
        .body(Body::empty())
        .expect("request builds")
}

/// Build a POST request with a JSON body.
///
/// # Panics
///
/// Panics if the URI is invalid.
#[must_use]
pub fn post_json(uri: &str, cookies: &[(&str, &str)], body: &Value) -> Request<Body> {
    builder(Method::POST, uri, cookies)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

/// Build a PUT request with a JSON body.
///
/// # Panics
///
/// Panics if the URI is invalid.
#[must_use]
pub fn put_json(uri: &str, cookies: &[(&str, &str)], body: &Value) -> Request<Body> {
    builder(Method::PUT, uri, cookies)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

/// Read and parse a JSON response body.
///
/// # Panics
///
/// Panics if the body is not valid JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    serde_json::from_slice(&bytes).expect("body is JSON")
}

/// Extract a cookie value from the response's `Set-Cookie` headers.
#[must_use]
pub fn cookie_from(response: &Response, name: &str) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_owned())
}

/// The `Location` header of a redirect response.
#[must_use]
pub fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}

/// Register a customer and log in.
///
/// Returns the uid and the session cookie value.
///
/// # Panics
///
/// Panics if registration or login does not succeed.
pub async fn register_and_login(app: &TestApp, email: &str, phone_number: &str) -> (String, String) {
    let response = app
        .request(post_json(
            "/auth/register",
            &[],
            &serde_json::json!({
                "name": "Adaeze Okonkwo",
                "email": email,
                "countryCode": "+234",
                "phoneNumber": phone_number,
                "password": PASSWORD,
                "confirmPassword": PASSWORD,
            }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let uid = body_json(response).await["uid"]
        .as_str()
        .expect("uid in register response")
        .to_owned();

    let response = app
        .request(post_json(
            "/auth/login",
            &[],
            &serde_json::json!({ "identifier": email, "password": PASSWORD }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let session = cookie_from(&response, SESSION_COOKIE).expect("session cookie set");

    (uid, session)
}
