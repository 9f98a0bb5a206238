//! CRUD over the raw document API.

use axum::http::StatusCode;
use serde_json::json;

use pepsa_integration_tests::{
    SESSION_COOKIE, TestApp, body_json, delete, get, post_json, put_json, register_and_login,
};

#[tokio::test]
async fn test_api_register_then_fetch_document() {
    let app = TestApp::new();

    let response = app
        .request(post_json(
            "/api/register",
            &[],
            &json!({
                "name": "Chinedu Eze",
                "email": "chinedu@example.com",
                "phone": "+2348022222222",
                "password": "secret6",
            }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let uid = body_json(response).await["uid"]
        .as_str()
        .expect("uid")
        .to_owned();

    // Without a session the API answers 401, not a redirect
    let response = app.request(get(&format!("/api/user/{uid}"), &[])).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .request(post_json(
            "/auth/login",
            &[],
            &json!({ "identifier": "chinedu@example.com", "password": "secret6" }),
        ))
        .await;
    let session =
        pepsa_integration_tests::cookie_from(&response, SESSION_COOKIE).expect("session cookie");

    let response = app
        .request(get(
            &format!("/api/user/{uid}"),
            &[(SESSION_COOKIE, &session)],
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let document = body_json(response).await;

    assert_eq!(document["auth"]["uid"], uid.as_str());
    assert_eq!(document["auth"]["email"], "chinedu@example.com");
    assert_eq!(document["profile"]["name"], "Chinedu Eze");
    assert_eq!(document["profile"]["orders"], json!([]));

    // The password hash never crosses the API
    assert!(!document.to_string().contains("passwordHash"));
    assert!(!document.to_string().contains("argon2"));
}

#[tokio::test]
async fn test_put_rejects_a_mismatched_uid() {
    let app = TestApp::new();
    let (uid, session) = register_and_login(&app, "amara@example.com", "8011111111").await;

    let response = app
        .request(get(
            &format!("/api/user/{uid}"),
            &[(SESSION_COOKIE, &session)],
        ))
        .await;
    let mut profile = body_json(response).await["profile"].clone();
    profile["uid"] = json!("someone-else");

    let response = app
        .request(put_json(
            &format!("/api/user/{uid}"),
            &[(SESSION_COOKIE, &session)],
            &profile,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_removes_both_records() {
    let app = TestApp::new();
    let (uid, session) = register_and_login(&app, "amara@example.com", "8011111111").await;

    let response = app
        .request(delete(
            &format!("/api/user/{uid}"),
            &[(SESSION_COOKIE, &session)],
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .request(get(
            &format!("/api/user/{uid}"),
            &[(SESSION_COOKIE, &session)],
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .request(delete(
            &format!("/api/user/{uid}"),
            &[(SESSION_COOKIE, &session)],
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_append_order_stamps_created_at_server_side() {
    let app = TestApp::new();
    let (uid, session) = register_and_login(&app, "amara@example.com", "8011111111").await;

    let response = app
        .request(post_json(
            &format!("/api/user/{uid}/order"),
            &[(SESSION_COOKIE, &session)],
            &json!({
                "orderId": 33_333_333,
                "createdAt": "2000-01-01T00:00:00Z",
                "status": "Paid",
                "deliveryMethod": "Pepsa Dispatch",
                "items": [],
                "subtotal": "0",
                "discount": "0",
                "serviceFee": "0",
                "vat": "0",
                "deliveryFee": "0",
                "total": "0",
            }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let order = body_json(response).await;

    // Whatever the client sent as createdAt is replaced by the server
    assert_ne!(order["createdAt"], "2000-01-01T00:00:00Z");

    let response = app
        .request(get(
            &format!("/api/user/{uid}"),
            &[(SESSION_COOKIE, &session)],
        ))
        .await;
    let document = body_json(response).await;
    let orders = document["profile"]["orders"].as_array().expect("orders");
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["orderId"].as_i64(), Some(33_333_333));
}
