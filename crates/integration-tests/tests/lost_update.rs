//! The document API's PUT is a whole-document overwrite with
//! last-writer-wins semantics: two read-modify-write cycles through it
//! silently drop the first writer's changes. The targeted order append
//! does not have this hazard, which is why first-party flows use it.

use axum::http::StatusCode;
use serde_json::{Value, json};

use pepsa_integration_tests::{
    SESSION_COOKIE, TestApp, body_json, get, post_json, put_json, register_and_login,
};

fn order_json(order_id: i64) -> Value {
    json!({
        "orderId": order_id,
        "status": "Paid",
        "deliveryMethod": "Self Pickup",
        "items": [],
        "subtotal": "0",
        "discount": "0",
        "serviceFee": "0",
        "vat": "0",
        "deliveryFee": "0",
        "total": "0",
    })
}

async fn fetch_profile(app: &TestApp, uid: &str, session: &str) -> Value {
    let response = app
        .request(get(
            &format!("/api/user/{uid}"),
            &[(SESSION_COOKIE, session)],
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["profile"].clone()
}

#[tokio::test]
async fn test_concurrent_document_puts_drop_one_side() {
    let app = TestApp::new();
    let (uid, session) = register_and_login(&app, "amara@example.com", "8011111111").await;

    // Both writers read the same (empty-history) snapshot
    let snapshot_a = fetch_profile(&app, &uid, &session).await;
    let snapshot_b = snapshot_a.clone();

    let mut doc_a = snapshot_a;
    doc_a["orders"] = json!([order_json(11_111_111)]);
    let response = app
        .request(put_json(
            &format!("/api/user/{uid}"),
            &[(SESSION_COOKIE, &session)],
            &doc_a,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let mut doc_b = snapshot_b;
    doc_b["orders"] = json!([order_json(22_222_222)]);
    let response = app
        .request(put_json(
            &format!("/api/user/{uid}"),
            &[(SESSION_COOKIE, &session)],
            &doc_b,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The second PUT overwrote the whole document; writer A's order is gone
    let profile = fetch_profile(&app, &uid, &session).await;
    let orders = profile["orders"].as_array().expect("orders array");
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["orderId"].as_i64(), Some(22_222_222));
}

#[tokio::test]
async fn test_targeted_appends_keep_both_orders() {
    let app = TestApp::new();
    let (uid, session) = register_and_login(&app, "amara@example.com", "8011111111").await;

    for order_id in [11_111_111, 22_222_222] {
        let response = app
            .request(post_json(
                &format!("/api/user/{uid}/order"),
                &[(SESSION_COOKIE, &session)],
                &order_json(order_id),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let profile = fetch_profile(&app, &uid, &session).await;
    let orders = profile["orders"].as_array().expect("orders array");
    assert_eq!(orders.len(), 2);
}
