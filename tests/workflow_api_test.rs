mod common;

use axum::http::{Method, StatusCode};
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use test_case::test_case;
use uuid::Uuid;

use common::{decimal, TestApp};

fn quote_body(buyer_id: Uuid, quantity: &str, unit_price: &str, discount: &str) -> Value {
    json!({
        "buyer_id": buyer_id,
        "currency": "INR",
        "incoterms": "FOB",
        "payment_terms": "30% advance, balance against documents",
        "items": [{
            "description": "Cotton twill 2/1",
            "hsn_code": "52094200",
            "quantity": quantity,
            "unit": "mtr",
            "unit_price": unit_price,
            "discount_percent": discount
        }]
    })
}

async fn create_quote(app: &TestApp, body: Value) -> Uuid {
    let (status, created) = app.post("/api/v1/quotes", body).await;
    assert_eq!(status, StatusCode::CREATED, "{}", created);
    created["data"]["document"]["id"]
        .as_str()
        .and_then(|id| id.parse().ok())
        .expect("quote id")
}

async fn act(app: &TestApp, kind: &str, id: Uuid, action: &str) -> (StatusCode, Value) {
    app.post(
        &format!("/api/v1/{}/{}/actions/{}", kind, id, action),
        json!({ "actor": "director", "note": "reviewed" }),
    )
    .await
}

#[test_case("1000", "100", "0", "approved" ; "small quote is approved on submit")]
#[test_case("10000", "60", "0", "pending" ; "quote above the value threshold waits")]
#[test_case("100", "100", "15", "pending" ; "deep discount waits")]
#[test_case("100", "100", "10", "approved" ; "discount at the threshold passes")]
#[tokio::test]
async fn submit_applies_the_approval_policy(quantity: &str, price: &str, discount: &str, expected: &str) {
    let app = TestApp::new().await;
    let buyer = app.seed_buyer().await;
    let id = create_quote(&app, quote_body(buyer, quantity, price, discount)).await;

    let (status, body) = act(&app, "quotes", id, "submit").await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["document"]["status"], expected);
}

#[tokio::test]
async fn pending_quote_is_approved_by_a_person() {
    let app = TestApp::new().await;
    let buyer = app.seed_buyer().await;
    let id = create_quote(&app, quote_body(buyer, "10000", "60", "0")).await;

    act(&app, "quotes", id, "submit").await;
    let (_, actions) = app.get(&format!("/api/v1/quotes/{}/actions", id)).await;
    assert_eq!(actions["data"]["actions"], json!(["approve", "reject", "cancel"]));

    let (status, body) = act(&app, "quotes", id, "approve").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["document"]["status"], "approved");
    assert_eq!(body["data"]["document"]["approved_by"], "director");
    assert_eq!(body["data"]["document"]["approval_required"], true);
}

#[tokio::test]
async fn submitted_quote_is_locked_until_revised() {
    let app = TestApp::new().await;
    let buyer = app.seed_buyer().await;
    let id = create_quote(&app, quote_body(buyer, "100", "100", "0")).await;
    act(&app, "quotes", id, "submit").await;

    let uri = format!("/api/v1/quotes/{}", id);
    let (status, _) = app
        .json(Method::PUT, &uri, Some(quote_body(buyer, "200", "100", "0")))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = act(&app, "quotes", id, "revise").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["document"]["status"], "revised");
    assert_eq!(body["data"]["document"]["version"], 2);

    let (status, body) = app
        .json(Method::PUT, &uri, Some(quote_body(buyer, "200", "100", "0")))
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(decimal(&body["data"]["document"]["grand_total"]), dec!(20000));
    assert_eq!(body["data"]["document"]["version"], 2);

    let (_, history) = app.get(&format!("/api/v1/quotes/{}/history", id)).await;
    let actions: Vec<&str> = history["data"]
        .as_array()
        .expect("history")
        .iter()
        .filter_map(|entry| entry["action"].as_str())
        .collect();
    assert_eq!(actions.last(), Some(&"revise"));
    assert!(actions.contains(&"submit"));
}

#[tokio::test]
async fn only_drafts_and_cancelled_documents_can_be_deleted() {
    let app = TestApp::new().await;
    let buyer = app.seed_buyer().await;
    let id = create_quote(&app, quote_body(buyer, "100", "100", "0")).await;
    let uri = format!("/api/v1/quotes/{}", id);

    act(&app, "quotes", id, "submit").await;
    let response = app.request(Method::DELETE, &uri, None).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let (status, _) = act(&app, "quotes", id, "cancel").await;
    assert_eq!(status, StatusCode::OK);
    let response = app.request(Method::DELETE, &uri, None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let (status, _) = app.get(&uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn actions_outside_the_workflow_are_conflicts() {
    let app = TestApp::new().await;
    let buyer = app.seed_buyer().await;
    let id = create_quote(&app, quote_body(buyer, "100", "100", "0")).await;

    let (status, body) = act(&app, "quotes", id, "ship").await;
    assert_eq!(status, StatusCode::CONFLICT, "{}", body);

    // Converting has its own endpoint
    act(&app, "quotes", id, "submit").await;
    let (status, _) = act(&app, "quotes", id, "convert").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = act(&app, "quotes", Uuid::new_v4(), "submit").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn shipped_export_order_cannot_be_cancelled() {
    let app = TestApp::new().await;
    let buyer = app.seed_buyer().await;
    let (status, created) = app
        .post(
            "/api/v1/export-orders",
            json!({
                "buyer_id": buyer,
                "currency": "INR",
                "final_destination": "Rotterdam",
                "items": [{ "description": "Terry towels", "quantity": "500", "unit_price": "220" }]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", created);
    let id: Uuid = created["data"]["document"]["id"]
        .as_str()
        .and_then(|id| id.parse().ok())
        .expect("export order id");

    act(&app, "export-orders", id, "confirm").await;
    let (status, body) = act(&app, "export-orders", id, "ship").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["allowed_actions"], json!(["complete", "convert"]));

    let (status, _) = act(&app, "export-orders", id, "cancel").await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn documents_need_a_known_buyer() {
    let app = TestApp::new().await;
    let (status, _) = app
        .post("/api/v1/quotes", quote_body(Uuid::new_v4(), "1", "1", "0"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let supplier = app.seed_supplier().await;
    let (status, _) = app
        .post("/api/v1/quotes", quote_body(supplier, "1", "1", "0"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_lines_and_charges_are_rejected() {
    let app = TestApp::new().await;
    let buyer = app.seed_buyer().await;

    let huge = "100000000000000000000";
    let (status, body) = app
        .post("/api/v1/quotes", quote_body(buyer, huge, huge, "0"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);

    let (status, _) = app
        .post(
            "/api/v1/proforma-invoices",
            json!({
                "buyer_id": buyer,
                "currency": "INR",
                "freight": "79228162514264337593543950335",
                "items": [{ "description": "Cotton twill 2/1", "quantity": "1", "unit_price": "1" }]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // The server is still answering
    let (status, _) = app.get("/api/v1/quotes").await;
    assert_eq!(status, StatusCode::OK);
}
