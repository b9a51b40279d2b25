mod common;

use axum::http::{Method, StatusCode};
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use uuid::Uuid;

use common::{decimal, TestApp};

async fn usd_proforma(app: &TestApp) -> Uuid {
    let buyer = app.seed_buyer().await;
    let (status, created) = app
        .post(
            "/api/v1/proforma-invoices",
            json!({
                "buyer_id": buyer,
                "currency": "USD",
                "exchange_rate": "83",
                "port_of_loading": "Chennai",
                "final_destination": "Hamburg",
                "items": [{ "description": "Handloom cushion covers", "quantity": "1000", "unit_price": "12.50" }]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", created);
    created["data"]["document"]["id"]
        .as_str()
        .and_then(|id| id.parse().ok())
        .expect("proforma id")
}

fn payment(document_id: Uuid, amount: &str, currency: &str) -> Value {
    json!({
        "document_kind": "proforma_invoice",
        "document_id": document_id,
        "amount": amount,
        "currency": currency,
        "method": "wire_transfer",
        "reference": "SWIFT-2231"
    })
}

async fn balance(app: &TestApp, id: Uuid) -> Value {
    let (status, body) = app
        .get(&format!("/api/v1/payments/balance/proforma_invoice/{}", id))
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    body["data"].clone()
}

#[tokio::test]
async fn payments_in_both_currencies_settle_the_invoice() {
    let app = TestApp::new().await;
    let id = usd_proforma(&app).await;

    let fresh = balance(&app, id).await;
    assert_eq!(fresh["state"], "unpaid");
    assert_eq!(decimal(&fresh["grand_total"]), dec!(12500));

    let (status, advance) = app.post("/api/v1/payments", payment(id, "5000", "USD")).await;
    assert_eq!(status, StatusCode::CREATED, "{}", advance);
    let partial = balance(&app, id).await;
    assert_eq!(partial["state"], "partially_paid");
    assert_eq!(decimal(&partial["outstanding"]), dec!(7500));

    // Rupees convert through the base currency
    let (status, _) = app.post("/api/v1/payments", payment(id, "622500", "INR")).await;
    assert_eq!(status, StatusCode::CREATED);
    let settled = balance(&app, id).await;
    assert_eq!(settled["state"], "paid");
    assert_eq!(decimal(&settled["paid"]), dec!(12500));
    assert_eq!(settled["payments"], 2);

    let (status, listed) = app
        .get(&format!(
            "/api/v1/payments?kind=proforma_invoice&document_id={}",
            id
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["data"].as_array().map(Vec::len), Some(2));

    let advance_id = advance["data"]["id"].as_str().expect("payment id");
    let response = app
        .request(Method::DELETE, &format!("/api/v1/payments/{}", advance_id), None)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(balance(&app, id).await["state"], "partially_paid");
}

#[tokio::test]
async fn paying_more_than_the_total_is_reported() {
    let app = TestApp::new().await;
    let id = usd_proforma(&app).await;

    app.post("/api/v1/payments", payment(id, "13000", "USD")).await;
    let over = balance(&app, id).await;
    assert_eq!(over["state"], "overpaid");
    assert_eq!(decimal(&over["outstanding"]), dec!(-500));
}

#[tokio::test]
async fn payments_are_refused_where_they_make_no_sense() {
    let app = TestApp::new().await;
    let id = usd_proforma(&app).await;

    let (status, _) = app.post("/api/v1/payments", payment(id, "0", "USD")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post("/api/v1/payments", payment(id, "100000000000000000000", "USD"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.post("/api/v1/payments", payment(id, "100", "12$")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // A currency that is neither the document's nor the base needs a rate
    let (status, _) = app.post("/api/v1/payments", payment(id, "100", "EUR")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut against_enquiry = payment(id, "100", "USD");
    against_enquiry["document_kind"] = json!("enquiry");
    let (status, _) = app.post("/api/v1/payments", against_enquiry).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            &format!("/api/v1/proforma-invoices/{}/actions/cancel", id),
            json!({ "reason": "buyer withdrew" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.post("/api/v1/payments", payment(id, "100", "USD")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post("/api/v1/payments", payment(Uuid::new_v4(), "100", "USD"))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
