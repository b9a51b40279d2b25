mod common;

use axum::http::{header, Method, StatusCode};
use serde_json::json;
use uuid::Uuid;

use common::TestApp;

async fn pdf_bytes(app: &TestApp, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
    let response = app.request(Method::GET, uri, None).await;
    let status = response.status();
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    (status, disposition, bytes.to_vec())
}

#[tokio::test]
async fn quote_downloads_as_pdf_named_after_its_number() {
    let app = TestApp::new().await;
    let buyer = app.seed_buyer().await;
    let (status, created) = app
        .post(
            "/api/v1/quotes",
            json!({
                "buyer_id": buyer,
                "currency": "USD",
                "exchange_rate": "83.25",
                "incoterms": "CIF Hamburg",
                "items": [
                    { "description": "Cotton poplin 40s", "hsn_code": "52081110", "quantity": "1000", "unit": "mtr", "unit_price": "1.80" },
                    { "description": "Cotton voile 60s", "quantity": "500", "unit": "mtr", "unit_price": "2.10", "tax_percent": "5" }
                ]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", created);
    let id = created["data"]["document"]["id"].as_str().expect("id");
    let number = created["data"]["document"]["number"].as_str().expect("number");

    let (status, disposition, bytes) = pdf_bytes(&app, &format!("/api/v1/quotes/{}/pdf", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(bytes.starts_with(b"%PDF-"));
    assert!(bytes.ends_with(b"%%EOF\n"));
    let disposition = disposition.expect("content disposition");
    assert!(disposition.contains(&format!("{}.pdf", number)), "{}", disposition);
}

#[tokio::test]
async fn every_kind_renders() {
    let app = TestApp::new().await;
    let buyer = app.seed_buyer().await;
    let (_, enquiry) = app
        .post(
            "/api/v1/enquiries",
            json!({
                "buyer_id": buyer,
                "subject": "Bath linen programme",
                "currency": "INR",
                "items": [{ "description": "Bath towel 600gsm", "quantity": "2000" }]
            }),
        )
        .await;
    let id = enquiry["data"]["document"]["id"].as_str().expect("id");
    let (status, _, bytes) = pdf_bytes(&app, &format!("/api/v1/enquiries/{}/pdf", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(bytes.starts_with(b"%PDF-"));

    let (_, order) = app
        .post(
            "/api/v1/export-orders",
            json!({
                "buyer_id": buyer,
                "currency": "INR",
                "final_destination": "Germany",
                "freight": "12000",
                "items": [{ "description": "Bath towel 600gsm", "quantity": "2000", "unit_price": "310" }]
            }),
        )
        .await;
    let id = order["data"]["document"]["id"].as_str().expect("id");
    let (status, _, _) = pdf_bytes(&app, &format!("/api/v1/export-orders/{}/pdf", id)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn missing_document_is_not_rendered() {
    let app = TestApp::new().await;
    let (status, _, _) = pdf_bytes(
        &app,
        &format!("/api/v1/shipping-bills/{}/pdf", Uuid::new_v4()),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn probes_report_the_database() {
    let app = TestApp::new().await;

    let (status, live) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(live["status"], "up");

    let (status, ready) = app.get("/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ready["database"]["status"], "up");
    assert_eq!(ready["environment"], "test");
}

#[tokio::test]
async fn responses_echo_the_request_id() {
    let app = TestApp::new().await;
    let request = axum::http::Request::builder()
        .uri("/api/v1/enquiries")
        .header("x-request-id", "trace-42")
        .body(axum::body::Body::empty())
        .expect("request");
    let response = tower::ServiceExt::oneshot(
        tradedocs_api::app_router(app.state.clone()),
        request,
    )
    .await
    .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok()),
        Some("trace-42")
    );
}
