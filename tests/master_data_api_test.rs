mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;
use uuid::Uuid;

use common::TestApp;

fn id_of(body: &serde_json::Value) -> Uuid {
    body["data"]["id"]
        .as_str()
        .and_then(|id| id.parse().ok())
        .expect("id in response")
}

#[tokio::test]
async fn entities_are_listed_by_role() {
    let app = TestApp::new().await;
    for (name, role) in [
        ("Nordhafen Trading GmbH", "buyer"),
        ("Kaveri Textiles", "supplier"),
        ("Rotterdam Forwarding BV", "consignee"),
    ] {
        let (status, body) = app
            .post(
                "/api/v1/entities",
                json!({ "name": name, "entity_type": role, "country": "Netherlands" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        assert_eq!(body["data"]["is_active"], true);
    }

    let (status, page) = app.get("/api/v1/entities?entity_type=supplier").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["data"]["total"], 1);
    assert_eq!(page["data"]["items"][0]["name"], "Kaveri Textiles");

    let (status, _) = app
        .post(
            "/api/v1/entities",
            json!({ "name": "Bad Mail Ltd", "entity_type": "buyer", "email": "not-an-email" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn entity_in_use_cannot_be_deleted() {
    let app = TestApp::new().await;
    let buyer = app.seed_buyer().await;
    let spare = app
        .seed_entity("Unused Imports Ltd", tradedocs_api::entities::business_entity::EntityType::Buyer)
        .await;

    let (status, _) = app
        .post(
            "/api/v1/enquiries",
            json!({ "buyer_id": buyer, "subject": "Towels", "currency": "INR" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let response = app
        .request(Method::DELETE, &format!("/api/v1/entities/{}", buyer), None)
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .request(Method::DELETE, &format!("/api/v1/entities/{}", spare), None)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn products_carry_their_skus() {
    let app = TestApp::new().await;
    let (status, product) = app
        .post(
            "/api/v1/products",
            json!({
                "name": "Cotton poplin",
                "hsn_code": "52081110",
                "unit": "mtr",
                "default_price": "1.80",
                "currency": "USD"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", product);
    let product_id = id_of(&product);

    let (status, _) = app
        .post(
            "/api/v1/products",
            json!({ "name": "Bad code", "hsn_code": "52AB" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    for code in ["POP-40-WHT", "POP-40-BLU"] {
        let (status, body) = app
            .post(
                "/api/v1/skus",
                json!({ "product_id": product_id, "code": code, "unit_price": "1.85", "package_type": "roll" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
    }
    let (status, _) = app
        .post(
            "/api/v1/skus",
            json!({ "product_id": product_id, "code": "POP-40-WHT" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, skus) = app
        .get(&format!("/api/v1/products/{}/skus", product_id))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(skus["data"].as_array().map(Vec::len), Some(2));

    let response = app
        .request(Method::DELETE, &format!("/api/v1/products/{}", product_id), None)
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn entity_upload_reports_rejected_lines() {
    let app = TestApp::new().await;
    let csv = "Company Name,Type,Email,Country\n\
               Nordhafen Trading GmbH,buyer,ops@nordhafen.de,Germany\n\
               Kaveri Textiles,supplier,,India\n\
               ,buyer,,\n\
               Kaveri Textiles,supplier,,India\n\
               Lagos Imports,wholesaler,,Nigeria\n";

    let (status, body) = app
        .upload("/api/v1/uploads/entities", "parties.csv", "text/csv", csv)
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let summary = &body["data"];
    assert_eq!(summary["inserted"], 2);
    assert_eq!(summary["skipped"], 3);
    let lines: Vec<u64> = summary["errors"]
        .as_array()
        .expect("errors")
        .iter()
        .filter_map(|e| e["line"].as_u64())
        .collect();
    assert_eq!(lines, vec![4, 5, 6]);
}

#[tokio::test]
async fn enquiry_upload_groups_rows_by_reference() {
    let app = TestApp::new().await;
    app.seed_buyer().await;
    let csv = "Enquiry Ref,Buyer,Product,Qty,Unit,Target Price,Currency\n\
               E1,Nordhafen Trading GmbH,Cotton poplin,1000,mtr,1.80,USD\n\
               E1,Nordhafen Trading GmbH,Cotton voile,500,mtr,2.10,USD\n\
               ,Baltic Linen OY,Linen sheeting,300,mtr,,USD\n\
               E2,Nordhafen Trading GmbH,Denim,lots,mtr,,USD\n";

    let (status, body) = app
        .upload("/api/v1/uploads/enquiries", "enquiries.csv", "text/csv", csv)
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["inserted"], 3);
    assert_eq!(body["data"]["skipped"], 1);
    assert_eq!(body["data"]["created_ids"].as_array().map(Vec::len), Some(2));

    let (_, enquiries) = app.get("/api/v1/enquiries").await;
    assert_eq!(enquiries["data"]["total"], 2);

    // The unknown buyer was created on the way
    let (_, buyers) = app.get("/api/v1/entities?entity_type=buyer").await;
    assert_eq!(buyers["data"]["total"], 2);
}

#[tokio::test]
async fn uploads_must_be_small_csv_files() {
    let app = TestApp::with_config(|cfg| cfg.max_upload_bytes = 64).await;

    let (status, _) = app
        .upload(
            "/api/v1/uploads/products",
            "catalogue.xlsx",
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            "name\nPoplin\n",
        )
        .await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let big = format!("name,description\n{}\n", "Poplin,".repeat(40));
    let (status, _) = app
        .upload("/api/v1/uploads/products", "catalogue.csv", "text/csv", &big)
        .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

    let (status, _) = app
        .upload("/api/v1/uploads/products", "catalogue.csv", "text/csv", "sku\nX\n")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn attachments_belong_to_a_document() {
    let app = TestApp::new().await;
    let buyer = app.seed_buyer().await;
    let (_, order) = app
        .post(
            "/api/v1/export-orders",
            json!({
                "buyer_id": buyer,
                "currency": "USD",
                "exchange_rate": "83",
                "items": [{ "description": "Bath towel 600gsm", "quantity": "2000", "unit_price": "3.10" }]
            }),
        )
        .await;
    let order_id = order["data"]["document"]["id"].as_str().expect("order id");

    let packing_list = json!({
        "document_kind": "export_order",
        "document_id": order_id,
        "file_name": "packing-list.pdf",
        "content_type": "Application/PDF",
        "size_bytes": 48213,
        "storage_key": "orders/packing-list.pdf",
        "uploaded_by": "logistics"
    });
    let (status, created) = app.post("/api/v1/attachments", packing_list.clone()).await;
    assert_eq!(status, StatusCode::CREATED, "{}", created);
    assert_eq!(created["data"]["content_type"], "application/pdf");

    let mut traversal = packing_list.clone();
    traversal["file_name"] = json!("../secrets.pdf");
    let (status, _) = app.post("/api/v1/attachments", traversal).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut orphan = packing_list;
    orphan["document_id"] = json!(Uuid::new_v4());
    let (status, _) = app.post("/api/v1/attachments", orphan).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, listed) = app
        .get(&format!(
            "/api/v1/attachments?kind=export_order&document_id={}",
            order_id
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["data"].as_array().map(Vec::len), Some(1));

    let id = id_of(&created);
    let response = app
        .request(Method::DELETE, &format!("/api/v1/attachments/{}", id), None)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = app
        .request(Method::DELETE, &format!("/api/v1/attachments/{}", id), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
