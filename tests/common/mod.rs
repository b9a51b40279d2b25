#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use tradedocs_api::{
    config::AppConfig,
    db,
    entities::business_entity::EntityType,
    events,
    services::{business_entities::BusinessEntityInput, line_items::LineItemInput},
    AppState,
};

pub const MULTIPART_BOUNDARY: &str = "tradedocs-test-boundary";

/// Application harness backed by a private in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Builds the app after letting the caller tweak the configuration.
    pub async fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        adjust(&mut cfg);

        let pool = db::establish_connection(&cfg.database_url)
            .await
            .expect("failed to open test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let (event_sender, event_rx) = events::channel(64);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let state = AppState::new(Arc::new(pool), cfg, event_sender);
        let router = tradedocs_api::app_router(state.clone());

        Self {
            router,
            state,
            _event_task: event_task,
        }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        self.router
            .clone()
            .oneshot(builder.body(body).expect("request"))
            .await
            .expect("router responded")
    }

    /// Sends a request and decodes the JSON body.
    pub async fn json(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let response = self.request(method, uri, body).await;
        let status = response.status();
        (status, response_json(response).await)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.json(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.json(Method::POST, uri, Some(body)).await
    }

    /// Posts a CSV file as the `file` field of a multipart form.
    pub async fn upload(
        &self,
        uri: &str,
        file_name: &str,
        content_type: &str,
        contents: &str,
    ) -> (StatusCode, Value) {
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\nContent-Type: {ct}\r\n\r\n{contents}\r\n--{b}--\r\n",
            b = MULTIPART_BOUNDARY,
            name = file_name,
            ct = content_type,
            contents = contents,
        );
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY),
            )
            .body(Body::from(body))
            .expect("request");
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router responded");
        let status = response.status();
        (status, response_json(response).await)
    }

    pub async fn seed_entity(&self, name: &str, entity_type: EntityType) -> Uuid {
        self.state
            .services
            .business_entities
            .create(BusinessEntityInput {
                name: name.to_string(),
                entity_type,
                contact_person: None,
                email: None,
                phone: None,
                address: Some("12 Harbour Road".to_string()),
                city: Some("Hamburg".to_string()),
                country: Some("Germany".to_string()),
                tax_id: None,
                iec_code: None,
                is_active: true,
            })
            .await
            .expect("seed entity")
            .id
    }

    pub async fn seed_buyer(&self) -> Uuid {
        self.seed_entity("Nordhafen Trading GmbH", EntityType::Buyer).await
    }

    pub async fn seed_supplier(&self) -> Uuid {
        self.seed_entity("Kaveri Textiles", EntityType::Supplier).await
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    }
}

/// Reads a decimal that the API serialised as a string or a number.
pub fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).expect("decimal string"),
        Value::Number(n) => Decimal::from_str(&n.to_string()).expect("decimal number"),
        other => panic!("expected a decimal, got {}", other),
    }
}

pub fn line(description: &str, quantity: i64, unit_price: i64) -> LineItemInput {
    LineItemInput {
        product_id: None,
        sku_id: None,
        description: description.to_string(),
        hsn_code: Some("52081110".to_string()),
        quantity: Decimal::from(quantity),
        unit: "mtr".to_string(),
        unit_price: Decimal::from(unit_price),
        discount_percent: Decimal::ZERO,
        tax_percent: Decimal::ZERO,
    }
}
