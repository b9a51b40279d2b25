use super::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
};
use crate::{
    entities::payment,
    errors::ApiError,
    handlers::AppState,
    services::payments::{PaymentBalance, PaymentInput},
    workflow::DocumentKind,
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{delete, get},
    Router,
};
use serde::Deserialize;
use tracing::info;
use utoipa::IntoParams;
use uuid::Uuid;

/// Identifies the document a payment or attachment belongs to.
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
pub struct DocumentRef {
    pub kind: DocumentKind,
    pub document_id: Uuid,
}

/// Record a payment received against a proforma invoice or export order
#[utoipa::path(
    post,
    path = "/api/v1/payments",
    request_body = PaymentInput,
    responses(
        (status = 201, description = "Payment recorded", body = crate::ApiResponse<payment::Model>),
        (status = 400, description = "Invalid payment or document kind", body = crate::errors::ErrorResponse),
        (status = 404, description = "Document not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Document is cancelled", body = crate::errors::ErrorResponse)
    ),
    tag = "payments"
)]
pub async fn record_payment(
    State(state): State<AppState>,
    Json(payload): Json<PaymentInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let payment = state
        .services
        .payments
        .record(payload)
        .await
        .map_err(map_service_error)?;
    info!(payment_id = %payment.id, amount = %payment.amount, currency = %payment.currency, "Payment recorded");
    Ok(created_response(payment))
}

/// Payments received against one document
#[utoipa::path(
    get,
    path = "/api/v1/payments",
    params(DocumentRef),
    responses(
        (status = 200, description = "Payments for the document", body = crate::ApiResponse<Vec<payment::Model>>)
    ),
    tag = "payments"
)]
pub async fn list_payments(
    State(state): State<AppState>,
    Query(document): Query<DocumentRef>,
) -> Result<impl IntoResponse, ApiError> {
    let payments = state
        .services
        .payments
        .list_for_document(document.kind, document.document_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(payments))
}

#[utoipa::path(
    delete,
    path = "/api/v1/payments/{id}",
    params(("id" = Uuid, Path, description = "Payment ID")),
    responses(
        (status = 204, description = "Payment deleted"),
        (status = 404, description = "Payment not found", body = crate::errors::ErrorResponse)
    ),
    tag = "payments"
)]
pub async fn delete_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .payments
        .delete(id)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}

/// Paid and outstanding amounts in the document currency
#[utoipa::path(
    get,
    path = "/api/v1/payments/balance/{kind}/{id}",
    params(
        ("kind" = DocumentKind, Path, description = "Document kind"),
        ("id" = Uuid, Path, description = "Document ID")
    ),
    responses(
        (status = 200, description = "Payment balance", body = crate::ApiResponse<PaymentBalance>),
        (status = 400, description = "Document kind does not take payments", body = crate::errors::ErrorResponse),
        (status = 404, description = "Document not found", body = crate::errors::ErrorResponse)
    ),
    tag = "payments"
)]
pub async fn payment_balance(
    State(state): State<AppState>,
    Path((kind, id)): Path<(DocumentKind, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let balance = state
        .services
        .payments
        .balance(kind, id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(balance))
}

pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_payments).post(record_payment))
        .route("/:id", delete(delete_payment))
        .route("/balance/:kind/:id", get(payment_balance))
}
