use super::common::{
    created_response, map_service_error, no_content_response, paginated_response, pdf_response,
    success_response, validate_input, DocumentListParams,
};
use crate::{
    entities::{status_history, proforma_invoice},
    errors::ApiError,
    handlers::AppState,
    services::{
        documents::{ActionRequest, AllowedActions, DocumentDetail},
        proforma_invoices::ProformaInvoiceInput,
    },
    workflow::{DocumentKind, WorkflowAction},
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use tracing::info;
use uuid::Uuid;

/// List proforma invoices, newest first
#[utoipa::path(
    get,
    path = "/api/v1/proforma-invoices",
    params(DocumentListParams),
    responses(
        (status = 200, description = "Page of proforma invoices", body = crate::ApiResponse<crate::PaginatedResponse<proforma_invoice::Model>>),
        (status = 400, description = "Invalid query", body = crate::errors::ErrorResponse)
    ),
    tag = "proforma-invoices"
)]
pub async fn list_proforma_invoices(
    State(state): State<AppState>,
    Query(params): Query<DocumentListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let page = params.page();
    let per_page = state.config.page_size(params.per_page);
    let (items, total) = state
        .services
        .proforma_invoices
        .list(params.filter(), page, per_page)
        .await
        .map_err(map_service_error)?;
    Ok(paginated_response(items, total, page, per_page))
}

/// Create a proforma invoice in draft
#[utoipa::path(
    post,
    path = "/api/v1/proforma-invoices",
    request_body = ProformaInvoiceInput,
    responses(
        (status = 201, description = "Proforma invoice created", body = crate::ApiResponse<DocumentDetail<proforma_invoice::Model>>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Referenced party not found", body = crate::errors::ErrorResponse)
    ),
    tag = "proforma-invoices"
)]
pub async fn create_proforma_invoice(
    State(state): State<AppState>,
    Json(payload): Json<ProformaInvoiceInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let detail = state
        .services
        .proforma_invoices
        .create(payload)
        .await
        .map_err(map_service_error)?;
    info!(id = %detail.document.id, number = %detail.document.number, "Proforma invoice created");
    Ok(created_response(detail))
}

/// Get a proforma invoice with its line items
#[utoipa::path(
    get,
    path = "/api/v1/proforma-invoices/{id}",
    params(("id" = Uuid, Path, description = "Proforma invoice ID")),
    responses(
        (status = 200, description = "Proforma invoice fetched", body = crate::ApiResponse<DocumentDetail<proforma_invoice::Model>>),
        (status = 404, description = "Proforma invoice not found", body = crate::errors::ErrorResponse)
    ),
    tag = "proforma-invoices"
)]
pub async fn get_proforma_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = state
        .services
        .proforma_invoices
        .get(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(detail))
}

/// Replace the header and lines of an editable proforma invoice
#[utoipa::path(
    put,
    path = "/api/v1/proforma-invoices/{id}",
    request_body = ProformaInvoiceInput,
    params(("id" = Uuid, Path, description = "Proforma invoice ID")),
    responses(
        (status = 200, description = "Proforma invoice updated", body = crate::ApiResponse<DocumentDetail<proforma_invoice::Model>>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Proforma invoice not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Proforma invoice is locked", body = crate::errors::ErrorResponse)
    ),
    tag = "proforma-invoices"
)]
pub async fn update_proforma_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProformaInvoiceInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let detail = state
        .services
        .proforma_invoices
        .update(id, payload)
        .await
        .map_err(map_service_error)?;
    info!(%id, version = detail.document.version, "Proforma invoice updated");
    Ok(success_response(detail))
}

/// Delete a draft proforma invoice
#[utoipa::path(
    delete,
    path = "/api/v1/proforma-invoices/{id}",
    params(("id" = Uuid, Path, description = "Proforma invoice ID")),
    responses(
        (status = 204, description = "Proforma invoice deleted"),
        (status = 404, description = "Proforma invoice not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Proforma invoice can no longer be deleted", body = crate::errors::ErrorResponse)
    ),
    tag = "proforma-invoices"
)]
pub async fn delete_proforma_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .proforma_invoices
        .delete(id)
        .await
        .map_err(map_service_error)?;
    info!(%id, "Proforma invoice deleted");
    Ok(no_content_response())
}

/// Actions open to the proforma invoice in its current status
#[utoipa::path(
    get,
    path = "/api/v1/proforma-invoices/{id}/actions",
    params(("id" = Uuid, Path, description = "Proforma invoice ID")),
    responses(
        (status = 200, description = "Allowed actions", body = crate::ApiResponse<AllowedActions>),
        (status = 404, description = "Proforma invoice not found", body = crate::errors::ErrorResponse)
    ),
    tag = "proforma-invoices"
)]
pub async fn proforma_invoice_actions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let actions = state
        .services
        .proforma_invoices
        .allowed_actions(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(actions))
}

/// Apply a workflow action
#[utoipa::path(
    post,
    path = "/api/v1/proforma-invoices/{id}/actions/{action}",
    request_body = ActionRequest,
    params(
        ("id" = Uuid, Path, description = "Proforma invoice ID"),
        ("action" = WorkflowAction, Path, description = "Workflow action")
    ),
    responses(
        (status = 200, description = "Action applied", body = crate::ApiResponse<DocumentDetail<proforma_invoice::Model>>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Proforma invoice not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Action not allowed in the current status", body = crate::errors::ErrorResponse)
    ),
    tag = "proforma-invoices"
)]
pub async fn apply_proforma_invoice_action(
    State(state): State<AppState>,
    Path((id, action)): Path<(Uuid, WorkflowAction)>,
    payload: Option<Json<ActionRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let request = payload.map(|Json(body)| body).unwrap_or_default();
    validate_input(&request)?;
    let detail = state
        .services
        .proforma_invoices
        .apply_action(id, action, request)
        .await
        .map_err(map_service_error)?;
    info!(%id, %action, status = %detail.document.status, "Proforma invoice action applied");
    Ok(success_response(detail))
}

/// Status history, oldest first
#[utoipa::path(
    get,
    path = "/api/v1/proforma-invoices/{id}/history",
    params(("id" = Uuid, Path, description = "Proforma invoice ID")),
    responses(
        (status = 200, description = "Status history", body = crate::ApiResponse<Vec<status_history::Model>>),
        (status = 404, description = "Proforma invoice not found", body = crate::errors::ErrorResponse)
    ),
    tag = "proforma-invoices"
)]
pub async fn proforma_invoice_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let history = state
        .services
        .proforma_invoices
        .history(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(history))
}

/// Download the proforma invoice as PDF
#[utoipa::path(
    get,
    path = "/api/v1/proforma-invoices/{id}/pdf",
    params(("id" = Uuid, Path, description = "Proforma invoice ID")),
    responses(
        (status = 200, description = "PDF document", content_type = "application/pdf", body = Vec<u8>),
        (status = 404, description = "Proforma invoice not found", body = crate::errors::ErrorResponse)
    ),
    tag = "proforma-invoices"
)]
pub async fn proforma_invoice_pdf(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let document = state
        .services
        .rendering
        .render(DocumentKind::ProformaInvoice, id)
        .await
        .map_err(map_service_error)?;
    Ok(pdf_response(document))
}

pub fn proforma_invoice_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_proforma_invoices).post(create_proforma_invoice))
        .route(
            "/:id",
            get(get_proforma_invoice)
                .put(update_proforma_invoice)
                .delete(delete_proforma_invoice),
        )
        .route("/:id/actions", get(proforma_invoice_actions))
        .route("/:id/actions/:action", post(apply_proforma_invoice_action))
        .route("/:id/history", get(proforma_invoice_history))
        .route("/:id/pdf", get(proforma_invoice_pdf))
        .route("/:id/convert", post(super::conversions::convert_proforma_invoice))
}
