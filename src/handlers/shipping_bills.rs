use super::common::{
    created_response, map_service_error, no_content_response, paginated_response, pdf_response,
    success_response, validate_input, DocumentListParams,
};
use crate::{
    entities::{status_history, shipping_bill},
    errors::ApiError,
    handlers::AppState,
    services::{
        documents::{ActionRequest, AllowedActions, DocumentDetail},
        shipping_bills::ShippingBillInput,
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

/// List shipping bills, newest first
#[utoipa::path(
    get,
    path = "/api/v1/shipping-bills",
    params(DocumentListParams),
    responses(
        (status = 200, description = "Page of shipping bills", body = crate::ApiResponse<crate::PaginatedResponse<shipping_bill::Model>>),
        (status = 400, description = "Invalid query", body = crate::errors::ErrorResponse)
    ),
    tag = "shipping-bills"
)]
pub async fn list_shipping_bills(
    State(state): State<AppState>,
    Query(params): Query<DocumentListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let page = params.page();
    let per_page = state.config.page_size(params.per_page);
    let (items, total) = state
        .services
        .shipping_bills
        .list(params.filter(), page, per_page)
        .await
        .map_err(map_service_error)?;
    Ok(paginated_response(items, total, page, per_page))
}

/// Create a shipping bill in draft
#[utoipa::path(
    post,
    path = "/api/v1/shipping-bills",
    request_body = ShippingBillInput,
    responses(
        (status = 201, description = "Shipping bill created", body = crate::ApiResponse<DocumentDetail<shipping_bill::Model>>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Referenced party not found", body = crate::errors::ErrorResponse)
    ),
    tag = "shipping-bills"
)]
pub async fn create_shipping_bill(
    State(state): State<AppState>,
    Json(payload): Json<ShippingBillInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let detail = state
        .services
        .shipping_bills
        .create(payload)
        .await
        .map_err(map_service_error)?;
    info!(id = %detail.document.id, number = %detail.document.number, "Shipping bill created");
    Ok(created_response(detail))
}

/// Get a shipping bill with its line items
#[utoipa::path(
    get,
    path = "/api/v1/shipping-bills/{id}",
    params(("id" = Uuid, Path, description = "Shipping bill ID")),
    responses(
        (status = 200, description = "Shipping bill fetched", body = crate::ApiResponse<DocumentDetail<shipping_bill::Model>>),
        (status = 404, description = "Shipping bill not found", body = crate::errors::ErrorResponse)
    ),
    tag = "shipping-bills"
)]
pub async fn get_shipping_bill(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = state
        .services
        .shipping_bills
        .get(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(detail))
}

/// Replace the header and lines of an editable shipping bill
#[utoipa::path(
    put,
    path = "/api/v1/shipping-bills/{id}",
    request_body = ShippingBillInput,
    params(("id" = Uuid, Path, description = "Shipping bill ID")),
    responses(
        (status = 200, description = "Shipping bill updated", body = crate::ApiResponse<DocumentDetail<shipping_bill::Model>>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Shipping bill not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Shipping bill is locked", body = crate::errors::ErrorResponse)
    ),
    tag = "shipping-bills"
)]
pub async fn update_shipping_bill(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ShippingBillInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let detail = state
        .services
        .shipping_bills
        .update(id, payload)
        .await
        .map_err(map_service_error)?;
    info!(%id, version = detail.document.version, "Shipping bill updated");
    Ok(success_response(detail))
}

/// Delete a draft shipping bill
#[utoipa::path(
    delete,
    path = "/api/v1/shipping-bills/{id}",
    params(("id" = Uuid, Path, description = "Shipping bill ID")),
    responses(
        (status = 204, description = "Shipping bill deleted"),
        (status = 404, description = "Shipping bill not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Shipping bill can no longer be deleted", body = crate::errors::ErrorResponse)
    ),
    tag = "shipping-bills"
)]
pub async fn delete_shipping_bill(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .shipping_bills
        .delete(id)
        .await
        .map_err(map_service_error)?;
    info!(%id, "Shipping bill deleted");
    Ok(no_content_response())
}

/// Actions open to the shipping bill in its current status
#[utoipa::path(
    get,
    path = "/api/v1/shipping-bills/{id}/actions",
    params(("id" = Uuid, Path, description = "Shipping bill ID")),
    responses(
        (status = 200, description = "Allowed actions", body = crate::ApiResponse<AllowedActions>),
        (status = 404, description = "Shipping bill not found", body = crate::errors::ErrorResponse)
    ),
    tag = "shipping-bills"
)]
pub async fn shipping_bill_actions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let actions = state
        .services
        .shipping_bills
        .allowed_actions(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(actions))
}

/// Apply a workflow action
#[utoipa::path(
    post,
    path = "/api/v1/shipping-bills/{id}/actions/{action}",
    request_body = ActionRequest,
    params(
        ("id" = Uuid, Path, description = "Shipping bill ID"),
        ("action" = WorkflowAction, Path, description = "Workflow action")
    ),
    responses(
        (status = 200, description = "Action applied", body = crate::ApiResponse<DocumentDetail<shipping_bill::Model>>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Shipping bill not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Action not allowed in the current status", body = crate::errors::ErrorResponse)
    ),
    tag = "shipping-bills"
)]
pub async fn apply_shipping_bill_action(
    State(state): State<AppState>,
    Path((id, action)): Path<(Uuid, WorkflowAction)>,
    payload: Option<Json<ActionRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let request = payload.map(|Json(body)| body).unwrap_or_default();
    validate_input(&request)?;
    let detail = state
        .services
        .shipping_bills
        .apply_action(id, action, request)
        .await
        .map_err(map_service_error)?;
    info!(%id, %action, status = %detail.document.status, "Shipping bill action applied");
    Ok(success_response(detail))
}

/// Status history, oldest first
#[utoipa::path(
    get,
    path = "/api/v1/shipping-bills/{id}/history",
    params(("id" = Uuid, Path, description = "Shipping bill ID")),
    responses(
        (status = 200, description = "Status history", body = crate::ApiResponse<Vec<status_history::Model>>),
        (status = 404, description = "Shipping bill not found", body = crate::errors::ErrorResponse)
    ),
    tag = "shipping-bills"
)]
pub async fn shipping_bill_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let history = state
        .services
        .shipping_bills
        .history(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(history))
}

/// Download the shipping bill as PDF
#[utoipa::path(
    get,
    path = "/api/v1/shipping-bills/{id}/pdf",
    params(("id" = Uuid, Path, description = "Shipping bill ID")),
    responses(
        (status = 200, description = "PDF document", content_type = "application/pdf", body = Vec<u8>),
        (status = 404, description = "Shipping bill not found", body = crate::errors::ErrorResponse)
    ),
    tag = "shipping-bills"
)]
pub async fn shipping_bill_pdf(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let document = state
        .services
        .rendering
        .render(DocumentKind::ShippingBill, id)
        .await
        .map_err(map_service_error)?;
    Ok(pdf_response(document))
}

pub fn shipping_bill_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_shipping_bills).post(create_shipping_bill))
        .route(
            "/:id",
            get(get_shipping_bill)
                .put(update_shipping_bill)
                .delete(delete_shipping_bill),
        )
        .route("/:id/actions", get(shipping_bill_actions))
        .route("/:id/actions/:action", post(apply_shipping_bill_action))
        .route("/:id/history", get(shipping_bill_history))
        .route("/:id/pdf", get(shipping_bill_pdf))
}
