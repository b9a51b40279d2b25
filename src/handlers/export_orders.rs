use super::common::{
    created_response, map_service_error, no_content_response, paginated_response, pdf_response,
    success_response, validate_input, DocumentListParams,
};
use crate::{
    entities::{status_history, export_order},
    errors::ApiError,
    handlers::AppState,
    services::{
        documents::{ActionRequest, AllowedActions, DocumentDetail},
        export_orders::ExportOrderInput,
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

/// List export orders, newest first
#[utoipa::path(
    get,
    path = "/api/v1/export-orders",
    params(DocumentListParams),
    responses(
        (status = 200, description = "Page of export orders", body = crate::ApiResponse<crate::PaginatedResponse<export_order::Model>>),
        (status = 400, description = "Invalid query", body = crate::errors::ErrorResponse)
    ),
    tag = "export-orders"
)]
pub async fn list_export_orders(
    State(state): State<AppState>,
    Query(params): Query<DocumentListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let page = params.page();
    let per_page = state.config.page_size(params.per_page);
    let (items, total) = state
        .services
        .export_orders
        .list(params.filter(), page, per_page)
        .await
        .map_err(map_service_error)?;
    Ok(paginated_response(items, total, page, per_page))
}

/// Create an export order in draft
#[utoipa::path(
    post,
    path = "/api/v1/export-orders",
    request_body = ExportOrderInput,
    responses(
        (status = 201, description = "Export order created", body = crate::ApiResponse<DocumentDetail<export_order::Model>>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Referenced party not found", body = crate::errors::ErrorResponse)
    ),
    tag = "export-orders"
)]
pub async fn create_export_order(
    State(state): State<AppState>,
    Json(payload): Json<ExportOrderInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let detail = state
        .services
        .export_orders
        .create(payload)
        .await
        .map_err(map_service_error)?;
    info!(id = %detail.document.id, number = %detail.document.number, "Export order created");
    Ok(created_response(detail))
}

/// Get an export order with its line items
#[utoipa::path(
    get,
    path = "/api/v1/export-orders/{id}",
    params(("id" = Uuid, Path, description = "Export order ID")),
    responses(
        (status = 200, description = "Export order fetched", body = crate::ApiResponse<DocumentDetail<export_order::Model>>),
        (status = 404, description = "Export order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "export-orders"
)]
pub async fn get_export_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = state
        .services
        .export_orders
        .get(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(detail))
}

/// Replace the header and lines of an editable export order
#[utoipa::path(
    put,
    path = "/api/v1/export-orders/{id}",
    request_body = ExportOrderInput,
    params(("id" = Uuid, Path, description = "Export order ID")),
    responses(
        (status = 200, description = "Export order updated", body = crate::ApiResponse<DocumentDetail<export_order::Model>>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Export order not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Export order is locked", body = crate::errors::ErrorResponse)
    ),
    tag = "export-orders"
)]
pub async fn update_export_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ExportOrderInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let detail = state
        .services
        .export_orders
        .update(id, payload)
        .await
        .map_err(map_service_error)?;
    info!(%id, version = detail.document.version, "Export order updated");
    Ok(success_response(detail))
}

/// Delete a draft export order
#[utoipa::path(
    delete,
    path = "/api/v1/export-orders/{id}",
    params(("id" = Uuid, Path, description = "Export order ID")),
    responses(
        (status = 204, description = "Export order deleted"),
        (status = 404, description = "Export order not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Export order can no longer be deleted", body = crate::errors::ErrorResponse)
    ),
    tag = "export-orders"
)]
pub async fn delete_export_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .export_orders
        .delete(id)
        .await
        .map_err(map_service_error)?;
    info!(%id, "Export order deleted");
    Ok(no_content_response())
}

/// Actions open to the export order in its current status
#[utoipa::path(
    get,
    path = "/api/v1/export-orders/{id}/actions",
    params(("id" = Uuid, Path, description = "Export order ID")),
    responses(
        (status = 200, description = "Allowed actions", body = crate::ApiResponse<AllowedActions>),
        (status = 404, description = "Export order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "export-orders"
)]
pub async fn export_order_actions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let actions = state
        .services
        .export_orders
        .allowed_actions(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(actions))
}

/// Apply a workflow action
#[utoipa::path(
    post,
    path = "/api/v1/export-orders/{id}/actions/{action}",
    request_body = ActionRequest,
    params(
        ("id" = Uuid, Path, description = "Export order ID"),
        ("action" = WorkflowAction, Path, description = "Workflow action")
    ),
    responses(
        (status = 200, description = "Action applied", body = crate::ApiResponse<DocumentDetail<export_order::Model>>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Export order not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Action not allowed in the current status", body = crate::errors::ErrorResponse)
    ),
    tag = "export-orders"
)]
pub async fn apply_export_order_action(
    State(state): State<AppState>,
    Path((id, action)): Path<(Uuid, WorkflowAction)>,
    payload: Option<Json<ActionRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let request = payload.map(|Json(body)| body).unwrap_or_default();
    validate_input(&request)?;
    let detail = state
        .services
        .export_orders
        .apply_action(id, action, request)
        .await
        .map_err(map_service_error)?;
    info!(%id, %action, status = %detail.document.status, "Export order action applied");
    Ok(success_response(detail))
}

/// Status history, oldest first
#[utoipa::path(
    get,
    path = "/api/v1/export-orders/{id}/history",
    params(("id" = Uuid, Path, description = "Export order ID")),
    responses(
        (status = 200, description = "Status history", body = crate::ApiResponse<Vec<status_history::Model>>),
        (status = 404, description = "Export order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "export-orders"
)]
pub async fn export_order_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let history = state
        .services
        .export_orders
        .history(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(history))
}

/// Download the export order as PDF
#[utoipa::path(
    get,
    path = "/api/v1/export-orders/{id}/pdf",
    params(("id" = Uuid, Path, description = "Export order ID")),
    responses(
        (status = 200, description = "PDF document", content_type = "application/pdf", body = Vec<u8>),
        (status = 404, description = "Export order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "export-orders"
)]
pub async fn export_order_pdf(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let document = state
        .services
        .rendering
        .render(DocumentKind::ExportOrder, id)
        .await
        .map_err(map_service_error)?;
    Ok(pdf_response(document))
}

pub fn export_order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_export_orders).post(create_export_order))
        .route(
            "/:id",
            get(get_export_order)
                .put(update_export_order)
                .delete(delete_export_order),
        )
        .route("/:id/actions", get(export_order_actions))
        .route("/:id/actions/:action", post(apply_export_order_action))
        .route("/:id/history", get(export_order_history))
        .route("/:id/pdf", get(export_order_pdf))
        .route("/:id/shipping-bill", post(super::conversions::raise_shipping_bill))
        .route("/:id/purchase-order", post(super::conversions::raise_purchase_order))
        .route("/:id/purchase-orders", get(super::conversions::purchase_orders_for_export_order))
}
