use super::common::{
    created_response, map_service_error, no_content_response, paginated_response, pdf_response,
    success_response, validate_input, DocumentListParams,
};
use crate::{
    entities::{status_history, purchase_order},
    errors::ApiError,
    handlers::AppState,
    services::{
        documents::{ActionRequest, AllowedActions, DocumentDetail},
        purchase_orders::PurchaseOrderInput,
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

/// List purchase orders, newest first
#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders",
    params(DocumentListParams),
    responses(
        (status = 200, description = "Page of purchase orders", body = crate::ApiResponse<crate::PaginatedResponse<purchase_order::Model>>),
        (status = 400, description = "Invalid query", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn list_purchase_orders(
    State(state): State<AppState>,
    Query(params): Query<DocumentListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let page = params.page();
    let per_page = state.config.page_size(params.per_page);
    let (items, total) = state
        .services
        .purchase_orders
        .list(params.filter(), page, per_page)
        .await
        .map_err(map_service_error)?;
    Ok(paginated_response(items, total, page, per_page))
}

/// Create a purchase order in draft
#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders",
    request_body = PurchaseOrderInput,
    responses(
        (status = 201, description = "Purchase order created", body = crate::ApiResponse<DocumentDetail<purchase_order::Model>>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Referenced party not found", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn create_purchase_order(
    State(state): State<AppState>,
    Json(payload): Json<PurchaseOrderInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let detail = state
        .services
        .purchase_orders
        .create(payload)
        .await
        .map_err(map_service_error)?;
    info!(id = %detail.document.id, number = %detail.document.number, "Purchase order created");
    Ok(created_response(detail))
}

/// Get a purchase order with its line items
#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders/{id}",
    params(("id" = Uuid, Path, description = "Purchase order ID")),
    responses(
        (status = 200, description = "Purchase order fetched", body = crate::ApiResponse<DocumentDetail<purchase_order::Model>>),
        (status = 404, description = "Purchase order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn get_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = state
        .services
        .purchase_orders
        .get(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(detail))
}

/// Replace the header and lines of an editable purchase order
#[utoipa::path(
    put,
    path = "/api/v1/purchase-orders/{id}",
    request_body = PurchaseOrderInput,
    params(("id" = Uuid, Path, description = "Purchase order ID")),
    responses(
        (status = 200, description = "Purchase order updated", body = crate::ApiResponse<DocumentDetail<purchase_order::Model>>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Purchase order not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Purchase order is locked", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn update_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PurchaseOrderInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let detail = state
        .services
        .purchase_orders
        .update(id, payload)
        .await
        .map_err(map_service_error)?;
    info!(%id, version = detail.document.version, "Purchase order updated");
    Ok(success_response(detail))
}

/// Delete a draft purchase order
#[utoipa::path(
    delete,
    path = "/api/v1/purchase-orders/{id}",
    params(("id" = Uuid, Path, description = "Purchase order ID")),
    responses(
        (status = 204, description = "Purchase order deleted"),
        (status = 404, description = "Purchase order not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Purchase order can no longer be deleted", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn delete_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .purchase_orders
        .delete(id)
        .await
        .map_err(map_service_error)?;
    info!(%id, "Purchase order deleted");
    Ok(no_content_response())
}

/// Actions open to the purchase order in its current status
#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders/{id}/actions",
    params(("id" = Uuid, Path, description = "Purchase order ID")),
    responses(
        (status = 200, description = "Allowed actions", body = crate::ApiResponse<AllowedActions>),
        (status = 404, description = "Purchase order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn purchase_order_actions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let actions = state
        .services
        .purchase_orders
        .allowed_actions(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(actions))
}

/// Apply a workflow action
#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders/{id}/actions/{action}",
    request_body = ActionRequest,
    params(
        ("id" = Uuid, Path, description = "Purchase order ID"),
        ("action" = WorkflowAction, Path, description = "Workflow action")
    ),
    responses(
        (status = 200, description = "Action applied", body = crate::ApiResponse<DocumentDetail<purchase_order::Model>>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Purchase order not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Action not allowed in the current status", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn apply_purchase_order_action(
    State(state): State<AppState>,
    Path((id, action)): Path<(Uuid, WorkflowAction)>,
    payload: Option<Json<ActionRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let request = payload.map(|Json(body)| body).unwrap_or_default();
    validate_input(&request)?;
    let detail = state
        .services
        .purchase_orders
        .apply_action(id, action, request)
        .await
        .map_err(map_service_error)?;
    info!(%id, %action, status = %detail.document.status, "Purchase order action applied");
    Ok(success_response(detail))
}

/// Status history, oldest first
#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders/{id}/history",
    params(("id" = Uuid, Path, description = "Purchase order ID")),
    responses(
        (status = 200, description = "Status history", body = crate::ApiResponse<Vec<status_history::Model>>),
        (status = 404, description = "Purchase order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn purchase_order_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let history = state
        .services
        .purchase_orders
        .history(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(history))
}

/// Download the purchase order as PDF
#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders/{id}/pdf",
    params(("id" = Uuid, Path, description = "Purchase order ID")),
    responses(
        (status = 200, description = "PDF document", content_type = "application/pdf", body = Vec<u8>),
        (status = 404, description = "Purchase order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn purchase_order_pdf(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let document = state
        .services
        .rendering
        .render(DocumentKind::PurchaseOrder, id)
        .await
        .map_err(map_service_error)?;
    Ok(pdf_response(document))
}

pub fn purchase_order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_purchase_orders).post(create_purchase_order))
        .route(
            "/:id",
            get(get_purchase_order)
                .put(update_purchase_order)
                .delete(delete_purchase_order),
        )
        .route("/:id/actions", get(purchase_order_actions))
        .route("/:id/actions/:action", post(apply_purchase_order_action))
        .route("/:id/history", get(purchase_order_history))
        .route("/:id/pdf", get(purchase_order_pdf))
}
