use super::common::{
    created_response, map_service_error, no_content_response, paginated_response, pdf_response,
    success_response, validate_input, DocumentListParams,
};
use crate::{
    entities::{status_history, enquiry},
    errors::ApiError,
    handlers::AppState,
    services::{
        documents::{ActionRequest, AllowedActions, DocumentDetail},
        enquiries::EnquiryInput,
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

/// List enquiries, newest first
#[utoipa::path(
    get,
    path = "/api/v1/enquiries",
    params(DocumentListParams),
    responses(
        (status = 200, description = "Page of enquiries", body = crate::ApiResponse<crate::PaginatedResponse<enquiry::Model>>),
        (status = 400, description = "Invalid query", body = crate::errors::ErrorResponse)
    ),
    tag = "enquiries"
)]
pub async fn list_enquiries(
    State(state): State<AppState>,
    Query(params): Query<DocumentListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let page = params.page();
    let per_page = state.config.page_size(params.per_page);
    let (items, total) = state
        .services
        .enquiries
        .list(params.filter(), params.search.clone(), page, per_page)
        .await
        .map_err(map_service_error)?;
    Ok(paginated_response(items, total, page, per_page))
}

/// Create an enquiry in draft
#[utoipa::path(
    post,
    path = "/api/v1/enquiries",
    request_body = EnquiryInput,
    responses(
        (status = 201, description = "Enquiry created", body = crate::ApiResponse<DocumentDetail<enquiry::Model>>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Referenced party not found", body = crate::errors::ErrorResponse)
    ),
    tag = "enquiries"
)]
pub async fn create_enquiry(
    State(state): State<AppState>,
    Json(payload): Json<EnquiryInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let detail = state
        .services
        .enquiries
        .create(payload)
        .await
        .map_err(map_service_error)?;
    info!(id = %detail.document.id, number = %detail.document.number, "Enquiry created");
    Ok(created_response(detail))
}

/// Get an enquiry with its line items
#[utoipa::path(
    get,
    path = "/api/v1/enquiries/{id}",
    params(("id" = Uuid, Path, description = "Enquiry ID")),
    responses(
        (status = 200, description = "Enquiry fetched", body = crate::ApiResponse<DocumentDetail<enquiry::Model>>),
        (status = 404, description = "Enquiry not found", body = crate::errors::ErrorResponse)
    ),
    tag = "enquiries"
)]
pub async fn get_enquiry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = state
        .services
        .enquiries
        .get(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(detail))
}

/// Replace the header and lines of an editable enquiry
#[utoipa::path(
    put,
    path = "/api/v1/enquiries/{id}",
    request_body = EnquiryInput,
    params(("id" = Uuid, Path, description = "Enquiry ID")),
    responses(
        (status = 200, description = "Enquiry updated", body = crate::ApiResponse<DocumentDetail<enquiry::Model>>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Enquiry not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Enquiry is locked", body = crate::errors::ErrorResponse)
    ),
    tag = "enquiries"
)]
pub async fn update_enquiry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<EnquiryInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let detail = state
        .services
        .enquiries
        .update(id, payload)
        .await
        .map_err(map_service_error)?;
    info!(%id, version = detail.document.version, "Enquiry updated");
    Ok(success_response(detail))
}

/// Delete a draft enquiry
#[utoipa::path(
    delete,
    path = "/api/v1/enquiries/{id}",
    params(("id" = Uuid, Path, description = "Enquiry ID")),
    responses(
        (status = 204, description = "Enquiry deleted"),
        (status = 404, description = "Enquiry not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Enquiry can no longer be deleted", body = crate::errors::ErrorResponse)
    ),
    tag = "enquiries"
)]
pub async fn delete_enquiry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .enquiries
        .delete(id)
        .await
        .map_err(map_service_error)?;
    info!(%id, "Enquiry deleted");
    Ok(no_content_response())
}

/// Actions open to the enquiry in its current status
#[utoipa::path(
    get,
    path = "/api/v1/enquiries/{id}/actions",
    params(("id" = Uuid, Path, description = "Enquiry ID")),
    responses(
        (status = 200, description = "Allowed actions", body = crate::ApiResponse<AllowedActions>),
        (status = 404, description = "Enquiry not found", body = crate::errors::ErrorResponse)
    ),
    tag = "enquiries"
)]
pub async fn enquiry_actions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let actions = state
        .services
        .enquiries
        .allowed_actions(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(actions))
}

/// Apply a workflow action
#[utoipa::path(
    post,
    path = "/api/v1/enquiries/{id}/actions/{action}",
    request_body = ActionRequest,
    params(
        ("id" = Uuid, Path, description = "Enquiry ID"),
        ("action" = WorkflowAction, Path, description = "Workflow action")
    ),
    responses(
        (status = 200, description = "Action applied", body = crate::ApiResponse<DocumentDetail<enquiry::Model>>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Enquiry not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Action not allowed in the current status", body = crate::errors::ErrorResponse)
    ),
    tag = "enquiries"
)]
pub async fn apply_enquiry_action(
    State(state): State<AppState>,
    Path((id, action)): Path<(Uuid, WorkflowAction)>,
    payload: Option<Json<ActionRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let request = payload.map(|Json(body)| body).unwrap_or_default();
    validate_input(&request)?;
    let detail = state
        .services
        .enquiries
        .apply_action(id, action, request)
        .await
        .map_err(map_service_error)?;
    info!(%id, %action, status = %detail.document.status, "Enquiry action applied");
    Ok(success_response(detail))
}

/// Status history, oldest first
#[utoipa::path(
    get,
    path = "/api/v1/enquiries/{id}/history",
    params(("id" = Uuid, Path, description = "Enquiry ID")),
    responses(
        (status = 200, description = "Status history", body = crate::ApiResponse<Vec<status_history::Model>>),
        (status = 404, description = "Enquiry not found", body = crate::errors::ErrorResponse)
    ),
    tag = "enquiries"
)]
pub async fn enquiry_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let history = state
        .services
        .enquiries
        .history(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(history))
}

/// Download the enquiry as PDF
#[utoipa::path(
    get,
    path = "/api/v1/enquiries/{id}/pdf",
    params(("id" = Uuid, Path, description = "Enquiry ID")),
    responses(
        (status = 200, description = "PDF document", content_type = "application/pdf", body = Vec<u8>),
        (status = 404, description = "Enquiry not found", body = crate::errors::ErrorResponse)
    ),
    tag = "enquiries"
)]
pub async fn enquiry_pdf(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let document = state
        .services
        .rendering
        .render(DocumentKind::Enquiry, id)
        .await
        .map_err(map_service_error)?;
    Ok(pdf_response(document))
}

pub fn enquiry_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_enquiries).post(create_enquiry))
        .route(
            "/:id",
            get(get_enquiry)
                .put(update_enquiry)
                .delete(delete_enquiry),
        )
        .route("/:id/actions", get(enquiry_actions))
        .route("/:id/actions/:action", post(apply_enquiry_action))
        .route("/:id/history", get(enquiry_history))
        .route("/:id/pdf", get(enquiry_pdf))
        .route("/:id/convert", post(super::conversions::convert_enquiry))
}
