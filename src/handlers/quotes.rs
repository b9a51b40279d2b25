use super::common::{
    created_response, map_service_error, no_content_response, paginated_response, pdf_response,
    success_response, validate_input, DocumentListParams,
};
use crate::{
    entities::{status_history, quote},
    errors::ApiError,
    handlers::AppState,
    services::{
        documents::{ActionRequest, AllowedActions, DocumentDetail},
        quotes::QuoteInput,
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

/// List quotes, newest first
#[utoipa::path(
    get,
    path = "/api/v1/quotes",
    params(DocumentListParams),
    responses(
        (status = 200, description = "Page of quotes", body = crate::ApiResponse<crate::PaginatedResponse<quote::Model>>),
        (status = 400, description = "Invalid query", body = crate::errors::ErrorResponse)
    ),
    tag = "quotes"
)]
pub async fn list_quotes(
    State(state): State<AppState>,
    Query(params): Query<DocumentListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let page = params.page();
    let per_page = state.config.page_size(params.per_page);
    let (items, total) = state
        .services
        .quotes
        .list(params.filter(), page, per_page)
        .await
        .map_err(map_service_error)?;
    Ok(paginated_response(items, total, page, per_page))
}

/// Create a quote in draft
#[utoipa::path(
    post,
    path = "/api/v1/quotes",
    request_body = QuoteInput,
    responses(
        (status = 201, description = "Quote created", body = crate::ApiResponse<DocumentDetail<quote::Model>>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Referenced party not found", body = crate::errors::ErrorResponse)
    ),
    tag = "quotes"
)]
pub async fn create_quote(
    State(state): State<AppState>,
    Json(payload): Json<QuoteInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let detail = state
        .services
        .quotes
        .create(payload)
        .await
        .map_err(map_service_error)?;
    info!(id = %detail.document.id, number = %detail.document.number, "Quote created");
    Ok(created_response(detail))
}

/// Get a quote with its line items
#[utoipa::path(
    get,
    path = "/api/v1/quotes/{id}",
    params(("id" = Uuid, Path, description = "Quote ID")),
    responses(
        (status = 200, description = "Quote fetched", body = crate::ApiResponse<DocumentDetail<quote::Model>>),
        (status = 404, description = "Quote not found", body = crate::errors::ErrorResponse)
    ),
    tag = "quotes"
)]
pub async fn get_quote(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = state
        .services
        .quotes
        .get(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(detail))
}

/// Replace the header and lines of an editable quote
#[utoipa::path(
    put,
    path = "/api/v1/quotes/{id}",
    request_body = QuoteInput,
    params(("id" = Uuid, Path, description = "Quote ID")),
    responses(
        (status = 200, description = "Quote updated", body = crate::ApiResponse<DocumentDetail<quote::Model>>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Quote not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Quote is locked", body = crate::errors::ErrorResponse)
    ),
    tag = "quotes"
)]
pub async fn update_quote(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<QuoteInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let detail = state
        .services
        .quotes
        .update(id, payload)
        .await
        .map_err(map_service_error)?;
    info!(%id, version = detail.document.version, "Quote updated");
    Ok(success_response(detail))
}

/// Delete a draft quote
#[utoipa::path(
    delete,
    path = "/api/v1/quotes/{id}",
    params(("id" = Uuid, Path, description = "Quote ID")),
    responses(
        (status = 204, description = "Quote deleted"),
        (status = 404, description = "Quote not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Quote can no longer be deleted", body = crate::errors::ErrorResponse)
    ),
    tag = "quotes"
)]
pub async fn delete_quote(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .quotes
        .delete(id)
        .await
        .map_err(map_service_error)?;
    info!(%id, "Quote deleted");
    Ok(no_content_response())
}

/// Actions open to the quote in its current status
#[utoipa::path(
    get,
    path = "/api/v1/quotes/{id}/actions",
    params(("id" = Uuid, Path, description = "Quote ID")),
    responses(
        (status = 200, description = "Allowed actions", body = crate::ApiResponse<AllowedActions>),
        (status = 404, description = "Quote not found", body = crate::errors::ErrorResponse)
    ),
    tag = "quotes"
)]
pub async fn quote_actions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let actions = state
        .services
        .quotes
        .allowed_actions(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(actions))
}

/// Apply a workflow action
#[utoipa::path(
    post,
    path = "/api/v1/quotes/{id}/actions/{action}",
    request_body = ActionRequest,
    params(
        ("id" = Uuid, Path, description = "Quote ID"),
        ("action" = WorkflowAction, Path, description = "Workflow action")
    ),
    responses(
        (status = 200, description = "Action applied", body = crate::ApiResponse<DocumentDetail<quote::Model>>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Quote not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Action not allowed in the current status", body = crate::errors::ErrorResponse)
    ),
    tag = "quotes"
)]
pub async fn apply_quote_action(
    State(state): State<AppState>,
    Path((id, action)): Path<(Uuid, WorkflowAction)>,
    payload: Option<Json<ActionRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let request = payload.map(|Json(body)| body).unwrap_or_default();
    validate_input(&request)?;
    let detail = state
        .services
        .quotes
        .apply_action(id, action, request)
        .await
        .map_err(map_service_error)?;
    info!(%id, %action, status = %detail.document.status, "Quote action applied");
    Ok(success_response(detail))
}

/// Status history, oldest first
#[utoipa::path(
    get,
    path = "/api/v1/quotes/{id}/history",
    params(("id" = Uuid, Path, description = "Quote ID")),
    responses(
        (status = 200, description = "Status history", body = crate::ApiResponse<Vec<status_history::Model>>),
        (status = 404, description = "Quote not found", body = crate::errors::ErrorResponse)
    ),
    tag = "quotes"
)]
pub async fn quote_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let history = state
        .services
        .quotes
        .history(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(history))
}

/// Download the quote as PDF
#[utoipa::path(
    get,
    path = "/api/v1/quotes/{id}/pdf",
    params(("id" = Uuid, Path, description = "Quote ID")),
    responses(
        (status = 200, description = "PDF document", content_type = "application/pdf", body = Vec<u8>),
        (status = 404, description = "Quote not found", body = crate::errors::ErrorResponse)
    ),
    tag = "quotes"
)]
pub async fn quote_pdf(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let document = state
        .services
        .rendering
        .render(DocumentKind::Quote, id)
        .await
        .map_err(map_service_error)?;
    Ok(pdf_response(document))
}

pub fn quote_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_quotes).post(create_quote))
        .route(
            "/:id",
            get(get_quote)
                .put(update_quote)
                .delete(delete_quote),
        )
        .route("/:id/actions", get(quote_actions))
        .route("/:id/actions/:action", post(apply_quote_action))
        .route("/:id/history", get(quote_history))
        .route("/:id/pdf", get(quote_pdf))
        .route("/:id/convert", post(super::conversions::convert_quote))
}
