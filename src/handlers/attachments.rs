use super::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
};
use super::payments::DocumentRef;
use crate::{
    entities::attachment,
    errors::ApiError,
    handlers::AppState,
    services::attachments::AttachmentInput,
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{delete, get},
    Router,
};
use tracing::info;
use uuid::Uuid;

/// Record the metadata of a file attached to a document
#[utoipa::path(
    post,
    path = "/api/v1/attachments",
    request_body = AttachmentInput,
    responses(
        (status = 201, description = "Attachment recorded", body = crate::ApiResponse<attachment::Model>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Document not found", body = crate::errors::ErrorResponse)
    ),
    tag = "attachments"
)]
pub async fn create_attachment(
    State(state): State<AppState>,
    Json(payload): Json<AttachmentInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let attachment = state
        .services
        .attachments
        .create(payload)
        .await
        .map_err(map_service_error)?;
    info!(attachment_id = %attachment.id, "Attachment recorded");
    Ok(created_response(attachment))
}

#[utoipa::path(
    get,
    path = "/api/v1/attachments",
    params(DocumentRef),
    responses(
        (status = 200, description = "Attachments of the document", body = crate::ApiResponse<Vec<attachment::Model>>)
    ),
    tag = "attachments"
)]
pub async fn list_attachments(
    State(state): State<AppState>,
    Query(document): Query<DocumentRef>,
) -> Result<impl IntoResponse, ApiError> {
    let attachments = state
        .services
        .attachments
        .list_for_document(document.kind, document.document_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(attachments))
}

#[utoipa::path(
    delete,
    path = "/api/v1/attachments/{id}",
    params(("id" = Uuid, Path, description = "Attachment ID")),
    responses(
        (status = 204, description = "Attachment removed"),
        (status = 404, description = "Attachment not found", body = crate::errors::ErrorResponse)
    ),
    tag = "attachments"
)]
pub async fn delete_attachment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .attachments
        .delete(id)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}

pub fn attachment_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_attachments).post(create_attachment))
        .route("/:id", delete(delete_attachment))
}
