use super::common::{map_service_error, success_response};
use crate::{
    errors::ApiError,
    handlers::AppState,
    services::bulk_upload::{UploadSummary, UploadTarget},
};
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    response::IntoResponse,
    routing::post,
    Router,
};
use tracing::{info, warn};

/// Multipart overhead allowed on top of the configured file size.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// The `file` part of an upload form.
struct UploadedFile {
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

async fn read_file(mut multipart: Multipart, max_bytes: usize) -> Result<UploadedFile, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| ApiError::BadRequest {
        message: "Malformed multipart body".to_string(),
        details: Some(e.to_string()),
    })? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| ApiError::BadRequest {
            message: "Could not read the uploaded file".to_string(),
            details: Some(e.to_string()),
        })?;
        if bytes.len() > max_bytes {
            warn!(size = bytes.len(), max_bytes, "Upload rejected as too large");
            return Err(ApiError::PayloadTooLarge(format!(
                "file is {} bytes; the limit is {} bytes",
                bytes.len(),
                max_bytes
            )));
        }
        return Ok(UploadedFile {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }
    Err(ApiError::BadRequest {
        message: "Form field 'file' is required".to_string(),
        details: None,
    })
}

async fn upload(
    state: AppState,
    target: UploadTarget,
    multipart: Multipart,
) -> Result<axum::response::Response, ApiError> {
    let file = read_file(multipart, state.config.max_upload_bytes).await?;
    let summary = state
        .services
        .bulk_upload
        .upload(
            target,
            file.file_name.as_deref(),
            file.content_type.as_deref(),
            &file.bytes,
        )
        .await
        .map_err(map_service_error)?;
    info!(%target, inserted = summary.inserted, skipped = summary.skipped, "Upload processed");
    Ok(success_response(summary))
}

/// Load buyers, suppliers and consignees from a CSV file
#[utoipa::path(
    post,
    path = "/api/v1/uploads/entities",
    request_body(content = String, content_type = "multipart/form-data", description = "CSV file in the `file` field"),
    responses(
        (status = 200, description = "Rows loaded; invalid rows are listed with their line", body = crate::ApiResponse<UploadSummary>),
        (status = 400, description = "Missing file or header row", body = crate::errors::ErrorResponse),
        (status = 413, description = "File too large", body = crate::errors::ErrorResponse),
        (status = 415, description = "Not a CSV file", body = crate::errors::ErrorResponse)
    ),
    tag = "uploads"
)]
pub async fn upload_entities(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    upload(state, UploadTarget::Entities, multipart).await
}

/// Load catalogue products from a CSV file
#[utoipa::path(
    post,
    path = "/api/v1/uploads/products",
    request_body(content = String, content_type = "multipart/form-data", description = "CSV file in the `file` field"),
    responses(
        (status = 200, description = "Rows loaded; invalid rows are listed with their line", body = crate::ApiResponse<UploadSummary>),
        (status = 400, description = "Missing file or header row", body = crate::errors::ErrorResponse),
        (status = 413, description = "File too large", body = crate::errors::ErrorResponse),
        (status = 415, description = "Not a CSV file", body = crate::errors::ErrorResponse)
    ),
    tag = "uploads"
)]
pub async fn upload_products(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    upload(state, UploadTarget::Products, multipart).await
}

/// Create draft enquiries from a CSV file, one line item per row
#[utoipa::path(
    post,
    path = "/api/v1/uploads/enquiries",
    request_body(content = String, content_type = "multipart/form-data", description = "CSV file in the `file` field"),
    responses(
        (status = 200, description = "Enquiries created; invalid rows are listed with their line", body = crate::ApiResponse<UploadSummary>),
        (status = 400, description = "Missing file or header row", body = crate::errors::ErrorResponse),
        (status = 413, description = "File too large", body = crate::errors::ErrorResponse),
        (status = 415, description = "Not a CSV file", body = crate::errors::ErrorResponse)
    ),
    tag = "uploads"
)]
pub async fn upload_enquiries(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    upload(state, UploadTarget::Enquiries, multipart).await
}

/// Upload routes; the body limit sits just above `max_upload_bytes` so
/// oversized files reach the handler and get a descriptive 413.
pub fn upload_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/entities", post(upload_entities))
        .route("/products", post(upload_products))
        .route("/enquiries", post(upload_enquiries))
        .layer(DefaultBodyLimit::max(
            max_upload_bytes.saturating_add(FORM_OVERHEAD_BYTES),
        ))
}
