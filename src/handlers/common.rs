use crate::errors::{ApiError, ServiceError};
use crate::services::documents::DocumentFilter;
use crate::services::rendering::RenderedDocument;
use crate::workflow::DocumentStatus;
use crate::{ApiResponse, PaginatedResponse};
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

/// Standard success response
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
}

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(ApiResponse::success(data))).into_response()
}

/// Standard no content response
pub fn no_content_response() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

/// Wraps one page of results with its paging metadata.
pub fn paginated_response<T: Serialize>(items: Vec<T>, total: u64, page: u64, per_page: u64) -> Response {
    success_response(PaginatedResponse::new(items, total, page, per_page))
}

/// Serves a rendered document as a download named after its number.
pub fn pdf_response(document: RenderedDocument) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", document.file_name);
    let mut response = (StatusCode::OK, document.bytes).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/pdf"),
    );
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    response
}

/// Validate request input
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ApiError> {
    input
        .validate()
        .map_err(|e| ApiError::ValidationError(format!("Validation failed: {}", e)))
}

/// Map service errors to API errors
pub fn map_service_error(err: ServiceError) -> ApiError {
    ApiError::ServiceError(err)
}

/// Pagination parameters for list operations
#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
pub struct PaginationParams {
    /// 1-based page number
    pub page: Option<u64>,
    /// Clamped to the configured maximum
    pub per_page: Option<u64>,
}

impl PaginationParams {
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }
}

/// Query string of every document list endpoint.
#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
pub struct DocumentListParams {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub status: Option<DocumentStatus>,
    /// Buyer, or supplier for purchase orders
    pub party_id: Option<Uuid>,
    /// Free text match, where the resource supports it
    pub search: Option<String>,
}

impl DocumentListParams {
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn filter(&self) -> DocumentFilter {
        DocumentFilter {
            status: self.status,
            party_id: self.party_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn pages_start_at_one() {
        assert_eq!(PaginationParams::default().page(), 1);
        let params = DocumentListParams {
            page: Some(0),
            ..Default::default()
        };
        assert_eq!(params.page(), 1);
    }

    #[tokio::test]
    async fn pdf_downloads_are_named_after_the_document() {
        let response = pdf_response(RenderedDocument {
            file_name: "PI-2026-0007.pdf".into(),
            bytes: b"%PDF-1.4".to_vec(),
        });
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/pdf"
        );
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"PI-2026-0007.pdf\""
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.starts_with(b"%PDF"));
    }
}
