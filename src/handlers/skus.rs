use super::common::{
    created_response, map_service_error, no_content_response, paginated_response,
    success_response, validate_input, PaginationParams,
};
use crate::{
    entities::sku,
    errors::ApiError,
    handlers::AppState,
    services::skus::{SkuInput, SkuFilter},
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use tracing::info;
use uuid::Uuid;

/// List SKUs, optionally for one product
#[utoipa::path(
    get,
    path = "/api/v1/skus",
    params(PaginationParams, SkuFilter),
    responses(
        (status = 200, description = "Page of SKUs", body = crate::ApiResponse<crate::PaginatedResponse<sku::Model>>),
        (status = 400, description = "Invalid query", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn list_skus(
    State(state): State<AppState>,
    Query(paging): Query<PaginationParams>,
    Query(filter): Query<SkuFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let page = paging.page();
    let per_page = state.config.page_size(paging.per_page);
    let (items, total) = state
        .services
        .skus
        .list(filter, page, per_page)
        .await
        .map_err(map_service_error)?;
    Ok(paginated_response(items, total, page, per_page))
}

/// Create an SKU under a product
#[utoipa::path(
    post,
    path = "/api/v1/skus",
    request_body = SkuInput,
    responses(
        (status = 201, description = "SKU created", body = crate::ApiResponse<sku::Model>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "SKU code already in use", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn create_sku(
    State(state): State<AppState>,
    Json(payload): Json<SkuInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let created = state
        .services
        .skus
        .create(payload)
        .await
        .map_err(map_service_error)?;
    info!(id = %created.id, "SKU created");
    Ok(created_response(created))
}

#[utoipa::path(
    get,
    path = "/api/v1/skus/{id}",
    params(("id" = Uuid, Path, description = "SKU ID")),
    responses(
        (status = 200, description = "SKU fetched", body = crate::ApiResponse<sku::Model>),
        (status = 404, description = "SKU not found", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn get_sku(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let found = state
        .services
        .skus
        .get(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(found))
}

#[utoipa::path(
    put,
    path = "/api/v1/skus/{id}",
    request_body = SkuInput,
    params(("id" = Uuid, Path, description = "SKU ID")),
    responses(
        (status = 200, description = "SKU updated", body = crate::ApiResponse<sku::Model>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "SKU not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "SKU code already in use", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn update_sku(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SkuInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let updated = state
        .services
        .skus
        .update(id, payload)
        .await
        .map_err(map_service_error)?;
    info!(%id, "SKU updated");
    Ok(success_response(updated))
}

/// Delete a SKU
#[utoipa::path(
    delete,
    path = "/api/v1/skus/{id}",
    params(("id" = Uuid, Path, description = "SKU ID")),
    responses(
        (status = 204, description = "SKU deleted"),
        (status = 404, description = "SKU not found", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn delete_sku(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .skus
        .delete(id)
        .await
        .map_err(map_service_error)?;
    info!(%id, "SKU deleted");
    Ok(no_content_response())
}

pub fn sku_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_skus).post(create_sku))
        .route(
            "/:id",
            get(get_sku).put(update_sku).delete(delete_sku),
        )
}
