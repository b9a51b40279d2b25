use super::common::{
    created_response, map_service_error, no_content_response, paginated_response,
    success_response, validate_input, PaginationParams,
};
use crate::{
    entities::product,
    errors::ApiError,
    handlers::AppState,
    services::products::{ProductInput, ProductFilter},
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use tracing::info;
use uuid::Uuid;

/// List products by name
#[utoipa::path(
    get,
    path = "/api/v1/products",
    params(PaginationParams, ProductFilter),
    responses(
        (status = 200, description = "Page of products", body = crate::ApiResponse<crate::PaginatedResponse<product::Model>>),
        (status = 400, description = "Invalid query", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(paging): Query<PaginationParams>,
    Query(filter): Query<ProductFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let page = paging.page();
    let per_page = state.config.page_size(paging.per_page);
    let (items, total) = state
        .services
        .products
        .list(filter, page, per_page)
        .await
        .map_err(map_service_error)?;
    Ok(paginated_response(items, total, page, per_page))
}

/// Create a catalogue product
#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = ProductInput,
    responses(
        (status = 201, description = "Product created", body = crate::ApiResponse<product::Model>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<ProductInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let created = state
        .services
        .products
        .create(payload)
        .await
        .map_err(map_service_error)?;
    info!(id = %created.id, "Product created");
    Ok(created_response(created))
}

#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product fetched", body = crate::ApiResponse<product::Model>),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let found = state
        .services
        .products
        .get(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(found))
}

#[utoipa::path(
    put,
    path = "/api/v1/products/{id}",
    request_body = ProductInput,
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product updated", body = crate::ApiResponse<product::Model>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProductInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let updated = state
        .services
        .products
        .update(id, payload)
        .await
        .map_err(map_service_error)?;
    info!(%id, "Product updated");
    Ok(success_response(updated))
}

/// Delete a product without SKUs
#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Product still has SKUs", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .products
        .delete(id)
        .await
        .map_err(map_service_error)?;
    info!(%id, "Product deleted");
    Ok(no_content_response())
}

/// SKUs of one product, by code
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}/skus",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "SKUs of the product", body = crate::ApiResponse<Vec<crate::entities::sku::Model>>),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn product_skus(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .products
        .get(id)
        .await
        .map_err(map_service_error)?;
    let skus = state
        .services
        .skus
        .list_for_product(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(skus))
}

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/:id/skus", get(product_skus))
}
