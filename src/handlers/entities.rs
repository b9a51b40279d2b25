use super::common::{
    created_response, map_service_error, no_content_response, paginated_response,
    success_response, validate_input, PaginationParams,
};
use crate::{
    entities::business_entity,
    errors::ApiError,
    handlers::AppState,
    services::business_entities::{BusinessEntityInput, EntityFilter},
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use tracing::info;
use uuid::Uuid;

/// List buyers, suppliers and consignees by name
#[utoipa::path(
    get,
    path = "/api/v1/entities",
    params(PaginationParams, EntityFilter),
    responses(
        (status = 200, description = "Page of business entities", body = crate::ApiResponse<crate::PaginatedResponse<business_entity::Model>>),
        (status = 400, description = "Invalid query", body = crate::errors::ErrorResponse)
    ),
    tag = "entities"
)]
pub async fn list_business_entities(
    State(state): State<AppState>,
    Query(paging): Query<PaginationParams>,
    Query(filter): Query<EntityFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let page = paging.page();
    let per_page = state.config.page_size(paging.per_page);
    let (items, total) = state
        .services
        .business_entities
        .list(filter, page, per_page)
        .await
        .map_err(map_service_error)?;
    Ok(paginated_response(items, total, page, per_page))
}

/// Create a buyer, supplier or consignee
#[utoipa::path(
    post,
    path = "/api/v1/entities",
    request_body = BusinessEntityInput,
    responses(
        (status = 201, description = "Business entity created", body = crate::ApiResponse<business_entity::Model>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "entities"
)]
pub async fn create_business_entity(
    State(state): State<AppState>,
    Json(payload): Json<BusinessEntityInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let created = state
        .services
        .business_entities
        .create(payload)
        .await
        .map_err(map_service_error)?;
    info!(id = %created.id, "Business entity created");
    Ok(created_response(created))
}

#[utoipa::path(
    get,
    path = "/api/v1/entities/{id}",
    params(("id" = Uuid, Path, description = "Business entity ID")),
    responses(
        (status = 200, description = "Business entity fetched", body = crate::ApiResponse<business_entity::Model>),
        (status = 404, description = "Business entity not found", body = crate::errors::ErrorResponse)
    ),
    tag = "entities"
)]
pub async fn get_business_entity(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let found = state
        .services
        .business_entities
        .get(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(found))
}

#[utoipa::path(
    put,
    path = "/api/v1/entities/{id}",
    request_body = BusinessEntityInput,
    params(("id" = Uuid, Path, description = "Business entity ID")),
    responses(
        (status = 200, description = "Business entity updated", body = crate::ApiResponse<business_entity::Model>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Business entity not found", body = crate::errors::ErrorResponse)
    ),
    tag = "entities"
)]
pub async fn update_business_entity(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<BusinessEntityInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let updated = state
        .services
        .business_entities
        .update(id, payload)
        .await
        .map_err(map_service_error)?;
    info!(%id, "Business entity updated");
    Ok(success_response(updated))
}

/// Delete an entity no document refers to
#[utoipa::path(
    delete,
    path = "/api/v1/entities/{id}",
    params(("id" = Uuid, Path, description = "Business entity ID")),
    responses(
        (status = 204, description = "Business entity deleted"),
        (status = 404, description = "Business entity not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Entity is used on existing documents", body = crate::errors::ErrorResponse)
    ),
    tag = "entities"
)]
pub async fn delete_business_entity(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .business_entities
        .delete(id)
        .await
        .map_err(map_service_error)?;
    info!(%id, "Business entity deleted");
    Ok(no_content_response())
}

pub fn business_entity_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_business_entities).post(create_business_entity))
        .route(
            "/:id",
            get(get_business_entity).put(update_business_entity).delete(delete_business_entity),
        )
}
