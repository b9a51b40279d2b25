use super::common::{created_response, map_service_error, success_response, validate_input};
use crate::{
    entities::purchase_order,
    errors::ApiError,
    handlers::AppState,
    services::conversion::{
        ConversionOutcome, ConvertRequest, ExportOrderOptions, ProformaOptions,
        PurchaseOrderOptions, ShippingBillOptions,
    },
};
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
};
use tracing::info;
use uuid::Uuid;

/// Pulls an optional JSON body, falling back to the type's default.
fn body_or_default<T: Default>(payload: Option<Json<T>>) -> T {
    payload.map(|Json(body)| body).unwrap_or_default()
}

/// Convert an approved enquiry into a draft quote
#[utoipa::path(
    post,
    path = "/api/v1/enquiries/{id}/convert",
    request_body = ConvertRequest,
    params(("id" = Uuid, Path, description = "Enquiry ID")),
    responses(
        (status = 201, description = "Quote created from the enquiry", body = crate::ApiResponse<ConversionOutcome>),
        (status = 404, description = "Enquiry not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Enquiry cannot be converted in its current status", body = crate::errors::ErrorResponse)
    ),
    tag = "conversions"
)]
pub async fn convert_enquiry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Option<Json<ConvertRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let request = body_or_default(payload);
    validate_input(&request)?;
    let outcome = state
        .services
        .conversion
        .enquiry_to_quote(id, request)
        .await
        .map_err(map_service_error)?;
    info!(enquiry_id = %id, quote = %outcome.target_number, "Enquiry converted");
    Ok(created_response(outcome))
}

/// Convert an accepted quote into a draft proforma invoice
#[utoipa::path(
    post,
    path = "/api/v1/quotes/{id}/convert",
    request_body = ProformaOptions,
    params(("id" = Uuid, Path, description = "Quote ID")),
    responses(
        (status = 201, description = "Proforma invoice created from the quote", body = crate::ApiResponse<ConversionOutcome>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Quote not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Quote cannot be converted in its current status", body = crate::errors::ErrorResponse)
    ),
    tag = "conversions"
)]
pub async fn convert_quote(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Option<Json<ProformaOptions>>,
) -> Result<impl IntoResponse, ApiError> {
    let options = body_or_default(payload);
    validate_input(&options)?;
    let outcome = state
        .services
        .conversion
        .quote_to_proforma(id, options)
        .await
        .map_err(map_service_error)?;
    info!(quote_id = %id, proforma = %outcome.target_number, "Quote converted");
    Ok(created_response(outcome))
}

/// Convert an accepted proforma invoice into a draft export order
#[utoipa::path(
    post,
    path = "/api/v1/proforma-invoices/{id}/convert",
    request_body = ExportOrderOptions,
    params(("id" = Uuid, Path, description = "Proforma invoice ID")),
    responses(
        (status = 201, description = "Export order created from the proforma invoice", body = crate::ApiResponse<ConversionOutcome>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Proforma invoice not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Proforma invoice cannot be converted in its current status", body = crate::errors::ErrorResponse)
    ),
    tag = "conversions"
)]
pub async fn convert_proforma_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Option<Json<ExportOrderOptions>>,
) -> Result<impl IntoResponse, ApiError> {
    let options = body_or_default(payload);
    validate_input(&options)?;
    let outcome = state
        .services
        .conversion
        .proforma_to_export_order(id, options)
        .await
        .map_err(map_service_error)?;
    info!(proforma_id = %id, export_order = %outcome.target_number, "Proforma invoice converted");
    Ok(created_response(outcome))
}

/// Raise the shipping bill for a confirmed export order
#[utoipa::path(
    post,
    path = "/api/v1/export-orders/{id}/shipping-bill",
    request_body = ShippingBillOptions,
    params(("id" = Uuid, Path, description = "Export order ID")),
    responses(
        (status = 201, description = "Shipping bill created from the export order", body = crate::ApiResponse<ConversionOutcome>),
        (status = 400, description = "Port code missing or invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Export order not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Export order cannot be converted in its current status", body = crate::errors::ErrorResponse)
    ),
    tag = "conversions"
)]
pub async fn raise_shipping_bill(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Option<Json<ShippingBillOptions>>,
) -> Result<impl IntoResponse, ApiError> {
    let options = body_or_default(payload);
    validate_input(&options)?;
    let outcome = state
        .services
        .conversion
        .export_order_to_shipping_bill(id, options)
        .await
        .map_err(map_service_error)?;
    info!(export_order_id = %id, shipping_bill = %outcome.target_number, "Shipping bill raised");
    Ok(created_response(outcome))
}

/// Raise a purchase order to a supplier against an export order
#[utoipa::path(
    post,
    path = "/api/v1/export-orders/{id}/purchase-order",
    request_body = PurchaseOrderOptions,
    params(("id" = Uuid, Path, description = "Export order ID")),
    responses(
        (status = 201, description = "Purchase order created from the export order", body = crate::ApiResponse<ConversionOutcome>),
        (status = 400, description = "Invalid request, or the export order is not confirmed", body = crate::errors::ErrorResponse),
        (status = 404, description = "Export order or supplier not found", body = crate::errors::ErrorResponse)
    ),
    tag = "conversions"
)]
pub async fn raise_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(options): Json<PurchaseOrderOptions>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&options)?;
    let outcome = state
        .services
        .conversion
        .export_order_to_purchase_order(id, options)
        .await
        .map_err(map_service_error)?;
    info!(export_order_id = %id, purchase_order = %outcome.target_number, "Purchase order raised");
    Ok(created_response(outcome))
}

/// Purchase orders raised against an export order
#[utoipa::path(
    get,
    path = "/api/v1/export-orders/{id}/purchase-orders",
    params(("id" = Uuid, Path, description = "Export order ID")),
    responses(
        (status = 200, description = "Purchase orders for the export order", body = crate::ApiResponse<Vec<purchase_order::Model>>),
        (status = 404, description = "Export order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "conversions"
)]
pub async fn purchase_orders_for_export_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .export_orders
        .get(id)
        .await
        .map_err(map_service_error)?;
    let orders = state
        .services
        .purchase_orders
        .list_for_export_order(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(orders))
}
