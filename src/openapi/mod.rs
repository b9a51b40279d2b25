use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Trade Documents API",
        version = "1.0.0",
        description = r#"
# Trade Documents API

Manages the paperwork of an export deal: enquiry, quote, proforma invoice,
export order, purchase orders to suppliers and the shipping bill.

## Workflow

Every document has a status and a set of workflow actions
(`GET /{resource}/{id}/actions`). Actions are applied with
`POST /{resource}/{id}/actions/{action}`. Approved documents are locked;
`revise` returns them to draft and bumps the version.

Conversions create the next document of the chain from an approved or
accepted one and copy its line items.

## Money

Amounts are decimals with two places. Each document carries its currency and
an exchange rate to the base currency; approval thresholds apply to the base
amount.

## Errors

Failures return a JSON body with `error`, `message` and the `request_id`
echoed from the `x-request-id` header.

## Pagination

List endpoints take `page` (from 1) and `per_page`.
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "enquiries", description = "Buyer enquiries"),
        (name = "quotes", description = "Quotations and their approval"),
        (name = "proforma-invoices", description = "Proforma invoices"),
        (name = "export-orders", description = "Confirmed export orders"),
        (name = "purchase-orders", description = "Purchase orders to suppliers"),
        (name = "shipping-bills", description = "Customs shipping bills"),
        (name = "conversions", description = "Moving a deal to its next document"),
        (name = "entities", description = "Buyers, suppliers and consignees"),
        (name = "products", description = "Product catalogue and SKUs"),
        (name = "payments", description = "Payments received"),
        (name = "attachments", description = "Files attached to documents"),
        (name = "uploads", description = "CSV bulk uploads"),
        (name = "health", description = "Health check endpoints")
    ),
    paths(
        // Trade documents
        crate::handlers::enquiries::list_enquiries,
        crate::handlers::enquiries::create_enquiry,
        crate::handlers::enquiries::get_enquiry,
        crate::handlers::enquiries::update_enquiry,
        crate::handlers::enquiries::delete_enquiry,
        crate::handlers::enquiries::enquiry_actions,
        crate::handlers::enquiries::apply_enquiry_action,
        crate::handlers::enquiries::enquiry_history,
        crate::handlers::enquiries::enquiry_pdf,
        crate::handlers::quotes::list_quotes,
        crate::handlers::quotes::create_quote,
        crate::handlers::quotes::get_quote,
        crate::handlers::quotes::update_quote,
        crate::handlers::quotes::delete_quote,
        crate::handlers::quotes::quote_actions,
        crate::handlers::quotes::apply_quote_action,
        crate::handlers::quotes::quote_history,
        crate::handlers::quotes::quote_pdf,
        crate::handlers::proforma_invoices::list_proforma_invoices,
        crate::handlers::proforma_invoices::create_proforma_invoice,
        crate::handlers::proforma_invoices::get_proforma_invoice,
        crate::handlers::proforma_invoices::update_proforma_invoice,
        crate::handlers::proforma_invoices::delete_proforma_invoice,
        crate::handlers::proforma_invoices::proforma_invoice_actions,
        crate::handlers::proforma_invoices::apply_proforma_invoice_action,
        crate::handlers::proforma_invoices::proforma_invoice_history,
        crate::handlers::proforma_invoices::proforma_invoice_pdf,
        crate::handlers::export_orders::list_export_orders,
        crate::handlers::export_orders::create_export_order,
        crate::handlers::export_orders::get_export_order,
        crate::handlers::export_orders::update_export_order,
        crate::handlers::export_orders::delete_export_order,
        crate::handlers::export_orders::export_order_actions,
        crate::handlers::export_orders::apply_export_order_action,
        crate::handlers::export_orders::export_order_history,
        crate::handlers::export_orders::export_order_pdf,
        crate::handlers::purchase_orders::list_purchase_orders,
        crate::handlers::purchase_orders::create_purchase_order,
        crate::handlers::purchase_orders::get_purchase_order,
        crate::handlers::purchase_orders::update_purchase_order,
        crate::handlers::purchase_orders::delete_purchase_order,
        crate::handlers::purchase_orders::purchase_order_actions,
        crate::handlers::purchase_orders::apply_purchase_order_action,
        crate::handlers::purchase_orders::purchase_order_history,
        crate::handlers::purchase_orders::purchase_order_pdf,
        crate::handlers::shipping_bills::list_shipping_bills,
        crate::handlers::shipping_bills::create_shipping_bill,
        crate::handlers::shipping_bills::get_shipping_bill,
        crate::handlers::shipping_bills::update_shipping_bill,
        crate::handlers::shipping_bills::delete_shipping_bill,
        crate::handlers::shipping_bills::shipping_bill_actions,
        crate::handlers::shipping_bills::apply_shipping_bill_action,
        crate::handlers::shipping_bills::shipping_bill_history,
        crate::handlers::shipping_bills::shipping_bill_pdf,
        // Document chain
        crate::handlers::conversions::convert_enquiry,
        crate::handlers::conversions::convert_quote,
        crate::handlers::conversions::convert_proforma_invoice,
        crate::handlers::conversions::raise_shipping_bill,
        crate::handlers::conversions::raise_purchase_order,
        crate::handlers::conversions::purchase_orders_for_export_order,
        // Master data
        crate::handlers::entities::list_business_entities,
        crate::handlers::entities::create_business_entity,
        crate::handlers::entities::get_business_entity,
        crate::handlers::entities::update_business_entity,
        crate::handlers::entities::delete_business_entity,
        crate::handlers::products::list_products,
        crate::handlers::products::create_product,
        crate::handlers::products::get_product,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,
        crate::handlers::products::product_skus,
        crate::handlers::skus::list_skus,
        crate::handlers::skus::create_sku,
        crate::handlers::skus::get_sku,
        crate::handlers::skus::update_sku,
        crate::handlers::skus::delete_sku,
        // Payments, attachments and uploads
        crate::handlers::payments::record_payment,
        crate::handlers::payments::list_payments,
        crate::handlers::payments::delete_payment,
        crate::handlers::payments::payment_balance,
        crate::handlers::attachments::create_attachment,
        crate::handlers::attachments::list_attachments,
        crate::handlers::attachments::delete_attachment,
        crate::handlers::uploads::upload_entities,
        crate::handlers::uploads::upload_products,
        crate::handlers::uploads::upload_enquiries,
        // Health
        crate::handlers::health::liveness_check,
        crate::handlers::health::status_check
    ),
    components(
        schemas(
            // Documents
            crate::entities::enquiry::Model,
            crate::entities::quote::Model,
            crate::entities::proforma_invoice::Model,
            crate::entities::export_order::Model,
            crate::entities::purchase_order::Model,
            crate::entities::shipping_bill::Model,
            crate::entities::line_item::Model,
            crate::entities::status_history::Model,
            crate::services::enquiries::EnquiryInput,
            crate::services::quotes::QuoteInput,
            crate::services::proforma_invoices::ProformaInvoiceInput,
            crate::services::export_orders::ExportOrderInput,
            crate::services::purchase_orders::PurchaseOrderInput,
            crate::services::shipping_bills::ShippingBillInput,
            crate::services::line_items::LineItemInput,
            crate::services::documents::ActionRequest,
            crate::services::documents::AllowedActions,
            crate::pricing::DocumentTotals,

            // Workflow
            crate::workflow::DocumentKind,
            crate::workflow::DocumentStatus,
            crate::workflow::WorkflowAction,

            // Conversions
            crate::services::conversion::ConvertRequest,
            crate::services::conversion::ProformaOptions,
            crate::services::conversion::ExportOrderOptions,
            crate::services::conversion::ShippingBillOptions,
            crate::services::conversion::PurchaseOrderOptions,
            crate::services::conversion::ConversionOutcome,

            // Master data
            crate::entities::business_entity::Model,
            crate::entities::business_entity::EntityType,
            crate::entities::product::Model,
            crate::entities::sku::Model,
            crate::services::business_entities::BusinessEntityInput,
            crate::services::products::ProductInput,
            crate::services::skus::SkuInput,

            // Payments, attachments and uploads
            crate::entities::payment::Model,
            crate::entities::payment::PaymentMethod,
            crate::entities::attachment::Model,
            crate::services::payments::PaymentInput,
            crate::services::payments::PaymentBalance,
            crate::services::payments::BalanceState,
            crate::services::attachments::AttachmentInput,
            crate::services::bulk_upload::UploadTarget,
            crate::services::bulk_upload::UploadSummary,
            crate::services::bulk_upload::RowError,

            // Common types
            crate::ResponseMeta,
            crate::handlers::health::HealthResponse,
            crate::handlers::health::ComponentHealth,
            crate::handlers::health::ComponentStatus,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_the_document_chain() {
        let openapi = ApiDocV1::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();
        assert!(json.contains("Trade Documents API"));
        assert!(json.contains("/api/v1/enquiries/{id}/convert"));
        assert!(json.contains("/api/v1/export-orders/{id}/shipping-bill"));
        assert!(json.contains("/api/v1/payments/balance/{kind}/{id}"));
        assert!(json.contains("ConversionOutcome"));
    }
}
