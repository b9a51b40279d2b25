pub mod common;
pub mod conversions;
pub mod health;

// Trade documents
pub mod enquiries;
pub mod export_orders;
pub mod proforma_invoices;
pub mod purchase_orders;
pub mod quotes;
pub mod shipping_bills;

// Master data
pub mod entities;
pub mod products;
pub mod skus;

// Money and files
pub mod attachments;
pub mod payments;
pub mod uploads;

use crate::config::AppConfig;
use crate::events::EventSender;
use crate::services::{
    attachments::AttachmentService, business_entities::BusinessEntityService,
    bulk_upload::BulkUploadService, conversion::ConversionService,
    documents::DocumentSettings, enquiries::EnquiryService, export_orders::ExportOrderService,
    payments::PaymentService, products::ProductService,
    proforma_invoices::ProformaInvoiceService, purchase_orders::PurchaseOrderService,
    quotes::QuoteService, rendering::RenderingService, shipping_bills::ShippingBillService,
    skus::SkuService,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub enquiries: Arc<EnquiryService>,
    pub quotes: Arc<QuoteService>,
    pub proforma_invoices: Arc<ProformaInvoiceService>,
    pub export_orders: Arc<ExportOrderService>,
    pub purchase_orders: Arc<PurchaseOrderService>,
    pub shipping_bills: Arc<ShippingBillService>,
    pub conversion: Arc<ConversionService>,
    pub business_entities: Arc<BusinessEntityService>,
    pub products: Arc<ProductService>,
    pub skus: Arc<SkuService>,
    pub payments: Arc<PaymentService>,
    pub attachments: Arc<AttachmentService>,
    pub bulk_upload: Arc<BulkUploadService>,
    pub rendering: Arc<RenderingService>,
}

impl AppServices {
    /// Wires every service onto one database pool and event channel.
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender, config: &AppConfig) -> Self {
        let settings = DocumentSettings::from_config(config);

        let enquiries = EnquiryService::new(db.clone(), event_sender.clone(), settings.clone());
        let business_entities = BusinessEntityService::new(db.clone());
        let products = ProductService::new(db.clone(), config.default_currency.clone());
        let bulk_upload = BulkUploadService::new(
            db.clone(),
            event_sender.clone(),
            business_entities.clone(),
            products.clone(),
            enquiries.clone(),
        );

        Self {
            quotes: Arc::new(QuoteService::new(
                db.clone(),
                event_sender.clone(),
                settings.clone(),
            )),
            proforma_invoices: Arc::new(ProformaInvoiceService::new(
                db.clone(),
                event_sender.clone(),
                settings.clone(),
            )),
            export_orders: Arc::new(ExportOrderService::new(
                db.clone(),
                event_sender.clone(),
                settings.clone(),
            )),
            purchase_orders: Arc::new(PurchaseOrderService::new(
                db.clone(),
                event_sender.clone(),
                settings.clone(),
            )),
            shipping_bills: Arc::new(ShippingBillService::new(
                db.clone(),
                event_sender.clone(),
                settings.clone(),
            )),
            conversion: Arc::new(ConversionService::new(
                db.clone(),
                event_sender.clone(),
                settings.clone(),
            )),
            skus: Arc::new(SkuService::new(db.clone())),
            payments: Arc::new(PaymentService::new(
                db.clone(),
                event_sender,
                settings.clone(),
            )),
            attachments: Arc::new(AttachmentService::new(db.clone())),
            rendering: Arc::new(RenderingService::new(db, config.company.clone(), settings)),
            enquiries: Arc::new(enquiries),
            business_entities: Arc::new(business_entities),
            products: Arc::new(products),
            bulk_upload: Arc::new(bulk_upload),
        }
    }
}
