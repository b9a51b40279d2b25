use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, EntityTrait};
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::{
    config::CompanyProfile,
    entities::{business_entity, line_item, DocumentHeader},
    errors::ServiceError,
    pdf::{self, DocumentView, FobBlock, ItemRow, PartyBlock},
    pricing::{CurrencyCatalogue, DocumentTotals},
    services::{
        documents::{self, AnyDocument, DocumentSettings},
        line_items,
    },
    workflow::{DocumentKind, DocumentStatus},
};

/// A rendered PDF ready to be sent as a download.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Kind of the document each kind is usually converted from.
fn source_kind(kind: DocumentKind) -> Option<DocumentKind> {
    match kind {
        DocumentKind::Enquiry => None,
        DocumentKind::Quote => Some(DocumentKind::Enquiry),
        DocumentKind::ProformaInvoice => Some(DocumentKind::Quote),
        DocumentKind::ExportOrder => Some(DocumentKind::ProformaInvoice),
        DocumentKind::PurchaseOrder | DocumentKind::ShippingBill => Some(DocumentKind::ExportOrder),
    }
}

fn date(value: Option<NaiveDate>) -> Option<String> {
    value.map(|d| d.format("%d-%b-%Y").to_string())
}

/// Meta grid rows in print order; empty values are skipped.
#[derive(Default)]
struct Meta(Vec<(String, String)>);

impl Meta {
    fn push(&mut self, label: &str, value: Option<String>) {
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            self.0.push((label.to_string(), value));
        }
    }

    fn text(&mut self, label: &str, value: &Option<String>) {
        self.push(label, value.clone());
    }
}

/// Who appears in the party boxes, besides the exporter.
struct Parties {
    primary: (&'static str, Uuid),
    consignee: Option<Uuid>,
    deliver_to: Option<String>,
}

fn describe(doc: &AnyDocument) -> (Parties, Meta) {
    let mut meta = Meta::default();
    let parties = match doc {
        AnyDocument::Enquiry(m) => {
            meta.push("Subject", Some(m.subject.clone()));
            meta.text("Source", &m.source);
            meta.push("Required By", date(m.required_by));
            Parties {
                primary: ("Buyer", m.buyer_id),
                consignee: None,
                deliver_to: None,
            }
        }
        AnyDocument::Quote(m) => {
            meta.push("Valid Until", date(m.valid_until));
            meta.text("Incoterms", &m.incoterms);
            meta.text("Payment Terms", &m.payment_terms);
            meta.text("Delivery Terms", &m.delivery_terms);
            Parties {
                primary: ("Buyer", m.buyer_id),
                consignee: None,
                deliver_to: None,
            }
        }
        AnyDocument::ProformaInvoice(m) => {
            meta.push("Valid Until", date(m.valid_until));
            meta.text("Port of Loading", &m.port_of_loading);
            meta.text("Port of Discharge", &m.port_of_discharge);
            meta.text("Final Destination", &m.final_destination);
            meta.text("Incoterms", &m.incoterms);
            meta.text("Payment Terms", &m.payment_terms);
            Parties {
                primary: ("Buyer", m.buyer_id),
                consignee: m.consignee_id,
                deliver_to: None,
            }
        }
        AnyDocument::ExportOrder(m) => {
            meta.text("Buyer PO No.", &m.buyer_po_number);
            meta.push("Expected Ship Date", date(m.expected_ship_date));
            meta.push("Shipped On", date(m.shipped_on));
            meta.text("Port of Loading", &m.port_of_loading);
            meta.text("Port of Discharge", &m.port_of_discharge);
            meta.text("Final Destination", &m.final_destination);
            meta.text("Incoterms", &m.incoterms);
            meta.text("Payment Terms", &m.payment_terms);
            Parties {
                primary: ("Buyer", m.buyer_id),
                consignee: m.consignee_id,
                deliver_to: None,
            }
        }
        AnyDocument::PurchaseOrder(m) => {
            meta.push("Expected Delivery", date(m.expected_delivery));
            meta.text("Incoterms", &m.incoterms);
            meta.text("Payment Terms", &m.payment_terms);
            Parties {
                primary: ("Supplier", m.supplier_id),
                consignee: None,
                deliver_to: m.delivery_address.clone(),
            }
        }
        AnyDocument::ShippingBill(m) => {
            meta.push("Port Code", Some(m.port_code.clone()));
            meta.push("Country of Destination", Some(m.country_of_destination.clone()));
            meta.text("Port of Loading", &m.port_of_loading);
            meta.text("Port of Discharge", &m.port_of_discharge);
            meta.text("Incoterms", &m.incoterms);
            meta.text("Vessel", &m.vessel_name);
            meta.text("Container No.", &m.container_number);
            Parties {
                primary: ("Buyer", m.buyer_id),
                consignee: m.consignee_id,
                deliver_to: None,
            }
        }
    };
    (parties, meta)
}

/// Owned copy of a document header.
struct Header {
    number: String,
    version: i32,
    status: DocumentStatus,
    document_date: NaiveDate,
    currency: String,
    exchange_rate: Decimal,
    reference_id: Option<Uuid>,
    totals: DocumentTotals,
    base_grand_total: Decimal,
    notes: Option<String>,
    terms: Option<String>,
}

impl Header {
    fn of(doc: &dyn DocumentHeader) -> Self {
        Self {
            number: doc.number().to_string(),
            version: doc.version(),
            status: doc.status(),
            document_date: doc.document_date(),
            currency: doc.currency().to_string(),
            exchange_rate: doc.exchange_rate(),
            reference_id: doc.reference_id(),
            totals: doc.totals(),
            base_grand_total: doc.base_grand_total(),
            notes: doc.notes().map(str::to_string),
            terms: doc.terms().map(str::to_string),
        }
    }
}

fn item_row(item: &line_item::Model) -> ItemRow {
    ItemRow {
        line_no: item.line_no,
        description: item.description.clone(),
        hsn_code: item.hsn_code.clone(),
        quantity: item.quantity,
        unit: item.unit.clone(),
        unit_price: item.unit_price,
        discount_percent: item.discount_percent,
        tax_percent: item.tax_percent,
        amount: item.amount,
    }
}

/// Builds printable views of stored documents and renders them to PDF.
#[derive(Clone)]
pub struct RenderingService {
    db: Arc<DatabaseConnection>,
    company: CompanyProfile,
    settings: DocumentSettings,
}

impl RenderingService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        company: CompanyProfile,
        settings: DocumentSettings,
    ) -> Self {
        Self {
            db,
            company,
            settings,
        }
    }

    async fn party(&self, heading: &str, id: Uuid) -> Result<PartyBlock, ServiceError> {
        let entity = business_entity::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Business entity", id))?;
        Ok(PartyBlock {
            heading: heading.to_string(),
            lines: entity.address_lines(),
        })
    }

    /// Loads a document with its lines and parties into a [`DocumentView`].
    pub async fn view(&self, kind: DocumentKind, id: Uuid) -> Result<DocumentView, ServiceError> {
        let doc = documents::find_any(&*self.db, kind, id).await?;
        let items = line_items::load(&*self.db, kind, id).await?;
        let header = Header::of(doc.header());
        let (parties, mut meta) = describe(&doc);

        let currency = CurrencyCatalogue::lookup(&header.currency).ok_or_else(|| {
            ServiceError::RenderError(format!("unknown currency {}", header.currency))
        })?;
        let base_currency = CurrencyCatalogue::lookup(&self.settings.base_currency)
            .ok_or_else(|| {
                ServiceError::RenderError(format!(
                    "unknown base currency {}",
                    self.settings.base_currency
                ))
            })?;

        meta.push("Currency", Some(currency.code.clone()));
        if currency.code != base_currency.code {
            meta.push(
                "Exchange Rate",
                Some(format!(
                    "1 {} = {} {}",
                    currency.code,
                    pdf::money::format_plain(header.exchange_rate),
                    base_currency.code
                )),
            );
        }
        if let (Some(reference_id), Some(reference_kind)) =
            (header.reference_id, source_kind(kind))
        {
            match documents::find_any(&*self.db, reference_kind, reference_id).await {
                Ok(reference) => meta.push(
                    &format!("{} No.", reference_kind.label()),
                    Some(reference.header().number().to_string()),
                ),
                Err(ServiceError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }

        let mut blocks = vec![self.party(parties.primary.0, parties.primary.1).await?];
        if let Some(consignee_id) = parties.consignee {
            blocks.push(self.party("Consignee", consignee_id).await?);
        }
        if let Some(address) = parties.deliver_to {
            blocks.push(PartyBlock {
                heading: "Deliver To".to_string(),
                lines: address.lines().map(str::to_string).collect(),
            });
        }

        let fob = match &doc {
            AnyDocument::ShippingBill(m) => Some(FobBlock {
                fob_value: m.fob_value,
                base_fob_value: m.base_fob_value,
            }),
            _ => None,
        };

        Ok(DocumentView {
            kind,
            number: header.number,
            version: header.version,
            status: header.status,
            document_date: header.document_date,
            currency,
            exchange_rate: header.exchange_rate,
            base_currency,
            parties: blocks,
            meta: meta.0,
            items: items.iter().map(item_row).collect(),
            totals: header.totals,
            base_grand_total: header.base_grand_total,
            fob,
            notes: header.notes,
            terms: header.terms,
        })
    }

    #[instrument(skip(self))]
    pub async fn render(&self, kind: DocumentKind, id: Uuid) -> Result<RenderedDocument, ServiceError> {
        let view = self.view(kind, id).await?;
        let bytes = pdf::render(&view, &self.company).map_err(|e| {
            error!(%kind, %id, "Failed to render document: {}", e);
            e
        })?;
        info!(%kind, number = %view.number, size = bytes.len(), "Document rendered");
        Ok(RenderedDocument {
            file_name: format!("{}.pdf", view.number),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_converted_kind_knows_its_source() {
        assert_eq!(source_kind(DocumentKind::Enquiry), None);
        assert_eq!(source_kind(DocumentKind::Quote), Some(DocumentKind::Enquiry));
        assert_eq!(
            source_kind(DocumentKind::ShippingBill),
            Some(DocumentKind::ExportOrder)
        );
        assert_eq!(
            source_kind(DocumentKind::PurchaseOrder),
            Some(DocumentKind::ExportOrder)
        );
    }

    #[test]
    fn meta_skips_blank_values() {
        let mut meta = Meta::default();
        meta.push("Incoterms", Some("FOB".into()));
        meta.push("Vessel", Some("  ".into()));
        meta.push("Shipped On", None);
        assert_eq!(meta.0, vec![("Incoterms".to_string(), "FOB".to_string())]);
    }
}
