//! Conversions along the document chain.
//!
//! Each conversion runs in one transaction: the source is marked `converted`
//! and points at the new draft, which points back through its reference id
//! and starts with a copy of the source's lines.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, DatabaseConnection, DatabaseTransaction, EntityTrait,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::{
        enquiry, export_order, line_item, proforma_invoice, purchase_order, quote, shipping_bill,
        DocumentHeader, StatusChange, WorkflowStamp,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    pricing::{self, Charges},
    services::{
        documents::{self, validate_non_negative, DocumentSettings, PartyRole},
        history::{self, HistoryEntry},
        line_items, numbering,
        shipping_bills::fob_values,
    },
    workflow::{self, DocumentKind, DocumentStatus, PlanContext, Transition, WorkflowAction},
};

/// Who converts and why; shared by every conversion body.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct ConvertRequest {
    #[validate(length(max = 100))]
    pub actor: Option<String>,
    #[validate(length(max = 2000))]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct ProformaOptions {
    pub consignee_id: Option<Uuid>,
    #[validate(length(max = 100))]
    pub port_of_loading: Option<String>,
    #[validate(length(max = 100))]
    pub port_of_discharge: Option<String>,
    #[validate(length(max = 100))]
    pub final_destination: Option<String>,
    #[validate(length(max = 16))]
    pub incoterms: Option<String>,
    #[serde(default)]
    #[validate(custom = "validate_non_negative")]
    pub freight: Decimal,
    #[serde(default)]
    #[validate(custom = "validate_non_negative")]
    pub insurance: Decimal,
    #[validate(length(max = 100))]
    pub actor: Option<String>,
    #[validate(length(max = 2000))]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct ExportOrderOptions {
    pub expected_ship_date: Option<NaiveDate>,
    #[validate(length(max = 64))]
    pub buyer_po_number: Option<String>,
    #[validate(length(max = 100))]
    pub actor: Option<String>,
    #[validate(length(max = 2000))]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct ShippingBillOptions {
    /// Customs port code; required
    #[validate(length(max = 16))]
    pub port_code: Option<String>,
    /// Falls back to the order's final destination
    #[validate(length(max = 100))]
    pub country_of_destination: Option<String>,
    #[validate(length(max = 100))]
    pub vessel_name: Option<String>,
    #[validate(length(max = 50))]
    pub container_number: Option<String>,
    #[validate(length(max = 100))]
    pub actor: Option<String>,
    #[validate(length(max = 2000))]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct PurchaseOrderOptions {
    pub supplier_id: Uuid,
    pub expected_delivery: Option<NaiveDate>,
    #[validate(length(max = 500))]
    pub delivery_address: Option<String>,
    /// Defaults to the export order's currency
    #[validate(length(equal = 3))]
    pub currency: Option<String>,
    pub exchange_rate: Option<Decimal>,
    #[validate(length(max = 100))]
    pub actor: Option<String>,
    #[validate(length(max = 2000))]
    pub note: Option<String>,
}

/// Result of a conversion: the source as it ends up and the new draft.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ConversionOutcome {
    pub source_kind: DocumentKind,
    pub source_id: Uuid,
    pub source_status: DocumentStatus,
    pub target_kind: DocumentKind,
    pub target_id: Uuid,
    pub target_number: String,
    pub items: Vec<line_item::Model>,
}

/// Plans `convert` on the source and builds the fields it writes.
fn plan_convert<D: DocumentHeader>(source: &D) -> Result<(Transition, StatusChange), ServiceError> {
    let transition = workflow::plan(
        source.kind(),
        source.status(),
        WorkflowAction::Convert,
        PlanContext::default(),
    )?;
    let change = StatusChange {
        to: transition.to,
        version: source.version(),
        reason: None,
        approved_by: None,
        at: Utc::now(),
    };
    Ok((transition, change))
}

/// The two audit rows a conversion writes.
fn conversion_history<D: DocumentHeader>(
    source: &D,
    transition: &Transition,
    target_kind: DocumentKind,
    target_id: Uuid,
    target_number: &str,
    actor: Option<String>,
    note: Option<String>,
) -> (HistoryEntry, HistoryEntry) {
    let source_entry = HistoryEntry {
        kind: source.kind(),
        document_id: source.id(),
        from: Some(transition.from),
        to: transition.to,
        action: transition.action.to_string(),
        actor: actor.clone(),
        note: note
            .clone()
            .or_else(|| Some(format!("converted to {}", target_number))),
        version: source.version(),
    };
    let target_entry = HistoryEntry {
        action: history::CONVERTED_FROM.to_string(),
        ..HistoryEntry::created(target_kind, target_id, actor)
    }
    .with_note(Some(format!("created from {}", source.number())));
    (source_entry, target_entry)
}

#[derive(Clone)]
pub struct ConversionService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
    settings: DocumentSettings,
}

impl ConversionService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: EventSender,
        settings: DocumentSettings,
    ) -> Self {
        Self {
            db,
            event_sender,
            settings,
        }
    }

    async fn begin(&self) -> Result<DatabaseTransaction, ServiceError> {
        self.db.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            ServiceError::DatabaseError(e)
        })
    }

    async fn commit(txn: DatabaseTransaction) -> Result<(), ServiceError> {
        txn.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            ServiceError::DatabaseError(e)
        })
    }

    async fn announce(&self, outcome: &ConversionOutcome) {
        info!(
            source_kind = %outcome.source_kind,
            source_id = %outcome.source_id,
            target_kind = %outcome.target_kind,
            target_number = %outcome.target_number,
            "Document converted"
        );
        self.event_sender
            .publish(Event::DocumentConverted {
                source_kind: outcome.source_kind,
                source_id: outcome.source_id,
                target_kind: outcome.target_kind,
                target_id: outcome.target_id,
                target_number: outcome.target_number.clone(),
            })
            .await;
    }

    #[instrument(skip(self, request), fields(enquiry_id = %enquiry_id))]
    pub async fn enquiry_to_quote(
        &self,
        enquiry_id: Uuid,
        request: ConvertRequest,
    ) -> Result<ConversionOutcome, ServiceError> {
        request.validate()?;
        let txn = self.begin().await?;

        let source = enquiry::Entity::find_by_id(enquiry_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found(DocumentKind::Enquiry.label(), enquiry_id))?;
        let (transition, change) = plan_convert(&source)?;

        let target_kind = DocumentKind::Quote;
        let source_lines = line_items::load(&txn, source.kind(), source.id).await?;
        let totals = line_items::totals_for_lines(&source_lines, Charges::default());
        let base_grand_total = pricing::to_base(totals.grand_total, source.exchange_rate)?;
        let actor = documents::clean(request.actor);
        let date = documents::today();
        let number = numbering::next_number(&txn, target_kind, date).await?;
        let now = Utc::now();
        let target_id = Uuid::new_v4();

        let target = quote::ActiveModel {
            id: Set(target_id),
            number: Set(number),
            status: Set(DocumentStatus::Draft),
            version: Set(1),
            buyer_id: Set(source.buyer_id),
            reference_id: Set(Some(source.id)),
            document_date: Set(date),
            valid_until: Set(None),
            currency: Set(source.currency.clone()),
            exchange_rate: Set(source.exchange_rate),
            incoterms: Set(None),
            payment_terms: Set(None),
            delivery_terms: Set(None),
            approval_required: Set(false),
            subtotal: Set(totals.subtotal),
            discount_total: Set(totals.discount_total),
            tax_total: Set(totals.tax_total),
            grand_total: Set(totals.grand_total),
            base_grand_total: Set(base_grand_total),
            notes: Set(source.notes.clone()),
            terms: Set(source.terms.clone()),
            converted_to_id: Set(None),
            status_reason: Set(None),
            approved_by: Set(None),
            approved_at: Set(None),
            created_by: Set(actor.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            error!("Failed to insert quote from enquiry: {}", e);
            ServiceError::DatabaseError(e)
        })?;
        let items =
            line_items::copy(&txn, source.kind(), source.id, target_kind, target_id).await?;

        let (source_entry, target_entry) = conversion_history(
            &source,
            &transition,
            target_kind,
            target_id,
            &target.number,
            actor,
            documents::clean(request.note),
        );
        let mut active: enquiry::ActiveModel = source.into();
        active.stamp(&change);
        active.converted_to_id = Set(Some(target_id));
        active.update(&txn).await?;
        history::record(&txn, source_entry).await?;
        history::record(&txn, target_entry).await?;

        Self::commit(txn).await?;

        let outcome = ConversionOutcome {
            source_kind: DocumentKind::Enquiry,
            source_id: enquiry_id,
            source_status: transition.to,
            target_kind,
            target_id,
            target_number: target.number,
            items,
        };
        self.announce(&outcome).await;
        Ok(outcome)
    }

    #[instrument(skip(self, options), fields(quote_id = %quote_id))]
    pub async fn quote_to_proforma(
        &self,
        quote_id: Uuid,
        options: ProformaOptions,
    ) -> Result<ConversionOutcome, ServiceError> {
        options.validate()?;
        let txn = self.begin().await?;

        let source = quote::Entity::find_by_id(quote_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found(DocumentKind::Quote.label(), quote_id))?;
        let (transition, change) = plan_convert(&source)?;
        if let Some(consignee_id) = options.consignee_id {
            documents::ensure_party(&txn, consignee_id, PartyRole::Consignee).await?;
        }

        let target_kind = DocumentKind::ProformaInvoice;
        let charges = Charges {
            freight: options.freight,
            insurance: options.insurance,
        };
        let source_lines = line_items::load(&txn, source.kind(), source.id).await?;
        let totals = line_items::totals_for_lines(&source_lines, charges);
        let base_grand_total = pricing::to_base(totals.grand_total, source.exchange_rate)?;
        let actor = documents::clean(options.actor);
        let date = documents::today();
        let number = numbering::next_number(&txn, target_kind, date).await?;
        let now = Utc::now();
        let target_id = Uuid::new_v4();

        let target = proforma_invoice::ActiveModel {
            id: Set(target_id),
            number: Set(number),
            status: Set(DocumentStatus::Draft),
            version: Set(1),
            buyer_id: Set(source.buyer_id),
            consignee_id: Set(options.consignee_id),
            reference_id: Set(Some(source.id)),
            document_date: Set(date),
            valid_until: Set(source.valid_until),
            currency: Set(source.currency.clone()),
            exchange_rate: Set(source.exchange_rate),
            port_of_loading: Set(documents::clean(options.port_of_loading)),
            port_of_discharge: Set(documents::clean(options.port_of_discharge)),
            final_destination: Set(documents::clean(options.final_destination)),
            incoterms: Set(documents::clean(options.incoterms).or_else(|| source.incoterms.clone())),
            payment_terms: Set(source.payment_terms.clone()),
            freight: Set(totals.freight),
            insurance: Set(totals.insurance),
            subtotal: Set(totals.subtotal),
            discount_total: Set(totals.discount_total),
            tax_total: Set(totals.tax_total),
            grand_total: Set(totals.grand_total),
            base_grand_total: Set(base_grand_total),
            notes: Set(source.notes.clone()),
            terms: Set(source.terms.clone()),
            converted_to_id: Set(None),
            status_reason: Set(None),
            approved_by: Set(None),
            approved_at: Set(None),
            created_by: Set(actor.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            error!("Failed to insert proforma invoice from quote: {}", e);
            ServiceError::DatabaseError(e)
        })?;
        let items =
            line_items::copy(&txn, source.kind(), source.id, target_kind, target_id).await?;

        let (source_entry, target_entry) = conversion_history(
            &source,
            &transition,
            target_kind,
            target_id,
            &target.number,
            actor,
            documents::clean(options.note),
        );
        let mut active: quote::ActiveModel = source.into();
        active.stamp(&change);
        active.converted_to_id = Set(Some(target_id));
        active.update(&txn).await?;
        history::record(&txn, source_entry).await?;
        history::record(&txn, target_entry).await?;

        Self::commit(txn).await?;

        let outcome = ConversionOutcome {
            source_kind: DocumentKind::Quote,
            source_id: quote_id,
            source_status: transition.to,
            target_kind,
            target_id,
            target_number: target.number,
            items,
        };
        self.announce(&outcome).await;
        Ok(outcome)
    }

    #[instrument(skip(self, options), fields(proforma_invoice_id = %invoice_id))]
    pub async fn proforma_to_export_order(
        &self,
        invoice_id: Uuid,
        options: ExportOrderOptions,
    ) -> Result<ConversionOutcome, ServiceError> {
        options.validate()?;
        let txn = self.begin().await?;

        let source = proforma_invoice::Entity::find_by_id(invoice_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::not_found(DocumentKind::ProformaInvoice.label(), invoice_id)
            })?;
        let (transition, change) = plan_convert(&source)?;

        let target_kind = DocumentKind::ExportOrder;
        let source_lines = line_items::load(&txn, source.kind(), source.id).await?;
        let totals = line_items::totals_for_lines(&source_lines, source.charges());
        let base_grand_total = pricing::to_base(totals.grand_total, source.exchange_rate)?;
        let actor = documents::clean(options.actor);
        let date = documents::today();
        let number = numbering::next_number(&txn, target_kind, date).await?;
        let now = Utc::now();
        let target_id = Uuid::new_v4();

        let target = export_order::ActiveModel {
            id: Set(target_id),
            number: Set(number),
            status: Set(DocumentStatus::Draft),
            version: Set(1),
            buyer_id: Set(source.buyer_id),
            consignee_id: Set(source.consignee_id),
            reference_id: Set(Some(source.id)),
            buyer_po_number: Set(documents::clean(options.buyer_po_number)),
            document_date: Set(date),
            expected_ship_date: Set(options.expected_ship_date),
            shipped_on: Set(None),
            currency: Set(source.currency.clone()),
            exchange_rate: Set(source.exchange_rate),
            port_of_loading: Set(source.port_of_loading.clone()),
            port_of_discharge: Set(source.port_of_discharge.clone()),
            final_destination: Set(source.final_destination.clone()),
            incoterms: Set(source.incoterms.clone()),
            payment_terms: Set(source.payment_terms.clone()),
            freight: Set(totals.freight),
            insurance: Set(totals.insurance),
            subtotal: Set(totals.subtotal),
            discount_total: Set(totals.discount_total),
            tax_total: Set(totals.tax_total),
            grand_total: Set(totals.grand_total),
            base_grand_total: Set(base_grand_total),
            notes: Set(source.notes.clone()),
            terms: Set(source.terms.clone()),
            converted_to_id: Set(None),
            status_reason: Set(None),
            approved_by: Set(None),
            approved_at: Set(None),
            created_by: Set(actor.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            error!("Failed to insert export order from proforma invoice: {}", e);
            ServiceError::DatabaseError(e)
        })?;
        let items =
            line_items::copy(&txn, source.kind(), source.id, target_kind, target_id).await?;

        let (source_entry, target_entry) = conversion_history(
            &source,
            &transition,
            target_kind,
            target_id,
            &target.number,
            actor,
            documents::clean(options.note),
        );
        let mut active: proforma_invoice::ActiveModel = source.into();
        active.stamp(&change);
        active.converted_to_id = Set(Some(target_id));
        active.update(&txn).await?;
        history::record(&txn, source_entry).await?;
        history::record(&txn, target_entry).await?;

        Self::commit(txn).await?;

        let outcome = ConversionOutcome {
            source_kind: DocumentKind::ProformaInvoice,
            source_id: invoice_id,
            source_status: transition.to,
            target_kind,
            target_id,
            target_number: target.number,
            items,
        };
        self.announce(&outcome).await;
        Ok(outcome)
    }

    #[instrument(skip(self, options), fields(export_order_id = %order_id))]
    pub async fn export_order_to_shipping_bill(
        &self,
        order_id: Uuid,
        options: ShippingBillOptions,
    ) -> Result<ConversionOutcome, ServiceError> {
        options.validate()?;
        let port_code = options
            .port_code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(str::to_ascii_uppercase)
            .ok_or_else(|| ServiceError::ValidationError("port code is required".into()))?;

        let txn = self.begin().await?;

        let source = export_order::Entity::find_by_id(order_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found(DocumentKind::ExportOrder.label(), order_id))?;
        let (transition, change) = plan_convert(&source)?;
        let country_of_destination = documents::clean(options.country_of_destination)
            .or_else(|| source.final_destination.clone())
            .ok_or_else(|| {
                ServiceError::ValidationError("country of destination is required".into())
            })?;

        let target_kind = DocumentKind::ShippingBill;
        let source_lines = line_items::load(&txn, source.kind(), source.id).await?;
        let totals = line_items::totals_for_lines(&source_lines, source.charges());
        let base_grand_total = pricing::to_base(totals.grand_total, source.exchange_rate)?;
        let (fob_value, base_fob_value) = fob_values(&totals, source.exchange_rate)?;
        let actor = documents::clean(options.actor);
        let date = documents::today();
        let number = numbering::next_number(&txn, target_kind, date).await?;
        let now = Utc::now();
        let target_id = Uuid::new_v4();

        let target = shipping_bill::ActiveModel {
            id: Set(target_id),
            number: Set(number),
            status: Set(DocumentStatus::Draft),
            version: Set(1),
            buyer_id: Set(source.buyer_id),
            consignee_id: Set(source.consignee_id),
            reference_id: Set(Some(source.id)),
            document_date: Set(date),
            port_code: Set(port_code),
            country_of_destination: Set(country_of_destination),
            port_of_loading: Set(source.port_of_loading.clone()),
            port_of_discharge: Set(source.port_of_discharge.clone()),
            incoterms: Set(source.incoterms.clone()),
            vessel_name: Set(documents::clean(options.vessel_name)),
            container_number: Set(documents::clean(options.container_number)),
            currency: Set(source.currency.clone()),
            exchange_rate: Set(source.exchange_rate),
            freight: Set(totals.freight),
            insurance: Set(totals.insurance),
            subtotal: Set(totals.subtotal),
            discount_total: Set(totals.discount_total),
            tax_total: Set(totals.tax_total),
            grand_total: Set(totals.grand_total),
            base_grand_total: Set(base_grand_total),
            fob_value: Set(fob_value),
            base_fob_value: Set(base_fob_value),
            notes: Set(source.notes.clone()),
            terms: Set(source.terms.clone()),
            status_reason: Set(None),
            approved_by: Set(None),
            approved_at: Set(None),
            created_by: Set(actor.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            error!("Failed to insert shipping bill from export order: {}", e);
            ServiceError::DatabaseError(e)
        })?;
        let items =
            line_items::copy(&txn, source.kind(), source.id, target_kind, target_id).await?;

        let (source_entry, target_entry) = conversion_history(
            &source,
            &transition,
            target_kind,
            target_id,
            &target.number,
            actor,
            documents::clean(options.note),
        );
        let mut active: export_order::ActiveModel = source.into();
        active.stamp(&change);
        active.converted_to_id = Set(Some(target_id));
        active.update(&txn).await?;
        history::record(&txn, source_entry).await?;
        history::record(&txn, target_entry).await?;

        Self::commit(txn).await?;

        let outcome = ConversionOutcome {
            source_kind: DocumentKind::ExportOrder,
            source_id: order_id,
            source_status: transition.to,
            target_kind,
            target_id,
            target_number: target.number,
            items,
        };
        self.announce(&outcome).await;
        Ok(outcome)
    }

    /// Raises a purchase order to a supplier for the goods on an export order.
    ///
    /// The export order keeps its status; it may raise several purchase orders.
    #[instrument(skip(self, options), fields(export_order_id = %order_id, supplier_id = %options.supplier_id))]
    pub async fn export_order_to_purchase_order(
        &self,
        order_id: Uuid,
        options: PurchaseOrderOptions,
    ) -> Result<ConversionOutcome, ServiceError> {
        options.validate()?;
        let txn = self.begin().await?;

        let source = export_order::Entity::find_by_id(order_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found(DocumentKind::ExportOrder.label(), order_id))?;
        if !matches!(
            source.status,
            DocumentStatus::Confirmed | DocumentStatus::Shipped
        ) {
            return Err(ServiceError::InvalidStatus(format!(
                "purchase orders can only be raised for confirmed or shipped export orders; {} is {}",
                source.number, source.status
            )));
        }
        documents::ensure_party(&txn, options.supplier_id, PartyRole::Supplier).await?;

        let currency = options
            .currency
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(source.currency.as_str());
        let inherited_rate = currency
            .eq_ignore_ascii_case(&source.currency)
            .then_some(source.exchange_rate);
        let (currency, exchange_rate) = documents::resolve_currency(
            &self.settings,
            Some(currency),
            options.exchange_rate.or(inherited_rate),
        )?;

        let target_kind = DocumentKind::PurchaseOrder;
        let source_lines = line_items::load(&txn, source.kind(), source.id).await?;
        let totals = line_items::totals_for_lines(&source_lines, Charges::default());
        let base_grand_total = pricing::to_base(totals.grand_total, exchange_rate)?;
        let actor = documents::clean(options.actor);
        let date = documents::today();
        let number = numbering::next_number(&txn, target_kind, date).await?;
        let now = Utc::now();
        let target_id = Uuid::new_v4();

        let target = purchase_order::ActiveModel {
            id: Set(target_id),
            number: Set(number),
            status: Set(DocumentStatus::Draft),
            version: Set(1),
            supplier_id: Set(options.supplier_id),
            reference_id: Set(Some(source.id)),
            document_date: Set(date),
            expected_delivery: Set(options.expected_delivery),
            delivery_address: Set(documents::clean(options.delivery_address)),
            currency: Set(currency),
            exchange_rate: Set(exchange_rate),
            incoterms: Set(None),
            payment_terms: Set(None),
            subtotal: Set(totals.subtotal),
            discount_total: Set(totals.discount_total),
            tax_total: Set(totals.tax_total),
            grand_total: Set(totals.grand_total),
            base_grand_total: Set(base_grand_total),
            notes: Set(documents::clean(options.note)),
            terms: Set(None),
            status_reason: Set(None),
            approved_by: Set(None),
            approved_at: Set(None),
            created_by: Set(actor.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            error!("Failed to insert purchase order from export order: {}", e);
            ServiceError::DatabaseError(e)
        })?;
        let items =
            line_items::copy(&txn, source.kind(), source.id, target_kind, target_id).await?;

        let entry = HistoryEntry {
            action: history::CONVERTED_FROM.to_string(),
            ..HistoryEntry::created(target_kind, target_id, actor)
        }
        .with_note(Some(format!("raised for {}", source.number)));
        history::record(&txn, entry).await?;

        Self::commit(txn).await?;

        let outcome = ConversionOutcome {
            source_kind: DocumentKind::ExportOrder,
            source_id: order_id,
            source_status: source.status,
            target_kind,
            target_id,
            target_number: target.number,
            items,
        };
        self.announce(&outcome).await;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn enquiry(status: DocumentStatus) -> enquiry::Model {
        let now = Utc::now();
        enquiry::Model {
            id: Uuid::new_v4(),
            number: "ENQ-2026-0001".into(),
            status,
            version: 2,
            buyer_id: Uuid::new_v4(),
            subject: "Cotton knitwear".into(),
            source: None,
            document_date: now.date_naive(),
            required_by: None,
            currency: "USD".into(),
            exchange_rate: dec!(83),
            subtotal: Decimal::ZERO,
            discount_total: Decimal::ZERO,
            tax_total: Decimal::ZERO,
            grand_total: Decimal::ZERO,
            base_grand_total: Decimal::ZERO,
            notes: None,
            terms: None,
            converted_to_id: None,
            status_reason: None,
            approved_by: None,
            approved_at: None,
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn conversion_keeps_the_source_version() {
        let (transition, change) = plan_convert(&enquiry(DocumentStatus::Pending)).unwrap();
        assert_eq!(transition.to, DocumentStatus::Converted);
        assert_eq!(change.version, 2);
        assert!(change.approved_by.is_none());
    }

    #[test]
    fn drafts_cannot_be_converted() {
        let err = plan_convert(&enquiry(DocumentStatus::Draft)).unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::CONFLICT);
    }

    #[test]
    fn history_links_both_documents() {
        let source = enquiry(DocumentStatus::Pending);
        let (transition, _) = plan_convert(&source).unwrap();
        let target_id = Uuid::new_v4();
        let (from, to) = conversion_history(
            &source,
            &transition,
            DocumentKind::Quote,
            target_id,
            "QT-2026-0001",
            Some("asha".into()),
            None,
        );
        assert_eq!(from.note.as_deref(), Some("converted to QT-2026-0001"));
        assert_eq!(to.document_id, target_id);
        assert_eq!(to.action, history::CONVERTED_FROM);
        assert_eq!(to.note.as_deref(), Some("created from ENQ-2026-0001"));
    }
}
