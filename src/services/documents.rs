//! Plumbing shared by the per-document services: request shapes, guards,
//! workflow bookkeeping and paging.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Select,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::AppConfig,
    entities::{
        attachment,
        business_entity::{self, EntityType},
        enquiry, export_order, line_item, payment, proforma_invoice, purchase_order, quote,
        shipping_bill, DocumentHeader, StatusChange,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    pricing::{self, CurrencyCatalogue},
    services::{history, line_items},
    workflow::{
        self, allowed_actions, ApprovalPolicy, DocumentKind, DocumentStatus, PlanContext,
        Transition, WorkflowAction,
    },
};

/// Defaults the document services apply to incoming requests.
#[derive(Debug, Clone)]
pub struct DocumentSettings {
    pub default_currency: String,
    pub base_currency: String,
    pub approval: ApprovalPolicy,
}

impl DocumentSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            default_currency: config.default_currency.clone(),
            base_currency: config.base_currency.clone(),
            approval: config.approval_policy(),
        }
    }
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            default_currency: "USD".to_string(),
            base_currency: "INR".to_string(),
            approval: ApprovalPolicy::default(),
        }
    }
}

/// Body of `POST /:id/actions/:action`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct ActionRequest {
    #[validate(length(max = 100))]
    pub actor: Option<String>,
    #[validate(length(max = 2000))]
    pub note: Option<String>,
    /// Stored on the document for reject, cancel and revise
    #[validate(length(max = 2000))]
    pub reason: Option<String>,
}

impl ActionRequest {
    pub fn by(actor: impl Into<String>) -> Self {
        Self {
            actor: Some(actor.into()),
            ..Default::default()
        }
    }
}

/// Optional list filters shared by every document list endpoint.
#[derive(Debug, Clone, Default, Deserialize, Serialize, IntoParams)]
pub struct DocumentFilter {
    pub status: Option<DocumentStatus>,
    /// Buyer, or supplier for purchase orders
    pub party_id: Option<Uuid>,
}

/// A document with its lines and the actions currently open to it.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DocumentDetail<T> {
    pub document: T,
    pub items: Vec<line_item::Model>,
    pub allowed_actions: Vec<WorkflowAction>,
}

impl<T: DocumentHeader> DocumentDetail<T> {
    pub fn new(document: T, items: Vec<line_item::Model>) -> Self {
        let allowed_actions = allowed_actions(document.kind(), document.status());
        Self {
            document,
            items,
            allowed_actions,
        }
    }
}

/// Allowed actions as returned by `GET /:id/actions`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AllowedActions {
    pub kind: DocumentKind,
    pub status: DocumentStatus,
    pub actions: Vec<WorkflowAction>,
}

impl AllowedActions {
    pub fn of<D: DocumentHeader>(doc: &D) -> Self {
        Self {
            kind: doc.kind(),
            status: doc.status(),
            actions: allowed_actions(doc.kind(), doc.status()),
        }
    }
}

/// Any of the six document kinds, loaded by kind and id.
#[derive(Debug, Clone)]
pub enum AnyDocument {
    Enquiry(enquiry::Model),
    Quote(quote::Model),
    ProformaInvoice(proforma_invoice::Model),
    ExportOrder(export_order::Model),
    PurchaseOrder(purchase_order::Model),
    ShippingBill(shipping_bill::Model),
}

impl AnyDocument {
    pub fn header(&self) -> &dyn DocumentHeader {
        match self {
            AnyDocument::Enquiry(m) => m,
            AnyDocument::Quote(m) => m,
            AnyDocument::ProformaInvoice(m) => m,
            AnyDocument::ExportOrder(m) => m,
            AnyDocument::PurchaseOrder(m) => m,
            AnyDocument::ShippingBill(m) => m,
        }
    }
}

pub async fn find_any<C: ConnectionTrait>(
    conn: &C,
    kind: DocumentKind,
    id: Uuid,
) -> Result<AnyDocument, ServiceError> {
    let found = match kind {
        DocumentKind::Enquiry => enquiry::Entity::find_by_id(id)
            .one(conn)
            .await?
            .map(AnyDocument::Enquiry),
        DocumentKind::Quote => quote::Entity::find_by_id(id)
            .one(conn)
            .await?
            .map(AnyDocument::Quote),
        DocumentKind::ProformaInvoice => proforma_invoice::Entity::find_by_id(id)
            .one(conn)
            .await?
            .map(AnyDocument::ProformaInvoice),
        DocumentKind::ExportOrder => export_order::Entity::find_by_id(id)
            .one(conn)
            .await?
            .map(AnyDocument::ExportOrder),
        DocumentKind::PurchaseOrder => purchase_order::Entity::find_by_id(id)
            .one(conn)
            .await?
            .map(AnyDocument::PurchaseOrder),
        DocumentKind::ShippingBill => shipping_bill::Entity::find_by_id(id)
            .one(conn)
            .await?
            .map(AnyDocument::ShippingBill),
    };
    found.ok_or_else(|| ServiceError::not_found(kind.label(), id))
}

/// Header fields and lines may only change while a document is a draft or under revision.
pub fn ensure_editable<D: DocumentHeader + ?Sized>(doc: &D) -> Result<(), ServiceError> {
    if doc.status().is_editable() {
        return Ok(());
    }
    Err(ServiceError::Locked(format!(
        "{} {} is {} and can no longer be edited",
        doc.kind().label(),
        doc.number(),
        doc.status()
    )))
}

pub fn ensure_deletable<D: DocumentHeader + ?Sized>(doc: &D) -> Result<(), ServiceError> {
    if doc.status().is_deletable() {
        return Ok(());
    }
    Err(ServiceError::Locked(format!(
        "{} {} is {}; only draft or cancelled documents can be deleted",
        doc.kind().label(),
        doc.number(),
        doc.status()
    )))
}

/// Which counterparty roles may fill a party slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartyRole {
    Buyer,
    Supplier,
    Consignee,
}

impl PartyRole {
    fn label(self) -> &'static str {
        match self {
            PartyRole::Buyer => "buyer",
            PartyRole::Supplier => "supplier",
            PartyRole::Consignee => "consignee",
        }
    }

    fn accepts(self, entity_type: EntityType) -> bool {
        match self {
            PartyRole::Buyer => matches!(entity_type, EntityType::Buyer | EntityType::Partner),
            PartyRole::Supplier => {
                matches!(entity_type, EntityType::Supplier | EntityType::Partner)
            }
            PartyRole::Consignee => !matches!(entity_type, EntityType::Supplier),
        }
    }
}

/// Loads the business entity a document points at, checking it may play `role`.
pub async fn ensure_party<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
    role: PartyRole,
) -> Result<business_entity::Model, ServiceError> {
    let entity = business_entity::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| {
            ServiceError::ValidationError(format!("{} {} does not exist", role.label(), id))
        })?;

    if !entity.is_active {
        return Err(ServiceError::ValidationError(format!(
            "{} {} is inactive",
            role.label(),
            entity.name
        )));
    }
    if !role.accepts(entity.entity_type) {
        return Err(ServiceError::ValidationError(format!(
            "{} is a {} and cannot be used as {}",
            entity.name,
            entity.entity_type,
            role.label()
        )));
    }
    Ok(entity)
}

/// Resolves the currency and exchange rate for a new or updated document.
pub fn resolve_currency(
    settings: &DocumentSettings,
    currency: Option<&str>,
    exchange_rate: Option<Decimal>,
) -> Result<(String, Decimal), ServiceError> {
    let code = currency
        .map(|c| c.trim().to_ascii_uppercase())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| settings.default_currency.clone());
    if !CurrencyCatalogue::is_valid_code(&code) {
        return Err(ServiceError::ValidationError(format!(
            "'{}' is not a valid currency code",
            code
        )));
    }

    let rate = match exchange_rate {
        Some(rate) => rate,
        None if code == settings.base_currency => Decimal::ONE,
        None => {
            return Err(ServiceError::ValidationError(format!(
                "an exchange rate to {} is required for {} documents",
                settings.base_currency, code
            )))
        }
    };
    pricing::validate_exchange_rate(rate)?;
    Ok((code, rate))
}

/// `validator` hook for freight, insurance and payment amounts.
pub fn validate_non_negative(value: &Decimal) -> Result<(), validator::ValidationError> {
    pricing::validate_amount(*value).map_err(|msg| {
        let mut err = validator::ValidationError::new("amount_range");
        err.message = Some(msg.into());
        err
    })
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Normalises optional free text: trimmed, blank becomes `None`.
pub fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// A planned transition plus the fields it writes.
#[derive(Debug, Clone)]
pub struct PlannedChange {
    pub transition: Transition,
    pub change: StatusChange,
}

impl PlannedChange {
    pub fn history_entry<D: DocumentHeader + ?Sized>(
        &self,
        doc: &D,
        request: &ActionRequest,
    ) -> history::HistoryEntry {
        history::HistoryEntry {
            kind: doc.kind(),
            document_id: doc.id(),
            from: Some(self.transition.from),
            to: self.transition.to,
            action: self.transition.action.to_string(),
            actor: clean(request.actor.clone()),
            note: clean(request.note.clone()).or_else(|| self.change.reason.clone()),
            version: self.change.version,
        }
    }
}

/// Plans `action` on `doc` and works out the workflow fields to write.
///
/// Conversions create a second document and go through the conversion
/// service instead.
pub fn plan_change<D: DocumentHeader + ?Sized>(
    doc: &D,
    action: WorkflowAction,
    ctx: PlanContext,
    request: &ActionRequest,
) -> Result<PlannedChange, ServiceError> {
    if action == WorkflowAction::Convert {
        return Err(ServiceError::InvalidInput(format!(
            "{} documents are converted through their convert endpoint",
            doc.kind()
        )));
    }

    let transition = workflow::plan(doc.kind(), doc.status(), action, ctx)?;
    let version = if transition.bumps_version {
        doc.version() + 1
    } else {
        doc.version()
    };
    let approved_by = (transition.to == DocumentStatus::Approved).then(|| {
        clean(request.actor.clone()).unwrap_or_else(|| "system".to_string())
    });
    let reason = match action {
        WorkflowAction::Reject | WorkflowAction::Cancel | WorkflowAction::Revise => {
            clean(request.reason.clone())
        }
        _ => None,
    };

    Ok(PlannedChange {
        transition,
        change: StatusChange {
            to: transition.to,
            version,
            reason,
            approved_by,
            at: Utc::now(),
        },
    })
}

/// Emits the events for an applied transition.
pub async fn publish_transition(
    events: &EventSender,
    kind: DocumentKind,
    id: Uuid,
    planned: &PlannedChange,
) {
    events
        .publish(Event::DocumentStatusChanged {
            kind,
            id,
            from: planned.transition.from,
            to: planned.transition.to,
            action: planned.transition.action.to_string(),
        })
        .await;
    if planned.transition.bumps_version {
        events
            .publish(Event::DocumentRevised {
                kind,
                id,
                version: planned.change.version,
            })
            .await;
    }
}

/// Fetches one 1-based page of `select` and the total row count.
pub async fn fetch_page<C, E>(
    conn: &C,
    select: Select<E>,
    page: u64,
    per_page: u64,
) -> Result<(Vec<E::Model>, u64), ServiceError>
where
    C: ConnectionTrait,
    E: EntityTrait,
    E::Model: Send + Sync,
{
    let per_page = per_page.max(1);
    let paginator = select.paginate(conn, per_page);
    let total = paginator.num_items().await.map_err(|e| {
        error!("Failed to count rows: {}", e);
        ServiceError::DatabaseError(e)
    })?;
    let items = paginator
        .fetch_page(page.max(1) - 1)
        .await
        .map_err(|e| {
            error!("Failed to fetch page {}: {}", page, e);
            ServiceError::DatabaseError(e)
        })?;
    Ok((items, total))
}

/// Removes the rows hanging off a document before it is deleted.
pub async fn purge_children<C: ConnectionTrait>(
    conn: &C,
    kind: DocumentKind,
    id: Uuid,
) -> Result<(), ServiceError> {
    line_items::delete_all(conn, kind, id).await?;
    history::delete_all(conn, kind, id).await?;

    let payments = payment::Entity::delete_many()
        .filter(payment::Column::DocumentKind.eq(kind))
        .filter(payment::Column::DocumentId.eq(id))
        .exec(conn)
        .await?;
    if payments.rows_affected > 0 {
        warn!(%kind, %id, removed = payments.rows_affected, "deleting document with recorded payments");
    }

    attachment::Entity::delete_many()
        .filter(attachment::Column::DocumentKind.eq(kind))
        .filter(attachment::Column::DocumentId.eq(id))
        .exec(conn)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn settings() -> DocumentSettings {
        DocumentSettings::default()
    }

    #[test]
    fn base_currency_documents_default_to_unit_rate() {
        let (code, rate) = resolve_currency(&settings(), Some("inr"), None).unwrap();
        assert_eq!(code, "INR");
        assert_eq!(rate, Decimal::ONE);
    }

    #[test]
    fn foreign_documents_need_a_positive_rate() {
        assert!(resolve_currency(&settings(), None, None).is_err());
        assert!(resolve_currency(&settings(), Some("USD"), Some(dec!(0))).is_err());
        let (code, rate) = resolve_currency(&settings(), None, Some(dec!(83.25))).unwrap();
        assert_eq!(code, "USD");
        assert_eq!(rate, dec!(83.25));
    }

    #[test]
    fn malformed_currency_codes_are_rejected() {
        assert!(resolve_currency(&settings(), Some("dollars"), Some(dec!(1))).is_err());
    }

    #[test]
    fn blank_text_is_dropped() {
        assert_eq!(clean(Some("  ".into())), None);
        assert_eq!(clean(Some(" FOB ".into())), Some("FOB".to_string()));
    }

    #[test]
    fn consignee_slot_rejects_suppliers() {
        assert!(PartyRole::Consignee.accepts(EntityType::Buyer));
        assert!(!PartyRole::Consignee.accepts(EntityType::Supplier));
        assert!(PartyRole::Supplier.accepts(EntityType::Partner));
        assert!(!PartyRole::Buyer.accepts(EntityType::Supplier));
    }
}
