use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::{proforma_invoice, status_history, WorkflowStamp},
    errors::ServiceError,
    events::{Event, EventSender},
    pricing::{self, Charges},
    services::{
        documents::{
            self, validate_non_negative, ActionRequest, AllowedActions, DocumentDetail,
            DocumentFilter, DocumentSettings, PartyRole,
        },
        history::{self, HistoryEntry},
        line_items::{self, LineItemInput},
        numbering,
    },
    workflow::{DocumentKind, DocumentStatus, PlanContext, WorkflowAction},
};

const KIND: DocumentKind = DocumentKind::ProformaInvoice;

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct ProformaInvoiceInput {
    pub buyer_id: Uuid,
    pub consignee_id: Option<Uuid>,
    pub document_date: Option<NaiveDate>,
    pub valid_until: Option<NaiveDate>,
    #[validate(length(equal = 3))]
    pub currency: Option<String>,
    pub exchange_rate: Option<Decimal>,
    #[validate(length(max = 100))]
    pub port_of_loading: Option<String>,
    #[validate(length(max = 100))]
    pub port_of_discharge: Option<String>,
    #[validate(length(max = 100))]
    pub final_destination: Option<String>,
    #[validate(length(max = 16))]
    pub incoterms: Option<String>,
    #[validate(length(max = 255))]
    pub payment_terms: Option<String>,
    #[serde(default)]
    #[validate(custom = "validate_non_negative")]
    pub freight: Decimal,
    #[serde(default)]
    #[validate(custom = "validate_non_negative")]
    pub insurance: Decimal,
    pub notes: Option<String>,
    pub terms: Option<String>,
    #[validate(length(max = 100))]
    pub created_by: Option<String>,
    pub items: Vec<LineItemInput>,
}

impl ProformaInvoiceInput {
    fn charges(&self) -> Charges {
        Charges {
            freight: self.freight,
            insurance: self.insurance,
        }
    }
}

#[derive(Clone)]
pub struct ProformaInvoiceService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
    settings: DocumentSettings,
}

impl ProformaInvoiceService {
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

    fn check_input(input: &ProformaInvoiceInput) -> Result<(), ServiceError> {
        input.validate()?;
        line_items::validate_lines(&input.items, true)
    }

    async fn find(&self, id: Uuid) -> Result<proforma_invoice::Model, ServiceError> {
        proforma_invoice::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found(KIND.label(), id))
    }

    #[instrument(skip(self, input), fields(buyer_id = %input.buyer_id))]
    pub async fn create(
        &self,
        input: ProformaInvoiceInput,
    ) -> Result<DocumentDetail<proforma_invoice::Model>, ServiceError> {
        Self::check_input(&input)?;
        let (currency, exchange_rate) = documents::resolve_currency(
            &self.settings,
            input.currency.as_deref(),
            input.exchange_rate,
        )?;

        let db = &*self.db;
        let txn = db.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        documents::ensure_party(&txn, input.buyer_id, PartyRole::Buyer).await?;
        if let Some(consignee_id) = input.consignee_id {
            documents::ensure_party(&txn, consignee_id, PartyRole::Consignee).await?;
        }

        let document_date = input.document_date.unwrap_or_else(documents::today);
        let number = numbering::next_number(&txn, KIND, document_date).await?;
        let totals = line_items::totals_for_inputs(&input.items, input.charges());
        let base_grand_total = pricing::to_base(totals.grand_total, exchange_rate)?;
        let created_by = documents::clean(input.created_by);
        let now = Utc::now();
        let id = Uuid::new_v4();

        let invoice = proforma_invoice::ActiveModel {
            id: Set(id),
            number: Set(number),
            status: Set(DocumentStatus::Draft),
            version: Set(1),
            buyer_id: Set(input.buyer_id),
            consignee_id: Set(input.consignee_id),
            reference_id: Set(None),
            document_date: Set(document_date),
            valid_until: Set(input.valid_until),
            currency: Set(currency),
            exchange_rate: Set(exchange_rate),
            port_of_loading: Set(documents::clean(input.port_of_loading)),
            port_of_discharge: Set(documents::clean(input.port_of_discharge)),
            final_destination: Set(documents::clean(input.final_destination)),
            incoterms: Set(documents::clean(input.incoterms)),
            payment_terms: Set(documents::clean(input.payment_terms)),
            freight: Set(totals.freight),
            insurance: Set(totals.insurance),
            subtotal: Set(totals.subtotal),
            discount_total: Set(totals.discount_total),
            tax_total: Set(totals.tax_total),
            grand_total: Set(totals.grand_total),
            base_grand_total: Set(base_grand_total),
            notes: Set(documents::clean(input.notes)),
            terms: Set(documents::clean(input.terms)),
            converted_to_id: Set(None),
            status_reason: Set(None),
            approved_by: Set(None),
            approved_at: Set(None),
            created_by: Set(created_by.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            error!("Failed to insert proforma invoice: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        let items = line_items::replace(&txn, KIND, id, &input.items).await?;
        history::record(&txn, HistoryEntry::created(KIND, id, created_by)).await?;

        txn.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        info!(proforma_invoice_id = %id, number = %invoice.number, "Proforma invoice created");
        self.event_sender
            .publish(Event::DocumentCreated {
                kind: KIND,
                id,
                number: invoice.number.clone(),
            })
            .await;

        Ok(DocumentDetail::new(invoice, items))
    }

    #[instrument(skip(self))]
    pub async fn get(
        &self,
        id: Uuid,
    ) -> Result<DocumentDetail<proforma_invoice::Model>, ServiceError> {
        let invoice = self.find(id).await?;
        let items = line_items::load(&*self.db, KIND, id).await?;
        Ok(DocumentDetail::new(invoice, items))
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: DocumentFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<proforma_invoice::Model>, u64), ServiceError> {
        let mut select =
            proforma_invoice::Entity::find().order_by_desc(proforma_invoice::Column::CreatedAt);
        if let Some(status) = filter.status {
            select = select.filter(proforma_invoice::Column::Status.eq(status));
        }
        if let Some(party_id) = filter.party_id {
            select = select.filter(proforma_invoice::Column::BuyerId.eq(party_id));
        }
        documents::fetch_page(&*self.db, select, page, per_page).await
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: Uuid,
        input: ProformaInvoiceInput,
    ) -> Result<DocumentDetail<proforma_invoice::Model>, ServiceError> {
        Self::check_input(&input)?;

        let db = &*self.db;
        let txn = db.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        let existing = proforma_invoice::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found(KIND.label(), id))?;
        documents::ensure_editable(&existing)?;
        documents::ensure_party(&txn, input.buyer_id, PartyRole::Buyer).await?;
        if let Some(consignee_id) = input.consignee_id {
            documents::ensure_party(&txn, consignee_id, PartyRole::Consignee).await?;
        }

        let (currency, exchange_rate) = documents::resolve_currency(
            &self.settings,
            input.currency.as_deref().or(Some(existing.currency.as_str())),
            input.exchange_rate.or(Some(existing.exchange_rate)),
        )?;
        let totals = line_items::totals_for_inputs(&input.items, input.charges());
        let base_grand_total = pricing::to_base(totals.grand_total, exchange_rate)?;

        let mut active: proforma_invoice::ActiveModel = existing.into();
        active.buyer_id = Set(input.buyer_id);
        active.consignee_id = Set(input.consignee_id);
        if let Some(date) = input.document_date {
            active.document_date = Set(date);
        }
        active.valid_until = Set(input.valid_until);
        active.currency = Set(currency);
        active.exchange_rate = Set(exchange_rate);
        active.port_of_loading = Set(documents::clean(input.port_of_loading));
        active.port_of_discharge = Set(documents::clean(input.port_of_discharge));
        active.final_destination = Set(documents::clean(input.final_destination));
        active.incoterms = Set(documents::clean(input.incoterms));
        active.payment_terms = Set(documents::clean(input.payment_terms));
        active.notes = Set(documents::clean(input.notes));
        active.terms = Set(documents::clean(input.terms));
        active.freight = Set(totals.freight);
        active.insurance = Set(totals.insurance);
        active.subtotal = Set(totals.subtotal);
        active.discount_total = Set(totals.discount_total);
        active.tax_total = Set(totals.tax_total);
        active.grand_total = Set(totals.grand_total);
        active.base_grand_total = Set(base_grand_total);

        let invoice = active.update(&txn).await.map_err(|e| {
            error!(proforma_invoice_id = %id, "Failed to update proforma invoice: {}", e);
            ServiceError::DatabaseError(e)
        })?;
        let items = line_items::replace(&txn, KIND, id, &input.items).await?;

        txn.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        info!(proforma_invoice_id = %id, "Proforma invoice updated");
        Ok(DocumentDetail::new(invoice, items))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db;
        let txn = db.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        let existing = proforma_invoice::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found(KIND.label(), id))?;
        documents::ensure_deletable(&existing)?;

        documents::purge_children(&txn, KIND, id).await?;
        proforma_invoice::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        info!(proforma_invoice_id = %id, "Proforma invoice deleted");
        self.event_sender
            .publish(Event::DocumentDeleted { kind: KIND, id })
            .await;
        Ok(())
    }

    pub async fn allowed_actions(&self, id: Uuid) -> Result<AllowedActions, ServiceError> {
        Ok(AllowedActions::of(&self.find(id).await?))
    }

    #[instrument(skip(self, request), fields(proforma_invoice_id = %id, action = %action))]
    pub async fn apply_action(
        &self,
        id: Uuid,
        action: WorkflowAction,
        request: ActionRequest,
    ) -> Result<DocumentDetail<proforma_invoice::Model>, ServiceError> {
        request.validate()?;

        let db = &*self.db;
        let txn = db.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        let existing = proforma_invoice::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found(KIND.label(), id))?;

        let planned =
            documents::plan_change(&existing, action, PlanContext::default(), &request)?;
        let entry = planned.history_entry(&existing, &request);

        let mut active: proforma_invoice::ActiveModel = existing.into();
        active.stamp(&planned.change);
        let invoice = active.update(&txn).await.map_err(|e| {
            error!("Failed to update proforma invoice status: {}", e);
            ServiceError::DatabaseError(e)
        })?;
        history::record(&txn, entry).await?;
        let items = line_items::load(&txn, KIND, id).await?;

        txn.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        info!(
            from = %planned.transition.from,
            to = %planned.transition.to,
            version = invoice.version,
            "Proforma invoice status changed"
        );
        documents::publish_transition(&self.event_sender, KIND, id, &planned).await;

        Ok(DocumentDetail::new(invoice, items))
    }

    pub async fn history(&self, id: Uuid) -> Result<Vec<status_history::Model>, ServiceError> {
        self.find(id).await?;
        history::list(&*self.db, KIND, id).await
    }
}
