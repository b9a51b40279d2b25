use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::{enquiry, status_history, WorkflowStamp},
    errors::ServiceError,
    events::{Event, EventSender},
    pricing::{self, Charges},
    services::{
        documents::{
            self, ActionRequest, AllowedActions, DocumentDetail, DocumentFilter,
            DocumentSettings, PartyRole,
        },
        history::{self, HistoryEntry},
        line_items::{self, LineItemInput},
        numbering,
    },
    workflow::{DocumentKind, DocumentStatus, PlanContext, WorkflowAction},
};

const KIND: DocumentKind = DocumentKind::Enquiry;

/// Enquiries may arrive without lines or prices; the quote fills them in.
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct EnquiryInput {
    pub buyer_id: Uuid,
    #[validate(length(min = 1, max = 255))]
    pub subject: String,
    #[validate(length(max = 100))]
    pub source: Option<String>,
    pub document_date: Option<NaiveDate>,
    pub required_by: Option<NaiveDate>,
    #[validate(length(equal = 3))]
    pub currency: Option<String>,
    pub exchange_rate: Option<Decimal>,
    pub notes: Option<String>,
    pub terms: Option<String>,
    #[validate(length(max = 100))]
    pub created_by: Option<String>,
    #[serde(default)]
    pub items: Vec<LineItemInput>,
}

#[derive(Clone)]
pub struct EnquiryService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
    settings: DocumentSettings,
}

impl EnquiryService {
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

    fn check_input(input: &EnquiryInput) -> Result<(), ServiceError> {
        input.validate()?;
        if input.subject.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "subject cannot be blank".to_string(),
            ));
        }
        line_items::validate_lines(&input.items, false)
    }

    /// Unpriced enquiries need no exchange rate.
    fn resolve_currency(
        &self,
        currency: Option<&str>,
        exchange_rate: Option<Decimal>,
    ) -> Result<(String, Decimal), ServiceError> {
        documents::resolve_currency(
            &self.settings,
            currency,
            exchange_rate.or(Some(Decimal::ONE)),
        )
    }

    async fn find(&self, id: Uuid) -> Result<enquiry::Model, ServiceError> {
        enquiry::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found(KIND.label(), id))
    }

    #[instrument(skip(self, input), fields(buyer_id = %input.buyer_id))]
    pub async fn create(
        &self,
        input: EnquiryInput,
    ) -> Result<DocumentDetail<enquiry::Model>, ServiceError> {
        Self::check_input(&input)?;
        let (currency, exchange_rate) =
            self.resolve_currency(input.currency.as_deref(), input.exchange_rate)?;

        let db = &*self.db;
        let txn = db.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        documents::ensure_party(&txn, input.buyer_id, PartyRole::Buyer).await?;

        let document_date = input.document_date.unwrap_or_else(documents::today);
        let number = numbering::next_number(&txn, KIND, document_date).await?;
        let totals = line_items::totals_for_inputs(&input.items, Charges::default());
        let base_grand_total = pricing::to_base(totals.grand_total, exchange_rate)?;
        let created_by = documents::clean(input.created_by);
        let now = Utc::now();
        let id = Uuid::new_v4();

        let enquiry = enquiry::ActiveModel {
            id: Set(id),
            number: Set(number),
            status: Set(DocumentStatus::Draft),
            version: Set(1),
            buyer_id: Set(input.buyer_id),
            subject: Set(input.subject.trim().to_string()),
            source: Set(documents::clean(input.source)),
            document_date: Set(document_date),
            required_by: Set(input.required_by),
            currency: Set(currency),
            exchange_rate: Set(exchange_rate),
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
            error!("Failed to insert enquiry: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        let items = line_items::replace(&txn, KIND, id, &input.items).await?;
        history::record(&txn, HistoryEntry::created(KIND, id, created_by)).await?;

        txn.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        info!(enquiry_id = %id, number = %enquiry.number, "Enquiry created");
        self.event_sender
            .publish(Event::DocumentCreated {
                kind: KIND,
                id,
                number: enquiry.number.clone(),
            })
            .await;

        Ok(DocumentDetail::new(enquiry, items))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<DocumentDetail<enquiry::Model>, ServiceError> {
        let enquiry = self.find(id).await?;
        let items = line_items::load(&*self.db, KIND, id).await?;
        Ok(DocumentDetail::new(enquiry, items))
    }

    /// Newest first. `search` matches the subject or number.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: DocumentFilter,
        search: Option<String>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<enquiry::Model>, u64), ServiceError> {
        let mut select = enquiry::Entity::find().order_by_desc(enquiry::Column::CreatedAt);
        if let Some(status) = filter.status {
            select = select.filter(enquiry::Column::Status.eq(status));
        }
        if let Some(party_id) = filter.party_id {
            select = select.filter(enquiry::Column::BuyerId.eq(party_id));
        }
        if let Some(term) = documents::clean(search) {
            select = select.filter(
                Condition::any()
                    .add(enquiry::Column::Subject.contains(&term))
                    .add(enquiry::Column::Number.contains(&term)),
            );
        }
        documents::fetch_page(&*self.db, select, page, per_page).await
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: Uuid,
        input: EnquiryInput,
    ) -> Result<DocumentDetail<enquiry::Model>, ServiceError> {
        Self::check_input(&input)?;

        let db = &*self.db;
        let txn = db.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        let existing = enquiry::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found(KIND.label(), id))?;
        documents::ensure_editable(&existing)?;
        documents::ensure_party(&txn, input.buyer_id, PartyRole::Buyer).await?;

        let (currency, exchange_rate) = self.resolve_currency(
            input.currency.as_deref().or(Some(existing.currency.as_str())),
            input.exchange_rate.or(Some(existing.exchange_rate)),
        )?;
        let totals = line_items::totals_for_inputs(&input.items, Charges::default());
        let base_grand_total = pricing::to_base(totals.grand_total, exchange_rate)?;

        let mut active: enquiry::ActiveModel = existing.into();
        active.buyer_id = Set(input.buyer_id);
        active.subject = Set(input.subject.trim().to_string());
        active.source = Set(documents::clean(input.source));
        if let Some(date) = input.document_date {
            active.document_date = Set(date);
        }
        active.required_by = Set(input.required_by);
        active.currency = Set(currency);
        active.exchange_rate = Set(exchange_rate);
        active.notes = Set(documents::clean(input.notes));
        active.terms = Set(documents::clean(input.terms));
        active.subtotal = Set(totals.subtotal);
        active.discount_total = Set(totals.discount_total);
        active.tax_total = Set(totals.tax_total);
        active.grand_total = Set(totals.grand_total);
        active.base_grand_total = Set(base_grand_total);

        let enquiry = active.update(&txn).await.map_err(|e| {
            error!(enquiry_id = %id, "Failed to update enquiry: {}", e);
            ServiceError::DatabaseError(e)
        })?;
        let items = line_items::replace(&txn, KIND, id, &input.items).await?;

        txn.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        info!(enquiry_id = %id, "Enquiry updated");
        Ok(DocumentDetail::new(enquiry, items))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db;
        let txn = db.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        let existing = enquiry::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found(KIND.label(), id))?;
        documents::ensure_deletable(&existing)?;

        documents::purge_children(&txn, KIND, id).await?;
        enquiry::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        info!(enquiry_id = %id, "Enquiry deleted");
        self.event_sender
            .publish(Event::DocumentDeleted { kind: KIND, id })
            .await;
        Ok(())
    }

    pub async fn allowed_actions(&self, id: Uuid) -> Result<AllowedActions, ServiceError> {
        Ok(AllowedActions::of(&self.find(id).await?))
    }

    #[instrument(skip(self, request), fields(enquiry_id = %id, action = %action))]
    pub async fn apply_action(
        &self,
        id: Uuid,
        action: WorkflowAction,
        request: ActionRequest,
    ) -> Result<DocumentDetail<enquiry::Model>, ServiceError> {
        request.validate()?;

        let db = &*self.db;
        let txn = db.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        let existing = enquiry::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found(KIND.label(), id))?;

        let planned =
            documents::plan_change(&existing, action, PlanContext::default(), &request)?;
        let entry = planned.history_entry(&existing, &request);

        let mut active: enquiry::ActiveModel = existing.into();
        active.stamp(&planned.change);
        let enquiry = active.update(&txn).await.map_err(|e| {
            error!("Failed to update enquiry status: {}", e);
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
            "Enquiry status changed"
        );
        documents::publish_transition(&self.event_sender, KIND, id, &planned).await;

        Ok(DocumentDetail::new(enquiry, items))
    }

    pub async fn history(&self, id: Uuid) -> Result<Vec<status_history::Model>, ServiceError> {
        self.find(id).await?;
        history::list(&*self.db, KIND, id).await
    }
}
