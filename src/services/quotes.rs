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
    entities::{max_discount_percent, quote, status_history, DocumentHeader, WorkflowStamp},
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

const KIND: DocumentKind = DocumentKind::Quote;

/// Create and update payload for quotes. Updates replace every line.
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct QuoteInput {
    pub buyer_id: Uuid,
    pub document_date: Option<NaiveDate>,
    pub valid_until: Option<NaiveDate>,
    #[validate(length(equal = 3))]
    pub currency: Option<String>,
    pub exchange_rate: Option<Decimal>,
    #[validate(length(max = 16))]
    pub incoterms: Option<String>,
    #[validate(length(max = 255))]
    pub payment_terms: Option<String>,
    #[validate(length(max = 255))]
    pub delivery_terms: Option<String>,
    pub notes: Option<String>,
    pub terms: Option<String>,
    #[validate(length(max = 100))]
    pub created_by: Option<String>,
    pub items: Vec<LineItemInput>,
}

#[derive(Clone)]
pub struct QuoteService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
    settings: DocumentSettings,
}

impl QuoteService {
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

    fn check_input(input: &QuoteInput) -> Result<(), ServiceError> {
        input.validate()?;
        line_items::validate_lines(&input.items, true)?;
        if let (Some(valid_until), Some(date)) = (input.valid_until, input.document_date) {
            if valid_until < date {
                return Err(ServiceError::ValidationError(
                    "valid_until cannot be before the quote date".to_string(),
                ));
            }
        }
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<quote::Model, ServiceError> {
        quote::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found(KIND.label(), id))
    }

    /// Creates a draft quote with its lines.
    #[instrument(skip(self, input), fields(buyer_id = %input.buyer_id))]
    pub async fn create(&self, input: QuoteInput) -> Result<DocumentDetail<quote::Model>, ServiceError> {
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

        let document_date = input.document_date.unwrap_or_else(documents::today);
        let number = numbering::next_number(&txn, KIND, document_date).await?;
        let totals = line_items::totals_for_inputs(&input.items, Charges::default());
        let base_grand_total = pricing::to_base(totals.grand_total, exchange_rate)?;
        let created_by = documents::clean(input.created_by);
        let now = Utc::now();
        let id = Uuid::new_v4();

        let quote = quote::ActiveModel {
            id: Set(id),
            number: Set(number),
            status: Set(DocumentStatus::Draft),
            version: Set(1),
            buyer_id: Set(input.buyer_id),
            reference_id: Set(None),
            document_date: Set(document_date),
            valid_until: Set(input.valid_until),
            currency: Set(currency),
            exchange_rate: Set(exchange_rate),
            incoterms: Set(documents::clean(input.incoterms)),
            payment_terms: Set(documents::clean(input.payment_terms)),
            delivery_terms: Set(documents::clean(input.delivery_terms)),
            approval_required: Set(false),
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
            error!("Failed to insert quote: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        let items = line_items::replace(&txn, KIND, id, &input.items).await?;
        history::record(&txn, HistoryEntry::created(KIND, id, created_by)).await?;

        txn.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        info!(quote_id = %id, number = %quote.number, "Quote created");
        self.event_sender
            .publish(Event::DocumentCreated {
                kind: KIND,
                id,
                number: quote.number.clone(),
            })
            .await;

        Ok(DocumentDetail::new(quote, items))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<DocumentDetail<quote::Model>, ServiceError> {
        let quote = self.find(id).await?;
        let items = line_items::load(&*self.db, KIND, id).await?;
        Ok(DocumentDetail::new(quote, items))
    }

    /// Newest first.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: DocumentFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<quote::Model>, u64), ServiceError> {
        let mut select = quote::Entity::find().order_by_desc(quote::Column::CreatedAt);
        if let Some(status) = filter.status {
            select = select.filter(quote::Column::Status.eq(status));
        }
        if let Some(party_id) = filter.party_id {
            select = select.filter(quote::Column::BuyerId.eq(party_id));
        }
        documents::fetch_page(&*self.db, select, page, per_page).await
    }

    /// Replaces header fields and lines of a draft or revised quote.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: Uuid,
        input: QuoteInput,
    ) -> Result<DocumentDetail<quote::Model>, ServiceError> {
        Self::check_input(&input)?;

        let db = &*self.db;
        let txn = db.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        let existing = quote::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found(KIND.label(), id))?;
        documents::ensure_editable(&existing)?;
        documents::ensure_party(&txn, input.buyer_id, PartyRole::Buyer).await?;

        let (currency, exchange_rate) = documents::resolve_currency(
            &self.settings,
            input.currency.as_deref().or(Some(existing.currency.as_str())),
            input.exchange_rate.or(Some(existing.exchange_rate)),
        )?;
        let totals = line_items::totals_for_inputs(&input.items, Charges::default());
        let base_grand_total = pricing::to_base(totals.grand_total, exchange_rate)?;

        let mut active: quote::ActiveModel = existing.into();
        active.buyer_id = Set(input.buyer_id);
        if let Some(date) = input.document_date {
            active.document_date = Set(date);
        }
        active.valid_until = Set(input.valid_until);
        active.currency = Set(currency);
        active.exchange_rate = Set(exchange_rate);
        active.incoterms = Set(documents::clean(input.incoterms));
        active.payment_terms = Set(documents::clean(input.payment_terms));
        active.delivery_terms = Set(documents::clean(input.delivery_terms));
        active.notes = Set(documents::clean(input.notes));
        active.terms = Set(documents::clean(input.terms));
        active.subtotal = Set(totals.subtotal);
        active.discount_total = Set(totals.discount_total);
        active.tax_total = Set(totals.tax_total);
        active.grand_total = Set(totals.grand_total);
        active.base_grand_total = Set(base_grand_total);

        let quote = active.update(&txn).await.map_err(|e| {
            error!(quote_id = %id, "Failed to update quote: {}", e);
            ServiceError::DatabaseError(e)
        })?;
        let items = line_items::replace(&txn, KIND, id, &input.items).await?;

        txn.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        info!(quote_id = %id, "Quote updated");
        Ok(DocumentDetail::new(quote, items))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db;
        let txn = db.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        let existing = quote::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found(KIND.label(), id))?;
        documents::ensure_deletable(&existing)?;

        documents::purge_children(&txn, KIND, id).await?;
        quote::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        info!(quote_id = %id, "Quote deleted");
        self.event_sender
            .publish(Event::DocumentDeleted { kind: KIND, id })
            .await;
        Ok(())
    }

    pub async fn allowed_actions(&self, id: Uuid) -> Result<AllowedActions, ServiceError> {
        Ok(AllowedActions::of(&self.find(id).await?))
    }

    /// Applies a workflow action. Submitting evaluates the approval policy
    /// and records the outcome on the quote.
    #[instrument(skip(self, request), fields(quote_id = %id, action = %action))]
    pub async fn apply_action(
        &self,
        id: Uuid,
        action: WorkflowAction,
        request: ActionRequest,
    ) -> Result<DocumentDetail<quote::Model>, ServiceError> {
        request.validate()?;

        let db = &*self.db;
        let txn = db.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        let existing = quote::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found(KIND.label(), id))?;
        let items = line_items::load(&txn, KIND, id).await?;

        let approval_required = if action == WorkflowAction::Submit {
            self.settings
                .approval
                .requires_approval(existing.base_grand_total, max_discount_percent(&items))
        } else {
            existing.approval_required
        };

        let planned = documents::plan_change(
            &existing,
            action,
            PlanContext::requiring_approval(approval_required),
            &request,
        )?;
        let entry = planned.history_entry(&existing, &request);

        let mut active: quote::ActiveModel = existing.into();
        active.stamp(&planned.change);
        active.approval_required = Set(approval_required);
        let quote = active.update(&txn).await.map_err(|e| {
            error!("Failed to update quote status: {}", e);
            ServiceError::DatabaseError(e)
        })?;
        history::record(&txn, entry).await?;

        txn.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        info!(
            from = %planned.transition.from,
            to = %planned.transition.to,
            version = quote.version,
            approval_required,
            "Quote status changed"
        );
        documents::publish_transition(&self.event_sender, KIND, id, &planned).await;

        Ok(DocumentDetail::new(quote, items))
    }

    pub async fn history(&self, id: Uuid) -> Result<Vec<status_history::Model>, ServiceError> {
        let quote = self.find(id).await?;
        history::list(&*self.db, KIND, quote.id()).await
    }
}
