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
    entities::{export_order, purchase_order, status_history, WorkflowStamp},
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

const KIND: DocumentKind = DocumentKind::PurchaseOrder;

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct PurchaseOrderInput {
    pub supplier_id: Uuid,
    /// Export order this purchase is made for
    pub export_order_id: Option<Uuid>,
    pub document_date: Option<NaiveDate>,
    pub expected_delivery: Option<NaiveDate>,
    #[validate(length(max = 500))]
    pub delivery_address: Option<String>,
    #[validate(length(equal = 3))]
    pub currency: Option<String>,
    pub exchange_rate: Option<Decimal>,
    #[validate(length(max = 16))]
    pub incoterms: Option<String>,
    #[validate(length(max = 255))]
    pub payment_terms: Option<String>,
    pub notes: Option<String>,
    pub terms: Option<String>,
    #[validate(length(max = 100))]
    pub created_by: Option<String>,
    pub items: Vec<LineItemInput>,
}

#[derive(Clone)]
pub struct PurchaseOrderService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
    settings: DocumentSettings,
}

impl PurchaseOrderService {
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

    fn check_input(input: &PurchaseOrderInput) -> Result<(), ServiceError> {
        input.validate()?;
        line_items::validate_lines(&input.items, true)
    }

    async fn find(&self, id: Uuid) -> Result<purchase_order::Model, ServiceError> {
        purchase_order::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found(KIND.label(), id))
    }

    #[instrument(skip(self, input), fields(supplier_id = %input.supplier_id))]
    pub async fn create(
        &self,
        input: PurchaseOrderInput,
    ) -> Result<DocumentDetail<purchase_order::Model>, ServiceError> {
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

        documents::ensure_party(&txn, input.supplier_id, PartyRole::Supplier).await?;
        if let Some(order_id) = input.export_order_id {
            export_order::Entity::find_by_id(order_id)
                .one(&txn)
                .await?
                .ok_or_else(|| {
                    ServiceError::ValidationError(format!(
                        "export order {} does not exist",
                        order_id
                    ))
                })?;
        }

        let document_date = input.document_date.unwrap_or_else(documents::today);
        let number = numbering::next_number(&txn, KIND, document_date).await?;
        let totals = line_items::totals_for_inputs(&input.items, Charges::default());
        let base_grand_total = pricing::to_base(totals.grand_total, exchange_rate)?;
        let created_by = documents::clean(input.created_by);
        let now = Utc::now();
        let id = Uuid::new_v4();

        let order = purchase_order::ActiveModel {
            id: Set(id),
            number: Set(number),
            status: Set(DocumentStatus::Draft),
            version: Set(1),
            supplier_id: Set(input.supplier_id),
            reference_id: Set(input.export_order_id),
            document_date: Set(document_date),
            expected_delivery: Set(input.expected_delivery),
            delivery_address: Set(documents::clean(input.delivery_address)),
            currency: Set(currency),
            exchange_rate: Set(exchange_rate),
            incoterms: Set(documents::clean(input.incoterms)),
            payment_terms: Set(documents::clean(input.payment_terms)),
            subtotal: Set(totals.subtotal),
            discount_total: Set(totals.discount_total),
            tax_total: Set(totals.tax_total),
            grand_total: Set(totals.grand_total),
            base_grand_total: Set(base_grand_total),
            notes: Set(documents::clean(input.notes)),
            terms: Set(documents::clean(input.terms)),
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
            error!("Failed to insert purchase order: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        let items = line_items::replace(&txn, KIND, id, &input.items).await?;
        history::record(&txn, HistoryEntry::created(KIND, id, created_by)).await?;

        txn.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        info!(purchase_order_id = %id, number = %order.number, "Purchase order created");
        self.event_sender
            .publish(Event::DocumentCreated {
                kind: KIND,
                id,
                number: order.number.clone(),
            })
            .await;

        Ok(DocumentDetail::new(order, items))
    }

    #[instrument(skip(self))]
    pub async fn get(
        &self,
        id: Uuid,
    ) -> Result<DocumentDetail<purchase_order::Model>, ServiceError> {
        let order = self.find(id).await?;
        let items = line_items::load(&*self.db, KIND, id).await?;
        Ok(DocumentDetail::new(order, items))
    }

    /// Newest first; `party_id` filters on the supplier.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: DocumentFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<purchase_order::Model>, u64), ServiceError> {
        let mut select =
            purchase_order::Entity::find().order_by_desc(purchase_order::Column::CreatedAt);
        if let Some(status) = filter.status {
            select = select.filter(purchase_order::Column::Status.eq(status));
        }
        if let Some(party_id) = filter.party_id {
            select = select.filter(purchase_order::Column::SupplierId.eq(party_id));
        }
        documents::fetch_page(&*self.db, select, page, per_page).await
    }

    /// Purchase orders raised for one export order.
    pub async fn list_for_export_order(
        &self,
        export_order_id: Uuid,
    ) -> Result<Vec<purchase_order::Model>, ServiceError> {
        let orders = purchase_order::Entity::find()
            .filter(purchase_order::Column::ReferenceId.eq(export_order_id))
            .order_by_asc(purchase_order::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(orders)
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: Uuid,
        input: PurchaseOrderInput,
    ) -> Result<DocumentDetail<purchase_order::Model>, ServiceError> {
        Self::check_input(&input)?;

        let db = &*self.db;
        let txn = db.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        let existing = purchase_order::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found(KIND.label(), id))?;
        documents::ensure_editable(&existing)?;
        documents::ensure_party(&txn, input.supplier_id, PartyRole::Supplier).await?;

        let (currency, exchange_rate) = documents::resolve_currency(
            &self.settings,
            input.currency.as_deref().or(Some(existing.currency.as_str())),
            input.exchange_rate.or(Some(existing.exchange_rate)),
        )?;
        let totals = line_items::totals_for_inputs(&input.items, Charges::default());
        let base_grand_total = pricing::to_base(totals.grand_total, exchange_rate)?;

        let mut active: purchase_order::ActiveModel = existing.into();
        active.supplier_id = Set(input.supplier_id);
        if let Some(date) = input.document_date {
            active.document_date = Set(date);
        }
        active.expected_delivery = Set(input.expected_delivery);
        active.delivery_address = Set(documents::clean(input.delivery_address));
        active.currency = Set(currency);
        active.exchange_rate = Set(exchange_rate);
        active.incoterms = Set(documents::clean(input.incoterms));
        active.payment_terms = Set(documents::clean(input.payment_terms));
        active.notes = Set(documents::clean(input.notes));
        active.terms = Set(documents::clean(input.terms));
        active.subtotal = Set(totals.subtotal);
        active.discount_total = Set(totals.discount_total);
        active.tax_total = Set(totals.tax_total);
        active.grand_total = Set(totals.grand_total);
        active.base_grand_total = Set(base_grand_total);

        let order = active.update(&txn).await.map_err(|e| {
            error!(purchase_order_id = %id, "Failed to update purchase order: {}", e);
            ServiceError::DatabaseError(e)
        })?;
        let items = line_items::replace(&txn, KIND, id, &input.items).await?;

        txn.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        info!(purchase_order_id = %id, "Purchase order updated");
        Ok(DocumentDetail::new(order, items))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db;
        let txn = db.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        let existing = purchase_order::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found(KIND.label(), id))?;
        documents::ensure_deletable(&existing)?;

        documents::purge_children(&txn, KIND, id).await?;
        purchase_order::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        info!(purchase_order_id = %id, "Purchase order deleted");
        self.event_sender
            .publish(Event::DocumentDeleted { kind: KIND, id })
            .await;
        Ok(())
    }

    pub async fn allowed_actions(&self, id: Uuid) -> Result<AllowedActions, ServiceError> {
        Ok(AllowedActions::of(&self.find(id).await?))
    }

    #[instrument(skip(self, request), fields(purchase_order_id = %id, action = %action))]
    pub async fn apply_action(
        &self,
        id: Uuid,
        action: WorkflowAction,
        request: ActionRequest,
    ) -> Result<DocumentDetail<purchase_order::Model>, ServiceError> {
        request.validate()?;

        let db = &*self.db;
        let txn = db.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        let existing = purchase_order::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found(KIND.label(), id))?;

        let planned =
            documents::plan_change(&existing, action, PlanContext::default(), &request)?;
        let entry = planned.history_entry(&existing, &request);

        let mut active: purchase_order::ActiveModel = existing.into();
        active.stamp(&planned.change);
        let order = active.update(&txn).await.map_err(|e| {
            error!("Failed to update purchase order status: {}", e);
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
            version = order.version,
            "Purchase order status changed"
        );
        documents::publish_transition(&self.event_sender, KIND, id, &planned).await;

        Ok(DocumentDetail::new(order, items))
    }

    pub async fn history(&self, id: Uuid) -> Result<Vec<status_history::Model>, ServiceError> {
        self.find(id).await?;
        history::list(&*self.db, KIND, id).await
    }
}
