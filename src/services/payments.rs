use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::payment::{self, PaymentMethod},
    errors::ServiceError,
    events::{Event, EventSender},
    pricing::{self, round_money, CurrencyCatalogue},
    services::documents::{self, DocumentSettings},
    workflow::{DocumentKind, DocumentStatus},
};

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct PaymentInput {
    pub document_kind: DocumentKind,
    pub document_id: Uuid,
    pub amount: Decimal,
    /// Defaults to the document currency
    #[validate(length(equal = 3))]
    pub currency: Option<String>,
    /// Rate from the payment currency to the base currency
    pub exchange_rate: Option<Decimal>,
    pub method: PaymentMethod,
    #[validate(length(max = 100))]
    pub reference: Option<String>,
    pub received_on: Option<NaiveDate>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    #[validate(length(max = 100))]
    pub recorded_by: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BalanceState {
    Unpaid,
    PartiallyPaid,
    Paid,
    Overpaid,
}

/// What has been received against a document, in the document currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PaymentBalance {
    pub document_kind: DocumentKind,
    pub document_id: Uuid,
    pub currency: String,
    pub grand_total: Decimal,
    pub paid: Decimal,
    /// Negative when the buyer paid more than the document total
    pub outstanding: Decimal,
    pub state: BalanceState,
    pub payments: usize,
}

/// Converts a payment into the document currency through the base currency.
pub fn in_document_currency(
    payment: &payment::Model,
    currency: &str,
    exchange_rate: Decimal,
) -> Result<Decimal, ServiceError> {
    if payment.currency == currency {
        return Ok(payment.amount);
    }
    let in_base = pricing::to_base(payment.amount, payment.exchange_rate)?;
    pricing::from_base(in_base, exchange_rate)
}

pub fn balance_state(grand_total: Decimal, paid: Decimal) -> BalanceState {
    let outstanding = grand_total - paid;
    if outstanding < Decimal::ZERO {
        BalanceState::Overpaid
    } else if outstanding == Decimal::ZERO {
        BalanceState::Paid
    } else if paid == Decimal::ZERO {
        BalanceState::Unpaid
    } else {
        BalanceState::PartiallyPaid
    }
}

fn accepts_payments(kind: DocumentKind) -> bool {
    matches!(kind, DocumentKind::ProformaInvoice | DocumentKind::ExportOrder)
}

#[derive(Clone)]
pub struct PaymentService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
    settings: DocumentSettings,
}

impl PaymentService {
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

    fn ensure_kind(kind: DocumentKind) -> Result<(), ServiceError> {
        if accepts_payments(kind) {
            return Ok(());
        }
        Err(ServiceError::InvalidInput(format!(
            "payments can only be recorded against proforma invoices and export orders, not {}",
            kind
        )))
    }

    #[instrument(skip(self, input), fields(kind = %input.document_kind, document_id = %input.document_id))]
    pub async fn record(&self, input: PaymentInput) -> Result<payment::Model, ServiceError> {
        input.validate()?;
        Self::ensure_kind(input.document_kind)?;
        if input.amount <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "payment amount must be greater than zero".into(),
            ));
        }
        pricing::validate_amount(input.amount).map_err(ServiceError::ValidationError)?;

        let db = &*self.db;
        let document = documents::find_any(db, input.document_kind, input.document_id).await?;
        let (document_currency, document_rate) = {
            let header = document.header();
            if header.status() == DocumentStatus::Cancelled {
                return Err(ServiceError::InvalidStatus(format!(
                    "{} {} is cancelled",
                    header.kind().label(),
                    header.number()
                )));
            }
            (header.currency().to_string(), header.exchange_rate())
        };

        let currency = documents::clean(input.currency)
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or_else(|| document_currency.clone());
        if !CurrencyCatalogue::is_valid_code(&currency) {
            return Err(ServiceError::ValidationError(format!(
                "'{}' is not a valid currency code",
                currency
            )));
        }
        let exchange_rate = match input.exchange_rate {
            Some(rate) => rate,
            None if currency == document_currency => document_rate,
            None if currency == self.settings.base_currency => Decimal::ONE,
            None => {
                return Err(ServiceError::ValidationError(format!(
                    "an exchange rate to {} is required for payments in {}",
                    self.settings.base_currency, currency
                )))
            }
        };
        pricing::validate_exchange_rate(exchange_rate)?;

        let payment = payment::ActiveModel {
            id: Set(Uuid::new_v4()),
            document_kind: Set(input.document_kind),
            document_id: Set(input.document_id),
            amount: Set(round_money(input.amount)),
            currency: Set(currency),
            exchange_rate: Set(exchange_rate),
            method: Set(input.method),
            reference: Set(documents::clean(input.reference)),
            received_on: Set(input.received_on.unwrap_or_else(documents::today)),
            notes: Set(documents::clean(input.notes)),
            recorded_by: Set(documents::clean(input.recorded_by)),
            created_at: Set(Utc::now()),
        }
        .insert(db)
        .await
        .map_err(|e| {
            error!("Failed to insert payment: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        info!(payment_id = %payment.id, amount = %payment.amount, currency = %payment.currency, "Payment recorded");
        self.event_sender
            .publish(Event::PaymentRecorded {
                payment_id: payment.id,
                kind: payment.document_kind,
                document_id: payment.document_id,
                amount: payment.amount,
                currency: payment.currency.clone(),
            })
            .await;
        Ok(payment)
    }

    /// Payments against one document, in the order they were received.
    pub async fn list_for_document(
        &self,
        kind: DocumentKind,
        document_id: Uuid,
    ) -> Result<Vec<payment::Model>, ServiceError> {
        let payments = payment::Entity::find()
            .filter(payment::Column::DocumentKind.eq(kind))
            .filter(payment::Column::DocumentId.eq(document_id))
            .order_by_asc(payment::Column::ReceivedOn)
            .order_by_asc(payment::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(payments)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = payment::Entity::delete_by_id(id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Payment", id));
        }
        info!(payment_id = %id, "Payment deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn balance(
        &self,
        kind: DocumentKind,
        document_id: Uuid,
    ) -> Result<PaymentBalance, ServiceError> {
        Self::ensure_kind(kind)?;
        let payments = self.list_for_document(kind, document_id).await?;
        let document = documents::find_any(&*self.db, kind, document_id).await?;
        let header = document.header();

        let mut paid = Decimal::ZERO;
        for payment in &payments {
            paid += in_document_currency(payment, header.currency(), header.exchange_rate())?;
        }
        let grand_total = header.totals().grand_total;

        Ok(PaymentBalance {
            document_kind: kind,
            document_id,
            currency: header.currency().to_string(),
            grand_total,
            paid,
            outstanding: grand_total - paid,
            state: balance_state(grand_total, paid),
            payments: payments.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn payment(amount: Decimal, currency: &str, rate: Decimal) -> payment::Model {
        payment::Model {
            id: Uuid::new_v4(),
            document_kind: DocumentKind::ProformaInvoice,
            document_id: Uuid::new_v4(),
            amount,
            currency: currency.into(),
            exchange_rate: rate,
            method: PaymentMethod::WireTransfer,
            reference: None,
            received_on: Utc::now().date_naive(),
            notes: None,
            recorded_by: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn same_currency_payments_count_at_face_value() {
        let p = payment(dec!(500), "USD", dec!(80));
        assert_eq!(in_document_currency(&p, "USD", dec!(83)).unwrap(), dec!(500));
    }

    #[test]
    fn foreign_payments_go_through_the_base_currency() {
        let p = payment(dec!(41500), "INR", dec!(1));
        assert_eq!(in_document_currency(&p, "USD", dec!(83)).unwrap(), dec!(500.00));
    }

    #[test]
    fn states_follow_the_outstanding_amount() {
        assert_eq!(balance_state(dec!(100), dec!(0)), BalanceState::Unpaid);
        assert_eq!(balance_state(dec!(100), dec!(40)), BalanceState::PartiallyPaid);
        assert_eq!(balance_state(dec!(100), dec!(100)), BalanceState::Paid);
        assert_eq!(balance_state(dec!(100), dec!(100.01)), BalanceState::Overpaid);
    }

    #[test]
    fn only_invoices_and_orders_take_payments() {
        assert!(PaymentService::ensure_kind(DocumentKind::ExportOrder).is_ok());
        assert!(PaymentService::ensure_kind(DocumentKind::Quote).is_err());
    }
}
