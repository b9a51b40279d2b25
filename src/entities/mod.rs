use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::pricing::{Charges, DocumentTotals};
use crate::workflow::{DocumentKind, DocumentStatus};

/// Read access to the header fields every trade document shares.
pub trait DocumentHeader {
    fn kind(&self) -> DocumentKind;
    fn id(&self) -> Uuid;
    fn number(&self) -> &str;
    fn status(&self) -> DocumentStatus;
    fn version(&self) -> i32;
    /// Buyer, or supplier for purchase orders.
    fn party_id(&self) -> Uuid;
    fn document_date(&self) -> NaiveDate;
    fn currency(&self) -> &str;
    fn exchange_rate(&self) -> Decimal;
    /// Id of the document this one was converted from.
    fn reference_id(&self) -> Option<Uuid>;
    fn charges(&self) -> Charges;
    fn totals(&self) -> DocumentTotals;
    fn base_grand_total(&self) -> Decimal;
    fn notes(&self) -> Option<&str>;
    fn terms(&self) -> Option<&str>;
}

/// Workflow fields written when a document changes status.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub to: DocumentStatus,
    pub version: i32,
    /// Rejection or cancellation reason
    pub reason: Option<String>,
    pub approved_by: Option<String>,
    pub at: DateTime<Utc>,
}

/// Applies a [`StatusChange`] to a document's active model.
pub trait WorkflowStamp {
    fn stamp(&mut self, change: &StatusChange);
}

macro_rules! impl_document_header {
    (@reference $m:expr, none) => {
        None
    };
    (@reference $m:expr, $field:ident) => {
        $m.$field
    };
    (@charges $m:expr, none) => {
        $crate::pricing::Charges::default()
    };
    (@charges $m:expr, freight) => {
        $crate::pricing::Charges {
            freight: $m.freight,
            insurance: $m.insurance,
        }
    };
    ($model:ty, $kind:expr, $party:ident, reference: $reference:ident, charges: $charges:ident) => {
        impl $crate::entities::DocumentHeader for $model {
            fn kind(&self) -> $crate::workflow::DocumentKind {
                $kind
            }
            fn id(&self) -> ::uuid::Uuid {
                self.id
            }
            fn number(&self) -> &str {
                &self.number
            }
            fn status(&self) -> $crate::workflow::DocumentStatus {
                self.status
            }
            fn version(&self) -> i32 {
                self.version
            }
            fn party_id(&self) -> ::uuid::Uuid {
                self.$party
            }
            fn document_date(&self) -> ::chrono::NaiveDate {
                self.document_date
            }
            fn currency(&self) -> &str {
                &self.currency
            }
            fn exchange_rate(&self) -> ::rust_decimal::Decimal {
                self.exchange_rate
            }
            fn reference_id(&self) -> Option<::uuid::Uuid> {
                impl_document_header!(@reference self, $reference)
            }
            fn charges(&self) -> $crate::pricing::Charges {
                impl_document_header!(@charges self, $charges)
            }
            fn totals(&self) -> $crate::pricing::DocumentTotals {
                let charges = $crate::entities::DocumentHeader::charges(self);
                $crate::pricing::DocumentTotals {
                    subtotal: self.subtotal,
                    discount_total: self.discount_total,
                    tax_total: self.tax_total,
                    freight: charges.freight,
                    insurance: charges.insurance,
                    grand_total: self.grand_total,
                }
            }
            fn base_grand_total(&self) -> ::rust_decimal::Decimal {
                self.base_grand_total
            }
            fn notes(&self) -> Option<&str> {
                self.notes.as_deref()
            }
            fn terms(&self) -> Option<&str> {
                self.terms.as_deref()
            }
        }

        impl $crate::entities::WorkflowStamp for ActiveModel {
            fn stamp(&mut self, change: &$crate::entities::StatusChange) {
                use ::sea_orm::ActiveValue::Set;
                self.status = Set(change.to);
                self.version = Set(change.version);
                if let Some(reason) = &change.reason {
                    self.status_reason = Set(Some(reason.clone()));
                }
                if let Some(approver) = &change.approved_by {
                    self.approved_by = Set(Some(approver.clone()));
                    self.approved_at = Set(Some(change.at));
                }
            }
        }
    };
}

pub mod attachment;
pub mod business_entity;
pub mod document_sequence;
pub mod enquiry;
pub mod export_order;
pub mod line_item;
pub mod payment;
pub mod product;
pub mod proforma_invoice;
pub mod purchase_order;
pub mod quote;
pub mod shipping_bill;
pub mod sku;
pub mod status_history;

/// Highest discount percent across a document's lines.
pub fn max_discount_percent(items: &[line_item::Model]) -> Decimal {
    items
        .iter()
        .map(|item| item.discount_percent)
        .max()
        .unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn header_accessors_cover_charges() {
        let now = Utc::now();
        let pi = proforma_invoice::Model {
            id: Uuid::new_v4(),
            number: "PI-2026-0001".into(),
            status: DocumentStatus::Draft,
            version: 1,
            buyer_id: Uuid::new_v4(),
            consignee_id: None,
            reference_id: Some(Uuid::new_v4()),
            document_date: now.date_naive(),
            valid_until: None,
            currency: "USD".into(),
            exchange_rate: dec!(83),
            port_of_loading: None,
            port_of_discharge: None,
            final_destination: None,
            incoterms: Some("CIF".into()),
            payment_terms: None,
            freight: dec!(100),
            insurance: dec!(10),
            subtotal: dec!(1000),
            discount_total: dec!(0),
            tax_total: dec!(0),
            grand_total: dec!(1110),
            base_grand_total: dec!(92130),
            notes: None,
            terms: None,
            converted_to_id: None,
            status_reason: None,
            approved_by: None,
            approved_at: None,
            created_by: None,
            created_at: now,
            updated_at: now,
        };

        assert_eq!(pi.kind(), DocumentKind::ProformaInvoice);
        assert_eq!(pi.charges().freight, dec!(100));
        assert_eq!(pi.totals().insurance, dec!(10));
        assert_eq!(pi.totals().grand_total, dec!(1110));
        assert!(pi.reference_id().is_some());
    }

    #[test]
    fn stamp_sets_approver_only_when_given() {
        use sea_orm::ActiveValue;

        let mut active = quote::ActiveModel {
            status: ActiveValue::Set(DocumentStatus::Pending),
            version: ActiveValue::Set(1),
            ..Default::default()
        };
        let at = Utc::now();
        active.stamp(&StatusChange {
            to: DocumentStatus::Approved,
            version: 1,
            reason: None,
            approved_by: Some("asha".into()),
            at,
        });
        assert_eq!(active.status, ActiveValue::Set(DocumentStatus::Approved));
        assert_eq!(active.approved_at, ActiveValue::Set(Some(at)));
        assert_eq!(active.status_reason, ActiveValue::NotSet);

        active.stamp(&StatusChange {
            to: DocumentStatus::Revised,
            version: 2,
            reason: Some("price update".into()),
            approved_by: None,
            at,
        });
        assert_eq!(active.version, ActiveValue::Set(2));
        assert_eq!(
            active.status_reason,
            ActiveValue::Set(Some("price update".to_string()))
        );
    }
}
