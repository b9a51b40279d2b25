use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The document types that take part in the trade workflow.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(24))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DocumentKind {
    #[sea_orm(string_value = "enquiry")]
    Enquiry,
    #[sea_orm(string_value = "quote")]
    Quote,
    #[sea_orm(string_value = "proforma_invoice")]
    ProformaInvoice,
    #[sea_orm(string_value = "export_order")]
    ExportOrder,
    #[sea_orm(string_value = "purchase_order")]
    PurchaseOrder,
    #[sea_orm(string_value = "shipping_bill")]
    ShippingBill,
}

impl DocumentKind {
    /// Prefix used when numbering documents of this kind.
    pub fn number_prefix(self) -> &'static str {
        match self {
            DocumentKind::Enquiry => "ENQ",
            DocumentKind::Quote => "QT",
            DocumentKind::ProformaInvoice => "PI",
            DocumentKind::ExportOrder => "EO",
            DocumentKind::PurchaseOrder => "PO",
            DocumentKind::ShippingBill => "SB",
        }
    }

    /// Title printed at the top of the rendered document.
    pub fn title(self) -> &'static str {
        match self {
            DocumentKind::Enquiry => "ENQUIRY",
            DocumentKind::Quote => "QUOTATION",
            DocumentKind::ProformaInvoice => "PROFORMA INVOICE",
            DocumentKind::ExportOrder => "EXPORT ORDER",
            DocumentKind::PurchaseOrder => "PURCHASE ORDER",
            DocumentKind::ShippingBill => "SHIPPING BILL",
        }
    }

    /// Human label used in log lines and error messages.
    pub fn label(self) -> &'static str {
        match self {
            DocumentKind::Enquiry => "Enquiry",
            DocumentKind::Quote => "Quote",
            DocumentKind::ProformaInvoice => "Proforma invoice",
            DocumentKind::ExportOrder => "Export order",
            DocumentKind::PurchaseOrder => "Purchase order",
            DocumentKind::ShippingBill => "Shipping bill",
        }
    }

    /// Whether the header carries freight and insurance charges.
    pub fn carries_charges(self) -> bool {
        matches!(
            self,
            DocumentKind::ProformaInvoice | DocumentKind::ExportOrder | DocumentKind::ShippingBill
        )
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(24))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DocumentStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "sent")]
    Sent,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "revised")]
    Revised,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "shipped")]
    Shipped,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "converted")]
    Converted,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl DocumentStatus {
    /// Header fields and line items may only change in these states.
    pub fn is_editable(self) -> bool {
        matches!(self, DocumentStatus::Draft | DocumentStatus::Revised)
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            DocumentStatus::Converted | DocumentStatus::Completed | DocumentStatus::Cancelled
        )
    }

    /// Rows may be hard-deleted only before anything happened to them, or once abandoned.
    pub fn is_deletable(self) -> bool {
        matches!(self, DocumentStatus::Draft | DocumentStatus::Cancelled)
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WorkflowAction {
    Submit,
    Approve,
    Reject,
    Send,
    Confirm,
    Ship,
    Complete,
    Revise,
    Cancel,
    Convert,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn kinds_round_trip_through_path_segments() {
        assert_eq!(
            DocumentKind::from_str("proforma_invoice").unwrap(),
            DocumentKind::ProformaInvoice
        );
        assert_eq!(DocumentKind::ShippingBill.to_string(), "shipping_bill");
        assert!(DocumentKind::from_str("invoice").is_err());
    }

    #[test]
    fn actions_parse_from_snake_case() {
        assert_eq!(WorkflowAction::from_str("revise").unwrap(), WorkflowAction::Revise);
        assert!(WorkflowAction::from_str("archive").is_err());
    }

    #[test]
    fn only_draft_and_revised_are_editable() {
        use sea_orm::Iterable;
        let editable: Vec<_> = DocumentStatus::iter().filter(|s| s.is_editable()).collect();
        assert_eq!(editable, vec![DocumentStatus::Draft, DocumentStatus::Revised]);
    }
}
