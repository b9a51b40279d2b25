//! PDF generation for trade documents.
//!
//! The services turn a stored document into a [`DocumentView`]; the layouts in
//! [`templates`] draw it onto a [`canvas::Canvas`] and [`writer::PdfWriter`]
//! serialises the pages. Nothing here touches the database.

pub mod canvas;
pub mod metrics;
pub mod money;
pub mod table;
pub mod templates;
pub mod words;
pub mod writer;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::pricing::currency::Currency;
use crate::pricing::DocumentTotals;
use crate::workflow::{DocumentKind, DocumentStatus};

pub use templates::render;

/// A4 portrait, in points.
pub const PAGE_WIDTH: f32 = 595.28;
pub const PAGE_HEIGHT: f32 = 841.89;

/// A labelled address box such as "Buyer" or "Consignee".
#[derive(Debug, Clone, PartialEq)]
pub struct PartyBlock {
    pub heading: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemRow {
    pub line_no: i32,
    pub description: String,
    pub hsn_code: Option<String>,
    pub quantity: Decimal,
    pub unit: String,
    pub unit_price: Decimal,
    pub discount_percent: Decimal,
    pub tax_percent: Decimal,
    pub amount: Decimal,
}

/// FOB figures printed on shipping bills.
#[derive(Debug, Clone, PartialEq)]
pub struct FobBlock {
    pub fob_value: Decimal,
    pub base_fob_value: Decimal,
}

/// Everything a layout needs to draw one document.
#[derive(Debug, Clone)]
pub struct DocumentView {
    pub kind: DocumentKind,
    pub number: String,
    pub version: i32,
    pub status: DocumentStatus,
    pub document_date: NaiveDate,
    pub currency: Currency,
    pub exchange_rate: Decimal,
    pub base_currency: Currency,
    pub parties: Vec<PartyBlock>,
    /// Label/value pairs for the meta grid, in print order
    pub meta: Vec<(String, String)>,
    pub items: Vec<ItemRow>,
    pub totals: DocumentTotals,
    pub base_grand_total: Decimal,
    pub fob: Option<FobBlock>,
    pub notes: Option<String>,
    pub terms: Option<String>,
}

impl DocumentView {
    /// True when at least one line carries a price.
    pub fn has_prices(&self) -> bool {
        self.items.iter().any(|item| !item.unit_price.is_zero())
    }

    pub fn is_foreign_currency(&self) -> bool {
        self.currency.code != self.base_currency.code
    }
}
