//! Page layouts for the six document kinds.
//!
//! Every kind shares one skeleton: letterhead, title and number box, party
//! boxes, meta grid, items table, totals, amount in words, notes and terms,
//! and a signature block. Kinds differ in their parties, their meta rows
//! (assembled by the rendering service) and in a few blocks switched on here.

use rust_decimal::Decimal;
use tracing::debug;

use super::canvas::{wrap_text, Align, Canvas, Margins};
use super::metrics::Font;
use super::money::{format_amount, format_plain, format_with_code};
use super::table::{Column, Table};
use super::words::amount_in_words;
use super::writer::{DocumentInfo, PdfWriter};
use super::{DocumentView, PartyBlock};
use crate::config::CompanyProfile;
use crate::errors::ServiceError;
use crate::workflow::DocumentKind;

const BODY: f32 = 9.0;
const SMALL: f32 = 8.0;
const LEADING: f32 = 11.5;
const GAP: f32 = 8.0;

/// One line of the totals block.
struct TotalRow {
    label: String,
    value: String,
    strong: bool,
}

impl TotalRow {
    fn new(label: impl Into<String>, value: String) -> Self {
        Self {
            label: label.into(),
            value,
            strong: false,
        }
    }

    fn strong(mut self) -> Self {
        self.strong = true;
        self
    }
}

/// Renders `view` into a complete PDF file.
pub fn render(view: &DocumentView, company: &CompanyProfile) -> Result<Vec<u8>, ServiceError> {
    let priced = shows_prices(view);
    let words = if priced {
        Some(
            amount_in_words(words_amount(view), &view.currency)
                .map_err(|e| ServiceError::RenderError(e.to_string()))?,
        )
    } else {
        None
    };

    let mut canvas = Canvas::new(Margins::default());
    letterhead(&mut canvas, company);
    title_block(&mut canvas, view);
    party_boxes(&mut canvas, view, company);
    meta_grid(&mut canvas, view);

    let totals = if priced { total_rows(view) } else { Vec::new() };
    let reserve = if priced {
        totals.len() as f32 * LEADING + 3.0 * LEADING + GAP
    } else {
        0.0
    };
    items_table(&mut canvas, view, priced, reserve);

    if priced {
        totals_block(&mut canvas, &totals);
    }
    if let Some(words) = &words {
        amount_words(&mut canvas, words);
    }
    if matches!(
        view.kind,
        DocumentKind::ProformaInvoice | DocumentKind::ExportOrder
    ) {
        bank_details(&mut canvas, company);
    }
    text_section(&mut canvas, "Notes", view.notes.as_deref());
    text_section(&mut canvas, "Terms & Conditions", view.terms.as_deref());
    signature_block(&mut canvas, company);

    let number = view.number.clone();
    let pages = canvas.finish(SMALL, |page, total| {
        format!("{}  |  Page {} of {}", number, page, total)
    });

    let mut writer = PdfWriter::new(DocumentInfo::new(format!(
        "{} {}",
        view.kind.label(),
        view.number
    )));
    for page in pages {
        writer.add_page(page);
    }
    debug!(
        kind = %view.kind,
        number = %view.number,
        pages = writer.page_count(),
        "Rendered document"
    );
    Ok(writer.finish())
}

/// Enquiries often arrive without prices; those print quantities only.
fn shows_prices(view: &DocumentView) -> bool {
    view.kind != DocumentKind::Enquiry || view.has_prices()
}

fn words_amount(view: &DocumentView) -> Decimal {
    match &view.fob {
        Some(fob) => fob.fob_value,
        None => view.totals.grand_total,
    }
}

fn letterhead(canvas: &mut Canvas, company: &CompanyProfile) {
    let mut y = canvas.cursor() + 14.0;
    canvas.text_center(Font::Bold, y, 16.0, &company.name);
    y += 4.0;

    for line in company.address.lines().map(str::trim).filter(|l| !l.is_empty()) {
        y += LEADING;
        canvas.text_center(Font::Regular, y, BODY, line);
    }

    let contact: Vec<String> = [("Tel: ", &company.phone), ("Email: ", &company.email)]
        .into_iter()
        .filter_map(|(label, value)| value.as_ref().map(|v| format!("{}{}", label, v)))
        .collect();
    if !contact.is_empty() {
        y += LEADING;
        canvas.text_center(Font::Regular, y, BODY, &contact.join("  |  "));
    }

    let ids: Vec<String> = [("GSTIN: ", &company.tax_id), ("IEC: ", &company.iec_code)]
        .into_iter()
        .filter_map(|(label, value)| value.as_ref().map(|v| format!("{}{}", label, v)))
        .collect();
    if !ids.is_empty() {
        y += LEADING;
        canvas.text_center(Font::Regular, y, BODY, &ids.join("  |  "));
    }

    y += GAP;
    canvas.rule(y, 1.0);
    canvas.set_cursor(y + GAP);
}

fn title_block(canvas: &mut Canvas, view: &DocumentView) {
    let y = canvas.cursor() + 14.0;
    canvas.text_center(Font::Bold, y, 14.0, view.kind.title());

    let top = y + GAP;
    let height = 2.0 * LEADING + GAP;
    let (left, right, width) = (canvas.left(), canvas.right(), canvas.width());
    canvas.rect(left, top, width, height);

    let first = top + 4.0 + BODY;
    canvas.bold(left + 6.0, first, BODY, &format!("No.: {}", view.number));
    canvas.text(
        left + 6.0,
        first + LEADING,
        BODY,
        &format!("Date: {}", view.document_date.format("%d-%b-%Y")),
    );
    canvas.text_right(
        Font::Bold,
        right - 6.0,
        first,
        BODY,
        &format!("Version: {}", view.version),
    );
    canvas.text_right(
        Font::Regular,
        right - 6.0,
        first + LEADING,
        BODY,
        &format!("Status: {}", view.status.to_string().to_uppercase()),
    );
    canvas.set_cursor(top + height + GAP);
}

fn company_block(view: &DocumentView, company: &CompanyProfile) -> PartyBlock {
    let heading = if view.kind == DocumentKind::PurchaseOrder {
        "Ordered By"
    } else {
        "Exporter"
    };
    let mut lines = vec![company.name.clone()];
    lines.extend(
        company
            .address
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from),
    );
    if let Some(iec) = &company.iec_code {
        lines.push(format!("IEC: {}", iec));
    }
    PartyBlock {
        heading: heading.to_string(),
        lines,
    }
}

fn party_boxes(canvas: &mut Canvas, view: &DocumentView, company: &CompanyProfile) {
    let mut blocks = vec![company_block(view, company)];
    blocks.extend(view.parties.iter().cloned());

    let column = canvas.width() / blocks.len() as f32;
    let wrapped: Vec<Vec<String>> = blocks
        .iter()
        .map(|block| {
            block
                .lines
                .iter()
                .flat_map(|line| wrap_text(line, Font::Regular, BODY, column - 12.0))
                .collect()
        })
        .collect();
    let lines = wrapped.iter().map(Vec::len).max().unwrap_or(0);
    let height = (lines + 1) as f32 * LEADING + GAP;

    canvas.ensure_space(height);
    let top = canvas.cursor();
    let mut x = canvas.left();
    for (block, lines) in blocks.iter().zip(&wrapped) {
        canvas.rect(x, top, column, height);
        let mut y = top + 4.0 + BODY;
        canvas.bold(x + 6.0, y, BODY, &block.heading);
        for line in lines {
            y += LEADING;
            canvas.text(x + 6.0, y, BODY, line);
        }
        x += column;
    }
    canvas.set_cursor(top + height + GAP);
}

fn meta_grid(canvas: &mut Canvas, view: &DocumentView) {
    if view.meta.is_empty() {
        return;
    }
    let half = canvas.width() / 2.0;
    let label_width = 95.0;
    for pair in view.meta.chunks(2) {
        let wrapped: Vec<Vec<String>> = pair
            .iter()
            .map(|(_, value)| wrap_text(value, Font::Regular, BODY, half - label_width - 8.0))
            .collect();
        let lines = wrapped.iter().map(Vec::len).max().unwrap_or(1).max(1);
        let height = lines as f32 * LEADING;

        canvas.ensure_space(height);
        let top = canvas.cursor() + BODY;
        let mut x = canvas.left();
        for ((label, _), value_lines) in pair.iter().zip(&wrapped) {
            canvas.bold(x, top, BODY, &format!("{}:", label));
            let mut y = top;
            for line in value_lines {
                canvas.text(x + label_width, y, BODY, line);
                y += LEADING;
            }
            x += half;
        }
        canvas.advance(height);
    }
    canvas.advance(GAP);
}

fn items_table(canvas: &mut Canvas, view: &DocumentView, priced: bool, reserve: f32) {
    let mut columns = vec![
        Column::new("#", 0.5, Align::Right),
        Column::new("Description", if priced { 4.0 } else { 6.0 }, Align::Left),
        Column::new("HSN", 1.1, Align::Left),
        Column::new("Qty", 1.0, Align::Right),
        Column::new("Unit", 0.8, Align::Left),
    ];
    if priced {
        columns.extend([
            Column::new(format!("Rate ({})", view.currency.code), 1.5, Align::Right),
            Column::new("Disc %", 0.8, Align::Right),
            Column::new("Tax %", 0.8, Align::Right),
            Column::new(format!("Amount ({})", view.currency.code), 1.7, Align::Right),
        ]);
    }

    let rows: Vec<Vec<String>> = view
        .items
        .iter()
        .map(|item| {
            let mut row = vec![
                item.line_no.to_string(),
                item.description.clone(),
                item.hsn_code.clone().unwrap_or_default(),
                format_plain(item.quantity),
                item.unit.clone(),
            ];
            if priced {
                row.extend([
                    format_amount(item.unit_price, &view.currency),
                    format_plain(item.discount_percent),
                    format_plain(item.tax_percent),
                    format_amount(item.amount, &view.currency),
                ]);
            }
            row
        })
        .collect();

    Table::new(columns, BODY).draw(canvas, &rows, reserve);
    canvas.advance(GAP);
}

fn total_rows(view: &DocumentView) -> Vec<TotalRow> {
    let currency = &view.currency;
    let totals = &view.totals;
    let mut rows = vec![TotalRow::new(
        "Subtotal",
        format_amount(totals.subtotal, currency),
    )];
    if !totals.discount_total.is_zero() {
        rows.push(TotalRow::new(
            "Less: Discount",
            format!("-{}", format_amount(totals.discount_total, currency)),
        ));
    }
    if !totals.tax_total.is_zero() {
        rows.push(TotalRow::new("Tax", format_amount(totals.tax_total, currency)));
    }

    if let Some(fob) = &view.fob {
        rows.push(TotalRow::new(
            "Invoice Value",
            format_with_code(totals.grand_total, currency),
        ));
        rows.push(TotalRow::new(
            "Less: Freight",
            format_amount(totals.freight, currency),
        ));
        rows.push(TotalRow::new(
            "Less: Insurance",
            format_amount(totals.insurance, currency),
        ));
        rows.push(TotalRow::new("FOB Value", format_with_code(fob.fob_value, currency)).strong());
        rows.push(TotalRow::new(
            format!(
                "FOB Value in {} @ {}",
                view.base_currency.code,
                format_plain(view.exchange_rate)
            ),
            format_with_code(fob.base_fob_value, &view.base_currency),
        ));
        return rows;
    }

    if view.kind.carries_charges() {
        rows.push(TotalRow::new("Freight", format_amount(totals.freight, currency)));
        rows.push(TotalRow::new(
            "Insurance",
            format_amount(totals.insurance, currency),
        ));
    }
    rows.push(TotalRow::new("Grand Total", format_with_code(totals.grand_total, currency)).strong());
    if view.is_foreign_currency() {
        rows.push(TotalRow::new(
            format!(
                "Equivalent in {} @ {}",
                view.base_currency.code,
                format_plain(view.exchange_rate)
            ),
            format_with_code(view.base_grand_total, &view.base_currency),
        ));
    }
    rows
}

fn totals_block(canvas: &mut Canvas, rows: &[TotalRow]) {
    canvas.ensure_space(rows.len() as f32 * LEADING + GAP);
    let right = canvas.right();
    let label_right = right - 120.0;
    for row in rows {
        let y = canvas.cursor() + BODY;
        let font = if row.strong { Font::Bold } else { Font::Regular };
        if row.strong {
            canvas.line(label_right - 100.0, canvas.cursor(), right, canvas.cursor(), 0.5);
        }
        canvas.text_right(font, label_right, y, BODY, &row.label);
        canvas.text_right(font, right - 4.0, y, BODY, &row.value);
        canvas.advance(LEADING);
    }
    canvas.advance(GAP);
}

fn amount_words(canvas: &mut Canvas, words: &str) {
    let lines = wrap_text(words, Font::Regular, BODY, canvas.width() - 100.0);
    canvas.ensure_space(lines.len() as f32 * LEADING + GAP);
    let left = canvas.left();
    let mut y = canvas.cursor() + BODY;
    canvas.bold(left, y, BODY, "Amount in words:");
    for line in &lines {
        canvas.text(left + 100.0, y, BODY, line);
        y += LEADING;
    }
    canvas.advance(lines.len() as f32 * LEADING + GAP);
}

fn bank_details(canvas: &mut Canvas, company: &CompanyProfile) {
    let lines: Vec<String> = [
        ("Bank: ", &company.bank_name),
        ("A/c No.: ", &company.bank_account),
        ("SWIFT: ", &company.bank_swift),
        ("IFSC: ", &company.bank_ifsc),
    ]
    .into_iter()
    .filter_map(|(label, value)| value.as_ref().map(|v| format!("{}{}", label, v)))
    .collect();
    if lines.is_empty() {
        return;
    }
    section(canvas, "Bank Details", &lines);
}

fn text_section(canvas: &mut Canvas, heading: &str, text: Option<&str>) {
    let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
        return;
    };
    let lines = wrap_text(text, Font::Regular, BODY, canvas.width());
    section(canvas, heading, &lines);
}

/// A bold heading followed by lines; long sections continue on the next page.
fn section(canvas: &mut Canvas, heading: &str, lines: &[String]) {
    canvas.ensure_space(2.0 * LEADING);
    let left = canvas.left();
    canvas.bold(left, canvas.cursor() + BODY, BODY, heading);
    canvas.advance(LEADING);
    for line in lines {
        canvas.ensure_space(LEADING);
        canvas.text(left, canvas.cursor() + BODY, BODY, line);
        canvas.advance(LEADING);
    }
    canvas.advance(GAP);
}

fn signature_block(canvas: &mut Canvas, company: &CompanyProfile) {
    canvas.ensure_space(4.0 * LEADING + 30.0);
    let right = canvas.right();
    let y = canvas.cursor() + LEADING;
    canvas.text_right(Font::Bold, right, y, BODY, &format!("For {}", company.name));
    let signatory = company
        .signatory
        .as_deref()
        .unwrap_or("Authorised Signatory");
    canvas.text_right(Font::Regular, right, y + 30.0 + LEADING, BODY, signatory);
    canvas.advance(3.0 * LEADING + 30.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::{FobBlock, ItemRow};
    use crate::pricing::currency::CurrencyCatalogue;
    use crate::pricing::DocumentTotals;
    use crate::workflow::DocumentStatus;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn item(line_no: i32, price: Decimal) -> ItemRow {
        ItemRow {
            line_no,
            description: format!("Cotton knitted T-shirt, style {}", line_no),
            hsn_code: Some("61091000".into()),
            quantity: dec!(100),
            unit: "pcs".into(),
            unit_price: price,
            discount_percent: dec!(0),
            tax_percent: dec!(0),
            amount: price * dec!(100),
        }
    }

    fn view(kind: DocumentKind, items: Vec<ItemRow>) -> DocumentView {
        let subtotal: Decimal = items.iter().map(|i| i.amount).sum();
        DocumentView {
            kind,
            number: format!("{}-2026-0001", kind.number_prefix()),
            version: 1,
            status: DocumentStatus::Draft,
            document_date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            currency: CurrencyCatalogue::lookup("USD").unwrap(),
            exchange_rate: dec!(83.25),
            base_currency: CurrencyCatalogue::lookup("INR").unwrap(),
            parties: vec![PartyBlock {
                heading: "Buyer".into(),
                lines: vec!["Harbour Imports LLC".into(), "Rotterdam".into()],
            }],
            meta: vec![
                ("Incoterms".into(), "FOB".into()),
                ("Port of Loading".into(), "INMAA".into()),
            ],
            items,
            totals: DocumentTotals {
                subtotal,
                grand_total: subtotal,
                ..Default::default()
            },
            base_grand_total: subtotal * dec!(83.25),
            fob: None,
            notes: Some("Shipment within 30 days of advance".into()),
            terms: None,
        }
    }

    fn contains(pdf: &[u8], needle: &str) -> bool {
        pdf.windows(needle.len()).any(|w| w == needle.as_bytes())
    }

    #[test]
    fn quote_prints_totals_and_words() {
        let pdf = render(
            &view(DocumentKind::Quote, vec![item(1, dec!(4.5))]),
            &CompanyProfile::sample(),
        )
        .unwrap();
        assert!(pdf.starts_with(b"%PDF-1.4"));
        assert!(contains(&pdf, "(QUOTATION)"));
        assert!(contains(&pdf, "(Grand Total)"));
        assert!(contains(&pdf, "(USD 450.00)"));
        assert!(contains(&pdf, "US Dollars Four Hundred Fifty Only"));
        assert!(contains(&pdf, "(INR 37,462.50)"));
        assert!(contains(&pdf, "Page 1 of 1"));
    }

    #[test]
    fn enquiry_without_prices_omits_amounts() {
        let pdf = render(
            &view(DocumentKind::Enquiry, vec![item(1, dec!(0)), item(2, dec!(0))]),
            &CompanyProfile::sample(),
        )
        .unwrap();
        assert!(contains(&pdf, "(ENQUIRY)"));
        assert!(!contains(&pdf, "Amount (USD)"));
        assert!(!contains(&pdf, "Grand Total"));
        assert!(!contains(&pdf, "Amount in words"));
    }

    #[test]
    fn shipping_bill_prints_fob() {
        let mut sb = view(DocumentKind::ShippingBill, vec![item(1, dec!(10))]);
        sb.totals.freight = dec!(50);
        sb.totals.insurance = dec!(5);
        sb.totals.grand_total = dec!(1055);
        sb.fob = Some(FobBlock {
            fob_value: dec!(1000),
            base_fob_value: dec!(83250),
        });
        let pdf = render(&sb, &CompanyProfile::sample()).unwrap();
        assert!(contains(&pdf, "(FOB Value)"));
        assert!(contains(&pdf, "(INR 83,250.00)"));
        assert!(contains(&pdf, "US Dollars One Thousand Only"));
    }

    #[test]
    fn long_documents_span_pages_with_footers() {
        let items = (1..=80).map(|i| item(i, dec!(2))).collect();
        let pdf = render(&view(DocumentKind::ProformaInvoice, items), &CompanyProfile::sample())
            .unwrap();
        assert!(contains(&pdf, "Page 1 of "));
        assert!(contains(&pdf, "Page 2 of "));
        assert!(contains(&pdf, "continued on page 2"));
        assert!(contains(&pdf, "(Bank Details)"));
    }
}
