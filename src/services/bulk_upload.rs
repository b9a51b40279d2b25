//! CSV ingestion for business entities, products and enquiries.
//!
//! Headers are matched loosely against known aliases so that spreadsheets
//! exported from other tools load without editing. Rows are validated one by
//! one; a bad row is reported with its line number and the rest still load.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use csv::StringRecord;
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Serialize;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entities::{
        business_entity::{self, EntityType},
        product,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    pricing,
    services::{
        business_entities::{BusinessEntityInput, BusinessEntityService},
        enquiries::{EnquiryInput, EnquiryService},
        line_items::LineItemInput,
        products::{ProductInput, ProductService},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UploadTarget {
    Entities,
    Products,
    Enquiries,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RowError {
    /// 1-based line in the file; the header is line 1
    pub line: u64,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UploadSummary {
    pub target: UploadTarget,
    pub inserted: usize,
    pub skipped: usize,
    pub errors: Vec<RowError>,
    /// Ids of the records created, in file order
    pub created_ids: Vec<Uuid>,
}

impl UploadSummary {
    fn new(target: UploadTarget) -> Self {
        Self {
            target,
            inserted: 0,
            skipped: 0,
            errors: Vec::new(),
            created_ids: Vec::new(),
        }
    }

    fn reject(&mut self, line: u64, message: impl Into<String>) {
        self.skipped += 1;
        self.errors.push(RowError {
            line,
            message: message.into(),
        });
    }

    fn accept(&mut self, id: Uuid) {
        self.inserted += 1;
        self.created_ids.push(id);
    }
}

/// A logical column and the header spellings that map onto it.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub key: &'static str,
    pub aliases: &'static [&'static str],
    pub required: bool,
}

const fn column(key: &'static str, aliases: &'static [&'static str], required: bool) -> ColumnSpec {
    ColumnSpec {
        key,
        aliases,
        required,
    }
}

pub const ENTITY_COLUMNS: &[ColumnSpec] = &[
    column("name", &["name", "company", "company_name", "entity_name", "business_name"], true),
    column("entity_type", &["entity_type", "type", "role", "category"], false),
    column("contact_person", &["contact_person", "contact", "contact_name"], false),
    column("email", &["email", "email_address", "e_mail"], false),
    column("phone", &["phone", "phone_number", "mobile", "telephone"], false),
    column("address", &["address", "street", "address_line"], false),
    column("city", &["city", "town"], false),
    column("country", &["country", "nation"], false),
    column("tax_id", &["tax_id", "gstin", "vat", "vat_number", "tax_number"], false),
    column("iec_code", &["iec_code", "iec"], false),
];

pub const PRODUCT_COLUMNS: &[ColumnSpec] = &[
    column("name", &["name", "product", "product_name", "item", "item_name"], true),
    column("description", &["description", "details", "product_description"], false),
    column("hsn_code", &["hsn_code", "hsn", "hs_code", "hsn_sac"], false),
    column("unit", &["unit", "uom", "unit_of_measure"], false),
    column("default_price", &["default_price", "price", "unit_price", "rate"], false),
    column("currency", &["currency", "currency_code"], false),
];

pub const ENQUIRY_COLUMNS: &[ColumnSpec] = &[
    column("enquiry_ref", &["enquiry_ref", "enquiry_reference", "ref", "reference", "enquiry_no"], false),
    column("buyer", &["buyer", "buyer_name", "customer", "customer_name", "company"], true),
    column("subject", &["subject", "title"], false),
    column("product", &["product", "product_name", "item", "description", "item_description"], true),
    column("hsn_code", &["hsn_code", "hsn", "hs_code"], false),
    column("quantity", &["quantity", "qty"], true),
    column("unit", &["unit", "uom"], false),
    column("target_price", &["target_price", "price", "unit_price", "rate"], false),
    column("currency", &["currency", "currency_code"], false),
    column("required_by", &["required_by", "delivery_date", "due_date"], false),
    column("source", &["source", "channel"], false),
    column("notes", &["notes", "remarks", "comments"], false),
];

/// Lower case, trimmed, spaces and dashes folded into underscores.
pub fn normalise_header(raw: &str) -> String {
    raw.trim()
        .trim_start_matches('\u{feff}')
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

/// Where each known column sits in the file.
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    positions: HashMap<&'static str, usize>,
}

impl ColumnMap {
    pub fn has(&self, key: &str) -> bool {
        self.positions.contains_key(key)
    }

    /// Trimmed cell value, `None` when the column is absent or the cell blank.
    pub fn get<'r>(&self, record: &'r StringRecord, key: &str) -> Option<&'r str> {
        self.positions
            .get(key)
            .and_then(|idx| record.get(*idx))
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    fn owned(&self, record: &StringRecord, key: &str) -> Option<String> {
        self.get(record, key).map(str::to_string)
    }
}

/// Matches headers to `specs`, failing with the list of required columns missing.
pub fn map_columns(headers: &StringRecord, specs: &[ColumnSpec]) -> Result<ColumnMap, ServiceError> {
    let normalised: Vec<String> = headers.iter().map(normalise_header).collect();
    let mut map = ColumnMap::default();
    for spec in specs {
        let found = spec
            .aliases
            .iter()
            .find_map(|alias| normalised.iter().position(|h| h == alias));
        if let Some(idx) = found {
            map.positions.insert(spec.key, idx);
        }
    }

    let missing: Vec<&str> = specs
        .iter()
        .filter(|spec| spec.required && !map.has(spec.key))
        .map(|spec| spec.key)
        .collect();
    if !missing.is_empty() {
        return Err(ServiceError::ValidationError(format!(
            "missing required columns: {}. Check that the file matches this upload.",
            missing.join(", ")
        )));
    }
    Ok(map)
}

/// Accepts CSV by extension or content type.
pub fn ensure_csv(file_name: Option<&str>, content_type: Option<&str>) -> Result<(), ServiceError> {
    let named_csv = file_name
        .map(|name| name.to_ascii_lowercase().ends_with(".csv"))
        .unwrap_or(false);
    let content_type = content_type
        .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase())
        .unwrap_or_default();

    let accepted = match content_type.as_str() {
        "text/csv" => true,
        "application/vnd.ms-excel" | "application/octet-stream" | "text/plain" | "" => named_csv,
        _ => false,
    };
    if accepted {
        return Ok(());
    }
    Err(ServiceError::UnsupportedMedia(format!(
        "Unsupported file type {}; please upload a CSV file",
        file_name.unwrap_or(if content_type.is_empty() {
            "(unknown)"
        } else {
            content_type.as_str()
        })
    )))
}

/// Decimal cell, tolerating thousands separators.
pub fn parse_decimal(raw: &str) -> Result<Decimal, String> {
    let cleaned: String = raw.chars().filter(|c| *c != ',' && *c != ' ').collect();
    Decimal::from_str(&cleaned).map_err(|_| format!("'{}' is not a number", raw))
}

/// `YYYY-MM-DD` or `DD/MM/YYYY`.
pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .map_err(|_| format!("'{}' is not a date (use YYYY-MM-DD)", raw))
}

fn reader(bytes: &[u8]) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes)
}

fn line_of(record: &StringRecord, fallback: u64) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(fallback)
}

fn headers(rdr: &mut csv::Reader<&[u8]>) -> Result<StringRecord, ServiceError> {
    let headers = rdr
        .headers()
        .map_err(|e| ServiceError::ValidationError(format!("could not read CSV header: {}", e)))?
        .clone();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(ServiceError::ValidationError("the file is empty".into()));
    }
    Ok(headers)
}

/// One parsed enquiry line before grouping.
#[derive(Debug, Clone)]
struct EnquiryRow {
    line: u64,
    buyer: String,
    subject: Option<String>,
    currency: Option<String>,
    required_by: Option<NaiveDate>,
    source: Option<String>,
    notes: Option<String>,
    item: LineItemInput,
}

fn parse_enquiry_row(map: &ColumnMap, record: &StringRecord, line: u64) -> Result<EnquiryRow, String> {
    let buyer = map.owned(record, "buyer").ok_or("buyer is required")?;
    let description = map.owned(record, "product").ok_or("product is required")?;
    let quantity = parse_decimal(map.get(record, "quantity").ok_or("quantity is required")?)?;
    let unit_price = map
        .get(record, "target_price")
        .map(parse_decimal)
        .transpose()?
        .unwrap_or(Decimal::ZERO);
    let hsn_code = map.owned(record, "hsn_code");
    if let Some(code) = &hsn_code {
        crate::services::line_items::validate_hsn_code(code)
            .map_err(|_| format!("'{}' is not a valid HSN code", code))?;
    }
    let required_by = map.get(record, "required_by").map(parse_date).transpose()?;

    let item = LineItemInput {
        product_id: None,
        sku_id: None,
        description,
        hsn_code,
        quantity,
        unit: map.owned(record, "unit").unwrap_or_else(|| "pcs".to_string()),
        unit_price,
        discount_percent: Decimal::ZERO,
        tax_percent: Decimal::ZERO,
    };
    pricing::validate_line(&item.pricing_input())?;

    Ok(EnquiryRow {
        line,
        buyer,
        subject: map.owned(record, "subject"),
        currency: map.owned(record, "currency").map(|c| c.to_ascii_uppercase()),
        required_by,
        source: map.owned(record, "source"),
        notes: map.owned(record, "notes"),
        item,
    })
}

#[derive(Clone)]
pub struct BulkUploadService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
    entities: BusinessEntityService,
    products: ProductService,
    enquiries: EnquiryService,
}

impl BulkUploadService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: EventSender,
        entities: BusinessEntityService,
        products: ProductService,
        enquiries: EnquiryService,
    ) -> Self {
        Self {
            db,
            event_sender,
            entities,
            products,
            enquiries,
        }
    }

    /// Checks the file type, then loads `bytes` into `target`.
    #[instrument(skip(self, bytes), fields(target = %target, size = bytes.len()))]
    pub async fn upload(
        &self,
        target: UploadTarget,
        file_name: Option<&str>,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<UploadSummary, ServiceError> {
        ensure_csv(file_name, content_type)?;
        let summary = match target {
            UploadTarget::Entities => self.load_entities(bytes).await?,
            UploadTarget::Products => self.load_products(bytes).await?,
            UploadTarget::Enquiries => self.load_enquiries(bytes).await?,
        };

        info!(
            inserted = summary.inserted,
            skipped = summary.skipped,
            "Bulk upload finished"
        );
        self.event_sender
            .publish(Event::BulkUploadCompleted {
                target: target.to_string(),
                inserted: summary.inserted,
                skipped: summary.skipped,
                finished_at: Utc::now(),
            })
            .await;
        Ok(summary)
    }

    async fn load_entities(&self, bytes: &[u8]) -> Result<UploadSummary, ServiceError> {
        let mut rdr = reader(bytes);
        let map = map_columns(&headers(&mut rdr)?, ENTITY_COLUMNS)?;
        let mut summary = UploadSummary::new(UploadTarget::Entities);

        let mut known: HashMap<(String, EntityType), Uuid> = business_entity::Entity::find()
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|e| ((e.name.to_lowercase(), e.entity_type), e.id))
            .collect();

        for (idx, result) in rdr.records().enumerate() {
            let fallback = idx as u64 + 2;
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    summary.reject(fallback, format!("unreadable row: {}", e));
                    continue;
                }
            };
            let line = line_of(&record, fallback);

            let entity_type = match map.get(&record, "entity_type") {
                Some(raw) => match EntityType::from_str(raw) {
                    Ok(t) => t,
                    Err(_) => {
                        summary.reject(line, format!("unknown entity type '{}'", raw));
                        continue;
                    }
                },
                None => EntityType::Buyer,
            };
            let Some(name) = map.owned(&record, "name") else {
                summary.reject(line, "name is required");
                continue;
            };
            let key = (name.to_lowercase(), entity_type);
            if known.contains_key(&key) {
                summary.reject(line, format!("{} '{}' already exists", entity_type, name));
                continue;
            }

            let input = BusinessEntityInput {
                name,
                entity_type,
                contact_person: map.owned(&record, "contact_person"),
                email: map.owned(&record, "email"),
                phone: map.owned(&record, "phone"),
                address: map.owned(&record, "address"),
                city: map.owned(&record, "city"),
                country: map.owned(&record, "country"),
                tax_id: map.owned(&record, "tax_id"),
                iec_code: map.owned(&record, "iec_code"),
                is_active: true,
            };
            match self.entities.create(input).await {
                Ok(entity) => {
                    known.insert(key, entity.id);
                    summary.accept(entity.id);
                }
                Err(ServiceError::DatabaseError(e)) => return Err(ServiceError::DatabaseError(e)),
                Err(e) => summary.reject(line, e.to_string()),
            }
        }
        Ok(summary)
    }

    async fn load_products(&self, bytes: &[u8]) -> Result<UploadSummary, ServiceError> {
        let mut rdr = reader(bytes);
        let map = map_columns(&headers(&mut rdr)?, PRODUCT_COLUMNS)?;
        let mut summary = UploadSummary::new(UploadTarget::Products);

        let mut known: HashMap<String, Uuid> = product::Entity::find()
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|p| (p.name.to_lowercase(), p.id))
            .collect();

        for (idx, result) in rdr.records().enumerate() {
            let fallback = idx as u64 + 2;
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    summary.reject(fallback, format!("unreadable row: {}", e));
                    continue;
                }
            };
            let line = line_of(&record, fallback);

            let Some(name) = map.owned(&record, "name") else {
                summary.reject(line, "name is required");
                continue;
            };
            if known.contains_key(&name.to_lowercase()) {
                summary.reject(line, format!("product '{}' already exists", name));
                continue;
            }
            let default_price = match map.get(&record, "default_price").map(parse_decimal) {
                Some(Ok(price)) => price,
                Some(Err(message)) => {
                    summary.reject(line, message);
                    continue;
                }
                None => Decimal::ZERO,
            };

            let input = ProductInput {
                name: name.clone(),
                description: map.owned(&record, "description"),
                hsn_code: map.owned(&record, "hsn_code"),
                unit: map.owned(&record, "unit").unwrap_or_else(|| "pcs".to_string()),
                default_price,
                currency: map.owned(&record, "currency").map(|c| c.to_ascii_uppercase()),
                is_active: true,
            };
            match self.products.create(input).await {
                Ok(product) => {
                    known.insert(name.to_lowercase(), product.id);
                    summary.accept(product.id);
                }
                Err(ServiceError::DatabaseError(e)) => return Err(ServiceError::DatabaseError(e)),
                Err(e) => summary.reject(line, e.to_string()),
            }
        }
        Ok(summary)
    }

    /// Rows sharing an `enquiry_ref` become one enquiry; rows without one stand alone.
    async fn load_enquiries(&self, bytes: &[u8]) -> Result<UploadSummary, ServiceError> {
        let mut rdr = reader(bytes);
        let map = map_columns(&headers(&mut rdr)?, ENQUIRY_COLUMNS)?;
        let mut summary = UploadSummary::new(UploadTarget::Enquiries);

        let mut groups: Vec<Vec<EnquiryRow>> = Vec::new();
        let mut by_ref: HashMap<String, usize> = HashMap::new();
        for (idx, result) in rdr.records().enumerate() {
            let fallback = idx as u64 + 2;
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    summary.reject(fallback, format!("unreadable row: {}", e));
                    continue;
                }
            };
            let line = line_of(&record, fallback);
            let row = match parse_enquiry_row(&map, &record, line) {
                Ok(row) => row,
                Err(message) => {
                    summary.reject(line, message);
                    continue;
                }
            };
            match map.owned(&record, "enquiry_ref") {
                Some(reference) => {
                    let slot = *by_ref.entry(reference).or_insert_with(|| {
                        groups.push(Vec::new());
                        groups.len() - 1
                    });
                    groups[slot].push(row);
                }
                None => groups.push(vec![row]),
            }
        }

        let products = product::Entity::find().all(&*self.db).await?;
        let mut buyers: HashMap<String, Uuid> = business_entity::Entity::find()
            .all(&*self.db)
            .await?
            .into_iter()
            .filter(|e| matches!(e.entity_type, EntityType::Buyer | EntityType::Partner))
            .map(|e| (e.name.to_lowercase(), e.id))
            .collect();

        for rows in groups {
            let Some(first) = rows.first().cloned() else {
                continue;
            };
            let buyer_id = match self.buyer_for(&first.buyer, &mut buyers).await {
                Ok(id) => id,
                Err(e) => {
                    for row in &rows {
                        summary.reject(row.line, e.to_string());
                    }
                    continue;
                }
            };

            let items: Vec<LineItemInput> = rows
                .iter()
                .map(|row| {
                    let mut item = row.item.clone();
                    item.product_id = match_product(&products, &item);
                    item
                })
                .collect();
            let subject = first.subject.clone().unwrap_or_else(|| {
                let names: Vec<&str> = items.iter().map(|i| i.description.as_str()).collect();
                truncate(&names.join(", "), 255)
            });

            let input = EnquiryInput {
                buyer_id,
                subject,
                source: first.source.clone().or_else(|| Some("csv upload".to_string())),
                document_date: None,
                required_by: first.required_by,
                currency: first.currency.clone(),
                exchange_rate: None,
                notes: first.notes.clone(),
                terms: None,
                created_by: None,
                items,
            };
            match self.enquiries.create(input).await {
                Ok(detail) => {
                    summary.created_ids.push(detail.document.id);
                    summary.inserted += rows.len();
                }
                Err(ServiceError::DatabaseError(e)) => return Err(ServiceError::DatabaseError(e)),
                Err(e) => {
                    for row in &rows {
                        summary.reject(row.line, e.to_string());
                    }
                }
            }
        }
        Ok(summary)
    }

    async fn buyer_for(
        &self,
        name: &str,
        buyers: &mut HashMap<String, Uuid>,
    ) -> Result<Uuid, ServiceError> {
        if let Some(id) = buyers.get(&name.to_lowercase()) {
            return Ok(*id);
        }
        let created = self
            .entities
            .create(BusinessEntityInput {
                name: name.to_string(),
                entity_type: EntityType::Buyer,
                contact_person: None,
                email: None,
                phone: None,
                address: None,
                city: None,
                country: None,
                tax_id: None,
                iec_code: None,
                is_active: true,
            })
            .await?;
        warn!(buyer = %created.name, "Created buyer from enquiry upload");
        buyers.insert(name.to_lowercase(), created.id);
        Ok(created.id)
    }
}

/// Links a line to a product by exact name, then by HSN code.
fn match_product(products: &[product::Model], item: &LineItemInput) -> Option<Uuid> {
    let wanted = item.description.to_lowercase();
    products
        .iter()
        .find(|p| p.name.to_lowercase() == wanted)
        .or_else(|| {
            let hsn = item.hsn_code.as_deref()?;
            products.iter().find(|p| p.hsn_code.as_deref() == Some(hsn))
        })
        .map(|p| p.id)
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    fn record(fields: &[&str]) -> StringRecord {
        StringRecord::from(fields.to_vec())
    }

    #[test]
    fn headers_are_normalised() {
        assert_eq!(normalise_header(" Company Name "), "company_name");
        assert_eq!(normalise_header("\u{feff}HSN-Code"), "hsn_code");
    }

    #[test]
    fn aliases_map_onto_columns() {
        let map = map_columns(&record(&["Company", "E-mail", "Type"]), ENTITY_COLUMNS).unwrap();
        let row = record(&["Acme Imports", "buy@acme.test", "buyer"]);
        assert_eq!(map.get(&row, "name"), Some("Acme Imports"));
        assert_eq!(map.get(&row, "email"), Some("buy@acme.test"));
        assert_eq!(map.get(&row, "entity_type"), Some("buyer"));
        assert_eq!(map.get(&row, "phone"), None);
    }

    #[test]
    fn wrong_file_reports_missing_columns() {
        let err = map_columns(&record(&["Company", "Country"]), ENQUIRY_COLUMNS).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("product"));
        assert!(message.contains("quantity"));
        assert!(!message.contains("buyer"));
    }

    #[test]
    fn only_csv_files_are_accepted() {
        assert!(ensure_csv(Some("buyers.csv"), Some("text/csv")).is_ok());
        assert!(ensure_csv(Some("buyers.CSV"), Some("application/vnd.ms-excel")).is_ok());
        assert!(ensure_csv(None, Some("text/csv; charset=utf-8")).is_ok());
        assert_matches!(
            ensure_csv(Some("buyers.xlsx"), Some("application/vnd.ms-excel")),
            Err(ServiceError::UnsupportedMedia(message)) if message.contains("please upload a CSV file")
        );
        assert!(ensure_csv(Some("scan.pdf"), Some("application/pdf")).is_err());
    }

    #[test]
    fn numbers_and_dates_are_parsed_leniently() {
        assert_eq!(parse_decimal("1,250.50").unwrap(), dec!(1250.50));
        assert!(parse_decimal("abc").is_err());
        assert_eq!(
            parse_date("31/01/2026").unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 31).unwrap()
        );
    }

    #[test]
    fn enquiry_rows_validate_quantity() {
        let map = map_columns(&record(&["Buyer", "Item", "Qty"]), ENQUIRY_COLUMNS).unwrap();
        assert!(parse_enquiry_row(&map, &record(&["Acme", "Socks", "0"]), 2).is_err());
        assert!(parse_enquiry_row(&map, &record(&["Acme", "Socks", "2000000000"]), 2).is_err());
        let row = parse_enquiry_row(&map, &record(&["Acme", "Socks", "1,000"]), 3).unwrap();
        assert_eq!(row.item.quantity, dec!(1000));
        assert_eq!(row.item.unit, "pcs");
        assert_eq!(row.line, 3);
    }

    #[test]
    fn products_match_by_name_then_hsn() {
        let now = Utc::now();
        let product = product::Model {
            id: Uuid::new_v4(),
            name: "Cotton Socks".into(),
            description: None,
            hsn_code: Some("6115".into()),
            unit: "pairs".into(),
            default_price: dec!(1.2),
            currency: "USD".into(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let mut item = LineItemInput {
            product_id: None,
            sku_id: None,
            description: "cotton socks".into(),
            hsn_code: None,
            quantity: dec!(1),
            unit: "pcs".into(),
            unit_price: Decimal::ZERO,
            discount_percent: Decimal::ZERO,
            tax_percent: Decimal::ZERO,
        };
        let products = vec![product.clone()];
        assert_eq!(match_product(&products, &item), Some(product.id));
        item.description = "Ankle socks".into();
        assert_eq!(match_product(&products, &item), None);
        item.hsn_code = Some("6115".into());
        assert_eq!(match_product(&products, &item), Some(product.id));
    }
}
