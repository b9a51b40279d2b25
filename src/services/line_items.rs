use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    entities::line_item,
    errors::ServiceError,
    pricing::{self, Charges, DocumentTotals, LineAmounts, LineInput},
    workflow::DocumentKind,
};

fn default_unit() -> String {
    "pcs".to_string()
}

/// HSN codes are 4 to 8 digits.
pub fn validate_hsn_code(code: &str) -> Result<(), ValidationError> {
    let code = code.trim();
    if (4..=8).contains(&code.len()) && code.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::new("hsn_code"))
    }
}

/// A line as submitted by clients; amounts are always computed server side.
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct LineItemInput {
    pub product_id: Option<Uuid>,
    pub sku_id: Option<Uuid>,
    #[validate(length(min = 1, max = 1000))]
    pub description: String,
    #[validate(custom = "validate_hsn_code")]
    pub hsn_code: Option<String>,
    pub quantity: Decimal,
    #[serde(default = "default_unit")]
    #[validate(length(min = 1, max = 16))]
    pub unit: String,
    #[serde(default)]
    pub unit_price: Decimal,
    #[serde(default)]
    pub discount_percent: Decimal,
    #[serde(default)]
    pub tax_percent: Decimal,
}

impl LineItemInput {
    pub fn pricing_input(&self) -> LineInput {
        LineInput {
            quantity: self.quantity,
            unit_price: self.unit_price,
            discount_percent: self.discount_percent,
            tax_percent: self.tax_percent,
        }
    }
}

impl From<&line_item::Model> for LineItemInput {
    fn from(item: &line_item::Model) -> Self {
        Self {
            product_id: item.product_id,
            sku_id: item.sku_id,
            description: item.description.clone(),
            hsn_code: item.hsn_code.clone(),
            quantity: item.quantity,
            unit: item.unit.clone(),
            unit_price: item.unit_price,
            discount_percent: item.discount_percent,
            tax_percent: item.tax_percent,
        }
    }
}

/// Validates every line and reports failures with their 1-based position.
pub fn validate_lines(items: &[LineItemInput], require_lines: bool) -> Result<(), ServiceError> {
    if require_lines && items.is_empty() {
        return Err(ServiceError::ValidationError(
            "at least one line item is required".to_string(),
        ));
    }

    let mut problems = Vec::new();
    for (index, item) in items.iter().enumerate() {
        let line_no = index + 1;
        if item.description.trim().is_empty() {
            problems.push(format!("line {}: description cannot be blank", line_no));
        }
        if let Err(e) = item.validate() {
            problems.push(format!("line {}: {}", line_no, e));
        }
        if let Err(msg) = pricing::validate_line(&item.pricing_input()) {
            problems.push(format!("line {}: {}", line_no, msg));
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::ValidationError(problems.join("; ")))
    }
}

/// Totals a document would carry with these lines and charges.
pub fn totals_for_inputs(items: &[LineItemInput], charges: Charges) -> DocumentTotals {
    let amounts: Vec<LineAmounts> = items
        .iter()
        .map(|item| pricing::compute_line(&item.pricing_input()))
        .collect();
    pricing::compute_totals(&amounts, charges)
}

/// Totals recomputed from stored lines.
pub fn totals_for_lines(items: &[line_item::Model], charges: Charges) -> DocumentTotals {
    let amounts: Vec<LineAmounts> = items.iter().map(line_item::Model::amounts).collect();
    pricing::compute_totals(&amounts, charges)
}

pub async fn load<C: ConnectionTrait>(
    conn: &C,
    kind: DocumentKind,
    document_id: Uuid,
) -> Result<Vec<line_item::Model>, ServiceError> {
    line_item::Entity::find()
        .filter(line_item::Column::DocumentKind.eq(kind))
        .filter(line_item::Column::DocumentId.eq(document_id))
        .order_by_asc(line_item::Column::LineNo)
        .all(conn)
        .await
        .map_err(|e| {
            error!(%kind, %document_id, "Failed to load line items: {}", e);
            ServiceError::DatabaseError(e)
        })
}

pub async fn delete_all<C: ConnectionTrait>(
    conn: &C,
    kind: DocumentKind,
    document_id: Uuid,
) -> Result<u64, ServiceError> {
    let result = line_item::Entity::delete_many()
        .filter(line_item::Column::DocumentKind.eq(kind))
        .filter(line_item::Column::DocumentId.eq(document_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

/// Writes `items` as the complete set of lines for a document, numbered from 1.
pub async fn replace<C: ConnectionTrait>(
    conn: &C,
    kind: DocumentKind,
    document_id: Uuid,
    items: &[LineItemInput],
) -> Result<Vec<line_item::Model>, ServiceError> {
    let removed = delete_all(conn, kind, document_id).await?;
    debug!(%kind, %document_id, removed, "replacing line items");

    let now = Utc::now();
    let mut saved = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let amounts = pricing::compute_line(&item.pricing_input());
        let line_no = i32::try_from(index + 1).map_err(|_| {
            ServiceError::ValidationError("too many line items".to_string())
        })?;
        let row = line_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            document_kind: Set(kind),
            document_id: Set(document_id),
            line_no: Set(line_no),
            product_id: Set(item.product_id),
            sku_id: Set(item.sku_id),
            description: Set(item.description.trim().to_string()),
            hsn_code: Set(item
                .hsn_code
                .as_ref()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())),
            quantity: Set(item.quantity),
            unit: Set(item.unit.trim().to_string()),
            unit_price: Set(item.unit_price),
            discount_percent: Set(item.discount_percent),
            tax_percent: Set(item.tax_percent),
            gross_amount: Set(amounts.gross_amount),
            discount_amount: Set(amounts.discount_amount),
            tax_amount: Set(amounts.tax_amount),
            amount: Set(amounts.amount),
            created_at: Set(now),
        }
        .insert(conn)
        .await
        .map_err(|e| {
            error!(%kind, %document_id, line_no, "Failed to insert line item: {}", e);
            ServiceError::DatabaseError(e)
        })?;
        saved.push(row);
    }
    Ok(saved)
}

/// Copies the lines of one document onto another with fresh ids and numbering.
pub async fn copy<C: ConnectionTrait>(
    conn: &C,
    from_kind: DocumentKind,
    from_id: Uuid,
    to_kind: DocumentKind,
    to_id: Uuid,
) -> Result<Vec<line_item::Model>, ServiceError> {
    let source = load(conn, from_kind, from_id).await?;
    let inputs: Vec<LineItemInput> = source.iter().map(LineItemInput::from).collect();
    replace(conn, to_kind, to_id, &inputs).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item(description: &str, quantity: Decimal, price: Decimal) -> LineItemInput {
        LineItemInput {
            product_id: None,
            sku_id: None,
            description: description.to_string(),
            hsn_code: Some("6109".into()),
            quantity,
            unit: "pcs".into(),
            unit_price: price,
            discount_percent: Decimal::ZERO,
            tax_percent: Decimal::ZERO,
        }
    }

    #[test]
    fn hsn_codes_must_be_four_to_eight_digits() {
        assert!(validate_hsn_code("6109").is_ok());
        assert!(validate_hsn_code("61091000").is_ok());
        assert!(validate_hsn_code("610").is_err());
        assert!(validate_hsn_code("610910001").is_err());
        assert!(validate_hsn_code("61A9").is_err());
    }

    #[test]
    fn empty_documents_are_rejected_when_lines_are_required() {
        assert!(validate_lines(&[], true).is_err());
        assert!(validate_lines(&[], false).is_ok());
    }

    #[test]
    fn failures_name_the_offending_line() {
        let lines = vec![
            item("Cotton T-shirts", dec!(100), dec!(4.5)),
            item("   ", dec!(0), dec!(1)),
        ];
        let err = validate_lines(&lines, true).unwrap_err().to_string();
        assert!(err.contains("line 2: description cannot be blank"));
        assert!(err.contains("line 2: quantity must be greater than zero"));
        assert!(!err.contains("line 1"));
    }

    #[test]
    fn input_totals_match_line_arithmetic() {
        let mut discounted = item("Denim", dec!(10), dec!(20));
        discounted.discount_percent = dec!(10);
        let totals = totals_for_inputs(
            &[item("Cotton", dec!(2), dec!(50)), discounted],
            Charges {
                freight: dec!(15),
                insurance: dec!(5),
            },
        );
        assert_eq!(totals.subtotal, dec!(300));
        assert_eq!(totals.discount_total, dec!(20));
        assert_eq!(totals.grand_total, dec!(300));
    }
}
