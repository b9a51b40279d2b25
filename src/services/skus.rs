use std::sync::Arc;

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::{product, sku},
    errors::ServiceError,
    services::documents::{self, validate_non_negative},
};

/// Upper case letters and digits, optionally joined by `-`, `.` or `/`.
static SKU_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9]+(?:[-./][A-Z0-9]+)*$").unwrap());

pub fn is_valid_sku_code(code: &str) -> bool {
    SKU_CODE_RE.is_match(code)
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct SkuInput {
    pub product_id: Uuid,
    #[validate(length(min = 1, max = 64))]
    pub code: String,
    pub description: Option<String>,
    #[serde(default)]
    #[validate(custom = "validate_non_negative")]
    pub unit_price: Decimal,
    #[validate(custom = "validate_non_negative")]
    pub net_weight: Option<Decimal>,
    #[validate(custom = "validate_non_negative")]
    pub gross_weight: Option<Decimal>,
    #[validate(length(max = 50))]
    pub package_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, IntoParams)]
pub struct SkuFilter {
    pub product_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct SkuService {
    db: Arc<DatabaseConnection>,
}

impl SkuService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    fn check_input(input: &SkuInput) -> Result<String, ServiceError> {
        input.validate()?;
        if let (Some(net), Some(gross)) = (input.net_weight, input.gross_weight) {
            if gross < net {
                return Err(ServiceError::ValidationError(
                    "gross weight cannot be below net weight".into(),
                ));
            }
        }
        let code = input.code.trim().to_ascii_uppercase();
        if !is_valid_sku_code(&code) {
            return Err(ServiceError::ValidationError(format!(
                "'{}' is not a valid SKU code; use letters and digits separated by '-', '.' or '/'",
                input.code
            )));
        }
        Ok(code)
    }

    async fn ensure_product(&self, product_id: Uuid) -> Result<(), ServiceError> {
        product::Entity::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::ValidationError(format!("product {} does not exist", product_id))
            })?;
        Ok(())
    }

    async fn ensure_code_free(&self, code: &str, except: Option<Uuid>) -> Result<(), ServiceError> {
        let existing = sku::Entity::find()
            .filter(sku::Column::Code.eq(code))
            .one(&*self.db)
            .await?;
        match existing {
            Some(found) if Some(found.id) != except => Err(ServiceError::Conflict(format!(
                "SKU code {} is already in use",
                code
            ))),
            _ => Ok(()),
        }
    }

    #[instrument(skip(self, input), fields(code = %input.code))]
    pub async fn create(&self, input: SkuInput) -> Result<sku::Model, ServiceError> {
        let code = Self::check_input(&input)?;
        self.ensure_product(input.product_id).await?;
        self.ensure_code_free(&code, None).await?;
        let now = Utc::now();

        let sku = sku::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(input.product_id),
            code: Set(code),
            description: Set(documents::clean(input.description)),
            unit_price: Set(input.unit_price),
            net_weight: Set(input.net_weight),
            gross_weight: Set(input.gross_weight),
            package_type: Set(documents::clean(input.package_type)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await
        .map_err(|e| {
            error!("Failed to insert SKU: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        info!(sku_id = %sku.id, product_id = %sku.product_id, "SKU created");
        Ok(sku)
    }

    pub async fn get(&self, id: Uuid) -> Result<sku::Model, ServiceError> {
        sku::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("SKU", id))
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: SkuFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<sku::Model>, u64), ServiceError> {
        let mut select = sku::Entity::find().order_by_asc(sku::Column::Code);
        if let Some(product_id) = filter.product_id {
            select = select.filter(sku::Column::ProductId.eq(product_id));
        }
        documents::fetch_page(&*self.db, select, page, per_page).await
    }

    pub async fn list_for_product(&self, product_id: Uuid) -> Result<Vec<sku::Model>, ServiceError> {
        let skus = sku::Entity::find()
            .filter(sku::Column::ProductId.eq(product_id))
            .order_by_asc(sku::Column::Code)
            .all(&*self.db)
            .await?;
        Ok(skus)
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, id: Uuid, input: SkuInput) -> Result<sku::Model, ServiceError> {
        let code = Self::check_input(&input)?;
        let existing = self.get(id).await?;
        if existing.product_id != input.product_id {
            self.ensure_product(input.product_id).await?;
        }
        self.ensure_code_free(&code, Some(id)).await?;

        let mut active: sku::ActiveModel = existing.into();
        active.product_id = Set(input.product_id);
        active.code = Set(code);
        active.description = Set(documents::clean(input.description));
        active.unit_price = Set(input.unit_price);
        active.net_weight = Set(input.net_weight);
        active.gross_weight = Set(input.gross_weight);
        active.package_type = Set(documents::clean(input.package_type));

        let sku = active.update(&*self.db).await.map_err(|e| {
            error!(sku_id = %id, "Failed to update SKU: {}", e);
            ServiceError::DatabaseError(e)
        })?;
        info!(sku_id = %id, "SKU updated");
        Ok(sku)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        self.get(id).await?;
        sku::Entity::delete_by_id(id).exec(&*self.db).await?;
        info!(sku_id = %id, "SKU deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("POP-40-WHT", true)]
    #[test_case("TWL.600/BLU", true)]
    #[test_case("A1", true)]
    #[test_case("POP--40", false)]
    #[test_case("-POP", false)]
    #[test_case("POP 40", false)]
    #[test_case("", false)]
    fn sku_codes(code: &str, valid: bool) {
        assert_eq!(is_valid_sku_code(code), valid);
    }

    #[test]
    fn codes_are_normalised_before_checking() {
        let input = SkuInput {
            product_id: Uuid::new_v4(),
            code: "  pop-40-wht ".to_string(),
            description: None,
            unit_price: Decimal::ONE,
            net_weight: Some(Decimal::new(95, 2)),
            gross_weight: Some(Decimal::ONE),
            package_type: None,
        };
        assert_eq!(SkuService::check_input(&input).unwrap(), "POP-40-WHT");

        let heavier_net = SkuInput {
            net_weight: Some(Decimal::TWO),
            ..input
        };
        assert!(SkuService::check_input(&heavier_net).is_err());
    }
}
