use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::{product, sku},
    errors::ServiceError,
    pricing::currency::validate_currency_code,
    services::{
        documents::{self, validate_non_negative},
        line_items::validate_hsn_code,
    },
};

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct ProductInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub description: Option<String>,
    #[validate(custom = "validate_hsn_code")]
    pub hsn_code: Option<String>,
    #[serde(default = "default_unit")]
    #[validate(length(min = 1, max = 16))]
    pub unit: String,
    #[serde(default)]
    #[validate(custom = "validate_non_negative")]
    pub default_price: Decimal,
    /// Defaults to the configured document currency
    #[validate(custom = "validate_currency_code")]
    pub currency: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_unit() -> String {
    "pcs".to_string()
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, IntoParams)]
pub struct ProductFilter {
    /// Matches name or HSN code
    pub search: Option<String>,
    pub active: Option<bool>,
}

#[derive(Clone)]
pub struct ProductService {
    db: Arc<DatabaseConnection>,
    default_currency: String,
}

impl ProductService {
    pub fn new(db: Arc<DatabaseConnection>, default_currency: impl Into<String>) -> Self {
        Self {
            db,
            default_currency: default_currency.into(),
        }
    }

    fn currency(&self, currency: Option<String>) -> String {
        documents::clean(currency)
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or_else(|| self.default_currency.clone())
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: ProductInput) -> Result<product::Model, ServiceError> {
        input.validate()?;
        let now = Utc::now();

        let product = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name.trim().to_string()),
            description: Set(documents::clean(input.description)),
            hsn_code: Set(documents::clean(input.hsn_code)),
            unit: Set(input.unit.trim().to_string()),
            default_price: Set(input.default_price),
            currency: Set(self.currency(input.currency)),
            is_active: Set(input.is_active),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await
        .map_err(|e| {
            error!("Failed to insert product: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        info!(product_id = %product.id, "Product created");
        Ok(product)
    }

    pub async fn get(&self, id: Uuid) -> Result<product::Model, ServiceError> {
        product::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Product", id))
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: ProductFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<product::Model>, u64), ServiceError> {
        let mut select = product::Entity::find().order_by_asc(product::Column::Name);
        if let Some(active) = filter.active {
            select = select.filter(product::Column::IsActive.eq(active));
        }
        if let Some(search) = documents::clean(filter.search) {
            select = select.filter(
                Condition::any()
                    .add(product::Column::Name.contains(search.as_str()))
                    .add(product::Column::HsnCode.starts_with(search.as_str())),
            );
        }
        documents::fetch_page(&*self.db, select, page, per_page).await
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: Uuid,
        input: ProductInput,
    ) -> Result<product::Model, ServiceError> {
        input.validate()?;
        let existing = self.get(id).await?;

        let mut active: product::ActiveModel = existing.into();
        active.name = Set(input.name.trim().to_string());
        active.description = Set(documents::clean(input.description));
        active.hsn_code = Set(documents::clean(input.hsn_code));
        active.unit = Set(input.unit.trim().to_string());
        active.default_price = Set(input.default_price);
        active.currency = Set(self.currency(input.currency));
        active.is_active = Set(input.is_active);

        let product = active.update(&*self.db).await.map_err(|e| {
            error!(product_id = %id, "Failed to update product: {}", e);
            ServiceError::DatabaseError(e)
        })?;
        info!(product_id = %id, "Product updated");
        Ok(product)
    }

    /// Products with SKUs must lose their SKUs first.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.get(id).await?;
        let skus = sku::Entity::find()
            .filter(sku::Column::ProductId.eq(id))
            .count(&*self.db)
            .await?;
        if skus > 0 {
            return Err(ServiceError::Conflict(format!(
                "{} still has {} SKU(s)",
                existing.name, skus
            )));
        }
        product::Entity::delete_by_id(id).exec(&*self.db).await?;
        info!(product_id = %id, "Product deleted");
        Ok(())
    }
}
