use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::{
        business_entity::{self, EntityType},
        enquiry, export_order, proforma_invoice, purchase_order, quote, shipping_bill,
    },
    errors::ServiceError,
    services::documents,
};

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct BusinessEntityInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub entity_type: EntityType,
    #[validate(length(max = 100))]
    pub contact_person: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    #[validate(length(max = 1000))]
    pub address: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 100))]
    pub country: Option<String>,
    #[validate(length(max = 50))]
    pub tax_id: Option<String>,
    #[validate(length(max = 20))]
    pub iec_code: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, IntoParams)]
pub struct EntityFilter {
    pub entity_type: Option<EntityType>,
    /// Case-insensitive match on the name
    pub search: Option<String>,
    pub active: Option<bool>,
}

#[derive(Clone)]
pub struct BusinessEntityService {
    db: Arc<DatabaseConnection>,
}

impl BusinessEntityService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(
        &self,
        input: BusinessEntityInput,
    ) -> Result<business_entity::Model, ServiceError> {
        input.validate()?;
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(ServiceError::ValidationError("name is required".into()));
        }
        let now = Utc::now();

        let entity = business_entity::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            entity_type: Set(input.entity_type),
            contact_person: Set(documents::clean(input.contact_person)),
            email: Set(documents::clean(input.email)),
            phone: Set(documents::clean(input.phone)),
            address: Set(documents::clean(input.address)),
            city: Set(documents::clean(input.city)),
            country: Set(documents::clean(input.country)),
            tax_id: Set(documents::clean(input.tax_id)),
            iec_code: Set(documents::clean(input.iec_code)),
            is_active: Set(input.is_active),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await
        .map_err(|e| {
            error!("Failed to insert business entity: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        info!(entity_id = %entity.id, entity_type = %entity.entity_type, "Business entity created");
        Ok(entity)
    }

    pub async fn get(&self, id: Uuid) -> Result<business_entity::Model, ServiceError> {
        business_entity::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Business entity", id))
    }

    /// Alphabetical by name.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: EntityFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<business_entity::Model>, u64), ServiceError> {
        let mut select =
            business_entity::Entity::find().order_by_asc(business_entity::Column::Name);
        if let Some(entity_type) = filter.entity_type {
            select = select.filter(business_entity::Column::EntityType.eq(entity_type));
        }
        if let Some(active) = filter.active {
            select = select.filter(business_entity::Column::IsActive.eq(active));
        }
        if let Some(search) = documents::clean(filter.search) {
            select = select.filter(business_entity::Column::Name.contains(search.as_str()));
        }
        documents::fetch_page(&*self.db, select, page, per_page).await
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: Uuid,
        input: BusinessEntityInput,
    ) -> Result<business_entity::Model, ServiceError> {
        input.validate()?;
        let existing = self.get(id).await?;

        let mut active: business_entity::ActiveModel = existing.into();
        active.name = Set(input.name.trim().to_string());
        active.entity_type = Set(input.entity_type);
        active.contact_person = Set(documents::clean(input.contact_person));
        active.email = Set(documents::clean(input.email));
        active.phone = Set(documents::clean(input.phone));
        active.address = Set(documents::clean(input.address));
        active.city = Set(documents::clean(input.city));
        active.country = Set(documents::clean(input.country));
        active.tax_id = Set(documents::clean(input.tax_id));
        active.iec_code = Set(documents::clean(input.iec_code));
        active.is_active = Set(input.is_active);

        let entity = active.update(&*self.db).await.map_err(|e| {
            error!(entity_id = %id, "Failed to update business entity: {}", e);
            ServiceError::DatabaseError(e)
        })?;
        info!(entity_id = %id, "Business entity updated");
        Ok(entity)
    }

    /// Entities still named on a document are deactivated rather than removed.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.get(id).await?;
        if is_referenced(&*self.db, id).await? {
            return Err(ServiceError::Conflict(format!(
                "{} is used on existing documents; deactivate it instead",
                existing.name
            )));
        }
        business_entity::Entity::delete_by_id(id)
            .exec(&*self.db)
            .await?;
        info!(entity_id = %id, "Business entity deleted");
        Ok(())
    }
}

async fn is_referenced<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<bool, ServiceError> {
    let counts = [
        enquiry::Entity::find()
            .filter(enquiry::Column::BuyerId.eq(id))
            .count(conn)
            .await?,
        quote::Entity::find()
            .filter(quote::Column::BuyerId.eq(id))
            .count(conn)
            .await?,
        proforma_invoice::Entity::find()
            .filter(
                proforma_invoice::Column::BuyerId
                    .eq(id)
                    .or(proforma_invoice::Column::ConsigneeId.eq(id)),
            )
            .count(conn)
            .await?,
        export_order::Entity::find()
            .filter(
                export_order::Column::BuyerId
                    .eq(id)
                    .or(export_order::Column::ConsigneeId.eq(id)),
            )
            .count(conn)
            .await?,
        purchase_order::Entity::find()
            .filter(purchase_order::Column::SupplierId.eq(id))
            .count(conn)
            .await?,
        shipping_bill::Entity::find()
            .filter(
                shipping_bill::Column::BuyerId
                    .eq(id)
                    .or(shipping_bill::Column::ConsigneeId.eq(id)),
            )
            .count(conn)
            .await?,
    ];
    Ok(counts.iter().any(|count| *count > 0))
}
