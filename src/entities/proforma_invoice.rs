use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::workflow::{DocumentKind, DocumentStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = ProformaInvoice)]
#[sea_orm(table_name = "proforma_invoices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub number: String,
    pub status: DocumentStatus,
    pub version: i32,
    pub buyer_id: Uuid,
    pub consignee_id: Option<Uuid>,
    /// Quote this invoice was raised from
    pub reference_id: Option<Uuid>,
    pub document_date: NaiveDate,
    pub valid_until: Option<NaiveDate>,
    pub currency: String,
    #[sea_orm(column_type = "Decimal(Some((19, 6)))")]
    pub exchange_rate: Decimal,
    pub port_of_loading: Option<String>,
    pub port_of_discharge: Option<String>,
    pub final_destination: Option<String>,
    pub incoterms: Option<String>,
    pub payment_terms: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub freight: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub insurance: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub subtotal: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub discount_total: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub tax_total: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub grand_total: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub base_grand_total: Decimal,
    pub notes: Option<String>,
    pub terms: Option<String>,
    pub converted_to_id: Option<Uuid>,
    pub status_reason: Option<String>,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_document_header!(Model, DocumentKind::ProformaInvoice, buyer_id, reference: reference_id, charges: freight);

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::business_entity::Entity",
        from = "Column::BuyerId",
        to = "super::business_entity::Column::Id"
    )]
    Buyer,
}

impl Related<super::business_entity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Buyer.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        self.updated_at = sea_orm::ActiveValue::Set(Utc::now());
        Ok(self)
    }
}
