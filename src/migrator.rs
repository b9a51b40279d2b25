use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260101_000001_create_master_data::Migration),
            Box::new(m20260101_000002_create_document_tables::Migration),
            Box::new(m20260101_000003_create_line_items_table::Migration),
            Box::new(m20260101_000004_create_workflow_tables::Migration),
            Box::new(m20260101_000005_create_payments_and_attachments::Migration),
        ]
    }
}

/// Column helpers shared by the migrations below.
mod columns {
    use sea_orm_migration::prelude::*;

    pub fn money<T: IntoIden>(name: T) -> ColumnDef {
        ColumnDef::new(name)
            .decimal_len(16, 4)
            .not_null()
            .default(0)
            .to_owned()
    }

    pub fn rate<T: IntoIden>(name: T) -> ColumnDef {
        ColumnDef::new(name)
            .decimal_len(16, 6)
            .not_null()
            .default(1)
            .to_owned()
    }

    pub fn percent<T: IntoIden>(name: T) -> ColumnDef {
        ColumnDef::new(name)
            .decimal_len(7, 4)
            .not_null()
            .default(0)
            .to_owned()
    }

    pub fn kind<T: IntoIden>(name: T) -> ColumnDef {
        ColumnDef::new(name).string_len(24).not_null().to_owned()
    }

    pub fn timestamp<T: IntoIden>(name: T) -> ColumnDef {
        ColumnDef::new(name)
            .timestamp_with_time_zone()
            .not_null()
            .to_owned()
    }
}

mod m20260101_000001_create_master_data {
    use super::columns;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260101_000001_create_master_data"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(BusinessEntities::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(BusinessEntities::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(BusinessEntities::Name).string().not_null())
                        .col(
                            ColumnDef::new(BusinessEntities::EntityType)
                                .string_len(20)
                                .not_null(),
                        )
                        .col(ColumnDef::new(BusinessEntities::ContactPerson).string().null())
                        .col(ColumnDef::new(BusinessEntities::Email).string().null())
                        .col(ColumnDef::new(BusinessEntities::Phone).string().null())
                        .col(ColumnDef::new(BusinessEntities::Address).text().null())
                        .col(ColumnDef::new(BusinessEntities::City).string().null())
                        .col(ColumnDef::new(BusinessEntities::Country).string().null())
                        .col(ColumnDef::new(BusinessEntities::TaxId).string().null())
                        .col(ColumnDef::new(BusinessEntities::IecCode).string().null())
                        .col(
                            ColumnDef::new(BusinessEntities::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(columns::timestamp(BusinessEntities::CreatedAt))
                        .col(columns::timestamp(BusinessEntities::UpdatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_business_entities_name")
                        .table(BusinessEntities::Table)
                        .col(BusinessEntities::Name)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Products::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Products::Name).string().not_null())
                        .col(ColumnDef::new(Products::Description).text().null())
                        .col(ColumnDef::new(Products::HsnCode).string_len(8).null())
                        .col(ColumnDef::new(Products::Unit).string_len(16).not_null())
                        .col(columns::money(Products::DefaultPrice))
                        .col(ColumnDef::new(Products::Currency).string_len(3).not_null())
                        .col(
                            ColumnDef::new(Products::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(columns::timestamp(Products::CreatedAt))
                        .col(columns::timestamp(Products::UpdatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_products_hsn_code")
                        .table(Products::Table)
                        .col(Products::HsnCode)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Skus::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Skus::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Skus::ProductId).uuid().not_null())
                        .col(
                            ColumnDef::new(Skus::Code)
                                .string_len(64)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Skus::Description).text().null())
                        .col(columns::money(Skus::UnitPrice))
                        .col(ColumnDef::new(Skus::NetWeight).decimal_len(16, 4).null())
                        .col(ColumnDef::new(Skus::GrossWeight).decimal_len(16, 4).null())
                        .col(ColumnDef::new(Skus::PackageType).string().null())
                        .col(columns::timestamp(Skus::CreatedAt))
                        .col(columns::timestamp(Skus::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_skus_product_id")
                                .from(Skus::Table, Skus::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_skus_product_id")
                        .table(Skus::Table)
                        .col(Skus::ProductId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Skus::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(BusinessEntities::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum BusinessEntities {
        Table,
        Id,
        Name,
        EntityType,
        ContactPerson,
        Email,
        Phone,
        Address,
        City,
        Country,
        TaxId,
        IecCode,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Products {
        Table,
        Id,
        Name,
        Description,
        HsnCode,
        Unit,
        DefaultPrice,
        Currency,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Skus {
        Table,
        Id,
        ProductId,
        Code,
        Description,
        UnitPrice,
        NetWeight,
        GrossWeight,
        PackageType,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20260101_000002_create_document_tables {
    use super::columns;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260101_000002_create_document_tables"
        }
    }

    /// Header columns every document table carries.
    fn header_table<T: IntoIden + Copy + 'static>(table: T, party: Doc) -> TableCreateStatement {
        Table::create()
            .table(table)
            .if_not_exists()
            .col(ColumnDef::new(Doc::Id).uuid().primary_key().not_null())
            .col(
                ColumnDef::new(Doc::Number)
                    .string_len(32)
                    .not_null()
                    .unique_key(),
            )
            .col(columns::kind(Doc::Status))
            .col(ColumnDef::new(Doc::Version).integer().not_null().default(1))
            .col(ColumnDef::new(party).uuid().not_null())
            .col(ColumnDef::new(Doc::DocumentDate).date().not_null())
            .col(ColumnDef::new(Doc::Currency).string_len(3).not_null())
            .col(columns::rate(Doc::ExchangeRate))
            .col(columns::money(Doc::Subtotal))
            .col(columns::money(Doc::DiscountTotal))
            .col(columns::money(Doc::TaxTotal))
            .col(columns::money(Doc::GrandTotal))
            .col(columns::money(Doc::BaseGrandTotal))
            .col(ColumnDef::new(Doc::Notes).text().null())
            .col(ColumnDef::new(Doc::Terms).text().null())
            .col(ColumnDef::new(Doc::StatusReason).text().null())
            .col(ColumnDef::new(Doc::ApprovedBy).string().null())
            .col(
                ColumnDef::new(Doc::ApprovedAt)
                    .timestamp_with_time_zone()
                    .null(),
            )
            .col(ColumnDef::new(Doc::CreatedBy).string().null())
            .col(columns::timestamp(Doc::CreatedAt))
            .col(columns::timestamp(Doc::UpdatedAt))
            .to_owned()
    }

    fn index_on<T: IntoIden + Copy + 'static>(name: &str, table: T, col: Doc) -> IndexCreateStatement {
        Index::create()
            .if_not_exists()
            .name(name)
            .table(table)
            .col(col)
            .to_owned()
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    header_table(Enquiries::Table, Doc::BuyerId)
                        .col(ColumnDef::new(Doc::Subject).string().not_null())
                        .col(ColumnDef::new(Doc::Source).string().null())
                        .col(ColumnDef::new(Doc::RequiredBy).date().null())
                        .col(ColumnDef::new(Doc::ConvertedToId).uuid().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    header_table(Quotes::Table, Doc::BuyerId)
                        .col(ColumnDef::new(Doc::ReferenceId).uuid().null())
                        .col(ColumnDef::new(Doc::ValidUntil).date().null())
                        .col(ColumnDef::new(Doc::Incoterms).string_len(16).null())
                        .col(ColumnDef::new(Doc::PaymentTerms).string().null())
                        .col(ColumnDef::new(Doc::DeliveryTerms).string().null())
                        .col(
                            ColumnDef::new(Doc::ApprovalRequired)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Doc::ConvertedToId).uuid().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    header_table(ProformaInvoices::Table, Doc::BuyerId)
                        .col(ColumnDef::new(Doc::ConsigneeId).uuid().null())
                        .col(ColumnDef::new(Doc::ReferenceId).uuid().null())
                        .col(ColumnDef::new(Doc::ValidUntil).date().null())
                        .col(ColumnDef::new(Doc::PortOfLoading).string().null())
                        .col(ColumnDef::new(Doc::PortOfDischarge).string().null())
                        .col(ColumnDef::new(Doc::FinalDestination).string().null())
                        .col(ColumnDef::new(Doc::Incoterms).string_len(16).null())
                        .col(ColumnDef::new(Doc::PaymentTerms).string().null())
                        .col(columns::money(Doc::Freight))
                        .col(columns::money(Doc::Insurance))
                        .col(ColumnDef::new(Doc::ConvertedToId).uuid().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    header_table(ExportOrders::Table, Doc::BuyerId)
                        .col(ColumnDef::new(Doc::ConsigneeId).uuid().null())
                        .col(ColumnDef::new(Doc::ReferenceId).uuid().null())
                        .col(ColumnDef::new(Doc::BuyerPoNumber).string().null())
                        .col(ColumnDef::new(Doc::ExpectedShipDate).date().null())
                        .col(ColumnDef::new(Doc::ShippedOn).date().null())
                        .col(ColumnDef::new(Doc::PortOfLoading).string().null())
                        .col(ColumnDef::new(Doc::PortOfDischarge).string().null())
                        .col(ColumnDef::new(Doc::FinalDestination).string().null())
                        .col(ColumnDef::new(Doc::Incoterms).string_len(16).null())
                        .col(ColumnDef::new(Doc::PaymentTerms).string().null())
                        .col(columns::money(Doc::Freight))
                        .col(columns::money(Doc::Insurance))
                        .col(ColumnDef::new(Doc::ConvertedToId).uuid().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    header_table(PurchaseOrders::Table, Doc::SupplierId)
                        .col(ColumnDef::new(Doc::ReferenceId).uuid().null())
                        .col(ColumnDef::new(Doc::ExpectedDelivery).date().null())
                        .col(ColumnDef::new(Doc::DeliveryAddress).text().null())
                        .col(ColumnDef::new(Doc::Incoterms).string_len(16).null())
                        .col(ColumnDef::new(Doc::PaymentTerms).string().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    header_table(ShippingBills::Table, Doc::BuyerId)
                        .col(ColumnDef::new(Doc::ConsigneeId).uuid().null())
                        .col(ColumnDef::new(Doc::ReferenceId).uuid().null())
                        .col(ColumnDef::new(Doc::PortCode).string_len(16).not_null())
                        .col(ColumnDef::new(Doc::CountryOfDestination).string().not_null())
                        .col(ColumnDef::new(Doc::PortOfLoading).string().null())
                        .col(ColumnDef::new(Doc::PortOfDischarge).string().null())
                        .col(ColumnDef::new(Doc::Incoterms).string_len(16).null())
                        .col(ColumnDef::new(Doc::VesselName).string().null())
                        .col(ColumnDef::new(Doc::ContainerNumber).string().null())
                        .col(columns::money(Doc::Freight))
                        .col(columns::money(Doc::Insurance))
                        .col(columns::money(Doc::FobValue))
                        .col(columns::money(Doc::BaseFobValue))
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(index_on("idx_enquiries_status", Enquiries::Table, Doc::Status))
                .await?;
            manager
                .create_index(index_on("idx_enquiries_buyer_id", Enquiries::Table, Doc::BuyerId))
                .await?;
            manager
                .create_index(index_on("idx_quotes_status", Quotes::Table, Doc::Status))
                .await?;
            manager
                .create_index(index_on("idx_quotes_buyer_id", Quotes::Table, Doc::BuyerId))
                .await?;
            manager
                .create_index(index_on(
                    "idx_proforma_invoices_status",
                    ProformaInvoices::Table,
                    Doc::Status,
                ))
                .await?;
            manager
                .create_index(index_on(
                    "idx_export_orders_status",
                    ExportOrders::Table,
                    Doc::Status,
                ))
                .await?;
            manager
                .create_index(index_on(
                    "idx_purchase_orders_supplier_id",
                    PurchaseOrders::Table,
                    Doc::SupplierId,
                ))
                .await?;
            manager
                .create_index(index_on(
                    "idx_shipping_bills_reference_id",
                    ShippingBills::Table,
                    Doc::ReferenceId,
                ))
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ShippingBills::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(PurchaseOrders::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ExportOrders::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ProformaInvoices::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Quotes::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Enquiries::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum Enquiries {
        Table,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum Quotes {
        Table,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum ProformaInvoices {
        Table,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum ExportOrders {
        Table,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum PurchaseOrders {
        Table,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum ShippingBills {
        Table,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum Doc {
        Id,
        Number,
        Status,
        Version,
        BuyerId,
        SupplierId,
        ConsigneeId,
        ReferenceId,
        ConvertedToId,
        DocumentDate,
        Currency,
        ExchangeRate,
        Subtotal,
        DiscountTotal,
        TaxTotal,
        GrandTotal,
        BaseGrandTotal,
        Notes,
        Terms,
        StatusReason,
        ApprovedBy,
        ApprovedAt,
        CreatedBy,
        CreatedAt,
        UpdatedAt,
        Subject,
        Source,
        RequiredBy,
        ValidUntil,
        Incoterms,
        PaymentTerms,
        DeliveryTerms,
        ApprovalRequired,
        PortOfLoading,
        PortOfDischarge,
        FinalDestination,
        Freight,
        Insurance,
        BuyerPoNumber,
        ExpectedShipDate,
        ShippedOn,
        ExpectedDelivery,
        DeliveryAddress,
        PortCode,
        CountryOfDestination,
        VesselName,
        ContainerNumber,
        FobValue,
        BaseFobValue,
    }
}

mod m20260101_000003_create_line_items_table {
    use super::columns;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260101_000003_create_line_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(LineItems::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(LineItems::Id).uuid().primary_key().not_null())
                        .col(columns::kind(LineItems::DocumentKind))
                        .col(ColumnDef::new(LineItems::DocumentId).uuid().not_null())
                        .col(ColumnDef::new(LineItems::LineNo).integer().not_null())
                        .col(ColumnDef::new(LineItems::ProductId).uuid().null())
                        .col(ColumnDef::new(LineItems::SkuId).uuid().null())
                        .col(ColumnDef::new(LineItems::Description).text().not_null())
                        .col(ColumnDef::new(LineItems::HsnCode).string_len(8).null())
                        .col(
                            ColumnDef::new(LineItems::Quantity)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(ColumnDef::new(LineItems::Unit).string_len(16).not_null())
                        .col(columns::money(LineItems::UnitPrice))
                        .col(columns::percent(LineItems::DiscountPercent))
                        .col(columns::percent(LineItems::TaxPercent))
                        .col(columns::money(LineItems::GrossAmount))
                        .col(columns::money(LineItems::DiscountAmount))
                        .col(columns::money(LineItems::TaxAmount))
                        .col(columns::money(LineItems::Amount))
                        .col(columns::timestamp(LineItems::CreatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_line_items_document")
                        .table(LineItems::Table)
                        .col(LineItems::DocumentKind)
                        .col(LineItems::DocumentId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(LineItems::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum LineItems {
        Table,
        Id,
        DocumentKind,
        DocumentId,
        LineNo,
        ProductId,
        SkuId,
        Description,
        HsnCode,
        Quantity,
        Unit,
        UnitPrice,
        DiscountPercent,
        TaxPercent,
        GrossAmount,
        DiscountAmount,
        TaxAmount,
        Amount,
        CreatedAt,
    }
}

mod m20260101_000004_create_workflow_tables {
    use super::columns;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260101_000004_create_workflow_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(StatusHistory::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StatusHistory::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(columns::kind(StatusHistory::DocumentKind))
                        .col(ColumnDef::new(StatusHistory::DocumentId).uuid().not_null())
                        .col(ColumnDef::new(StatusHistory::FromStatus).string_len(24).null())
                        .col(columns::kind(StatusHistory::ToStatus))
                        .col(ColumnDef::new(StatusHistory::Action).string_len(32).not_null())
                        .col(ColumnDef::new(StatusHistory::Actor).string().null())
                        .col(ColumnDef::new(StatusHistory::Note).text().null())
                        .col(ColumnDef::new(StatusHistory::Version).integer().not_null())
                        .col(columns::timestamp(StatusHistory::CreatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_status_history_document")
                        .table(StatusHistory::Table)
                        .col(StatusHistory::DocumentKind)
                        .col(StatusHistory::DocumentId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(DocumentSequences::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(DocumentSequences::Key)
                                .string_len(32)
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DocumentSequences::LastValue)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(DocumentSequences::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(StatusHistory::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum StatusHistory {
        Table,
        Id,
        DocumentKind,
        DocumentId,
        FromStatus,
        ToStatus,
        Action,
        Actor,
        Note,
        Version,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum DocumentSequences {
        Table,
        Key,
        LastValue,
    }
}

mod m20260101_000005_create_payments_and_attachments {
    use super::columns;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260101_000005_create_payments_and_attachments"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Payments::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Payments::Id).uuid().primary_key().not_null())
                        .col(columns::kind(Payments::DocumentKind))
                        .col(ColumnDef::new(Payments::DocumentId).uuid().not_null())
                        .col(columns::money(Payments::Amount))
                        .col(ColumnDef::new(Payments::Currency).string_len(3).not_null())
                        .col(columns::rate(Payments::ExchangeRate))
                        .col(ColumnDef::new(Payments::Method).string_len(24).not_null())
                        .col(ColumnDef::new(Payments::Reference).string().null())
                        .col(ColumnDef::new(Payments::ReceivedOn).date().not_null())
                        .col(ColumnDef::new(Payments::Notes).text().null())
                        .col(ColumnDef::new(Payments::RecordedBy).string().null())
                        .col(columns::timestamp(Payments::CreatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_payments_document")
                        .table(Payments::Table)
                        .col(Payments::DocumentKind)
                        .col(Payments::DocumentId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Attachments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Attachments::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(columns::kind(Attachments::DocumentKind))
                        .col(ColumnDef::new(Attachments::DocumentId).uuid().not_null())
                        .col(ColumnDef::new(Attachments::FileName).string().not_null())
                        .col(ColumnDef::new(Attachments::ContentType).string().not_null())
                        .col(ColumnDef::new(Attachments::SizeBytes).big_integer().not_null())
                        .col(ColumnDef::new(Attachments::StorageKey).string().not_null())
                        .col(ColumnDef::new(Attachments::UploadedBy).string().null())
                        .col(columns::timestamp(Attachments::CreatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_attachments_document")
                        .table(Attachments::Table)
                        .col(Attachments::DocumentKind)
                        .col(Attachments::DocumentId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Attachments::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Payments::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Payments {
        Table,
        Id,
        DocumentKind,
        DocumentId,
        Amount,
        Currency,
        ExchangeRate,
        Method,
        Reference,
        ReceivedOn,
        Notes,
        RecordedBy,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum Attachments {
        Table,
        Id,
        DocumentKind,
        DocumentId,
        FileName,
        ContentType,
        SizeBytes,
        StorageKey,
        UploadedBy,
        CreatedAt,
    }
}
