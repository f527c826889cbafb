use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string(Users::Username).unique_key())
                    .col(string(Users::PasswordHash))
                    .col(string_len(Users::Role, 20))
                    .col(timestamp_with_time_zone(Users::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // Create products table
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(pk_auto(Products::Id))
                    .col(string(Products::Name))
                    .col(string(Products::Category))
                    .col(decimal(Products::UnitPrice))
                    .col(integer(Products::Stock).default(0))
                    .col(timestamp_with_time_zone(Products::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // Create sales table
        manager
            .create_table(
                Table::create()
                    .table(Sales::Table)
                    .if_not_exists()
                    .col(pk_auto(Sales::Id))
                    .col(integer(Sales::ProductId))
                    .col(string(Sales::CustomerName))
                    .col(integer(Sales::Quantity))
                    .col(decimal(Sales::TotalPrice))
                    .col(timestamp_with_time_zone(Sales::SaleDate))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sale_product")
                            .from(Sales::Table, Sales::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create financial_records table. No foreign key to sales: the
        // ledger is denormalized and one-directional.
        manager
            .create_table(
                Table::create()
                    .table(FinancialRecords::Table)
                    .if_not_exists()
                    .col(pk_auto(FinancialRecords::Id))
                    .col(string_len(FinancialRecords::RecordType, 20))
                    .col(decimal(FinancialRecords::Amount))
                    .col(string(FinancialRecords::Category))
                    .col(text(FinancialRecords::Description))
                    .col(timestamp_with_time_zone(FinancialRecords::RecordedAt))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order to avoid foreign key constraints
        manager
            .drop_table(Table::drop().table(FinancialRecords::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Sales::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    PasswordHash,
    Role,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    Name,
    Category,
    UnitPrice,
    Stock,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Sales {
    Table,
    Id,
    ProductId,
    CustomerName,
    Quantity,
    TotalPrice,
    SaleDate,
}

#[derive(DeriveIden)]
enum FinancialRecords {
    Table,
    Id,
    RecordType,
    Amount,
    Category,
    Description,
    RecordedAt,
}
