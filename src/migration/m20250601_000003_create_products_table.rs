use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(pk_uuid(Products::Id))
                    .col(text(Products::Description))
                    .col(big_integer(Products::SalePrice).check(Expr::col(Products::SalePrice).gte(0)))
                    .col(string_uniq(Products::Barcode))
                    .col(string(Products::Section))
                    .col(string_null(Products::Category))
                    .col(integer(Products::InitialStock).check(Expr::col(Products::InitialStock).gte(0)))
                    .col(date_null(Products::ExpirationDate))
                    .col(timestamp_with_time_zone(Products::CreatedAt))
                    .col(timestamp_with_time_zone(Products::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_products_section")
                    .table(Products::Table)
                    .col(Products::Section)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_products_category")
                    .table(Products::Table)
                    .col(Products::Category)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Products {
    Table,
    Id,
    Description,
    SalePrice,
    Barcode,
    Section,
    Category,
    InitialStock,
    ExpirationDate,
    CreatedAt,
    UpdatedAt,
}
