//! Create ui_restrictions table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UiRestrictions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UiRestrictions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UiRestrictions::ElementId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UiRestrictions::RestrictionType)
                            .string()
                            .not_null()
                            .default("hide"),
                    )
                    .col(
                        ColumnDef::new(UiRestrictions::UserIds)
                            .string()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(UiRestrictions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UiRestrictions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ui_restrictions_element")
                    .table(UiRestrictions::Table)
                    .col(UiRestrictions::ElementId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UiRestrictions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum UiRestrictions {
    Table,
    Id,
    ElementId,
    RestrictionType,
    UserIds,
    CreatedAt,
    UpdatedAt,
}
