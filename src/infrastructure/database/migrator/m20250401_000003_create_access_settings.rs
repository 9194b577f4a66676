//! Create access_settings table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AccessSettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AccessSettings::UserId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AccessSettings::Username).string().not_null())
                    .col(
                        ColumnDef::new(AccessSettings::Service)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(AccessSettings::CanModify)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(AccessSettings::RestrictedTabs)
                            .string()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(AccessSettings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AccessSettings::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum AccessSettings {
    Table,
    UserId,
    Username,
    Service,
    CanModify,
    RestrictedTabs,
    UpdatedAt,
}
