//! Create device_tokens table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DeviceTokens::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DeviceTokens::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DeviceTokens::UserId).string().not_null())
                    .col(ColumnDef::new(DeviceTokens::Token).string().not_null())
                    .col(
                        ColumnDef::new(DeviceTokens::Platform)
                            .string()
                            .not_null()
                            .default("web"),
                    )
                    .col(
                        ColumnDef::new(DeviceTokens::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(DeviceTokens::RegisteredAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DeviceTokens::LastSeenAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_device_tokens_user")
                    .table(DeviceTokens::Table)
                    .col(DeviceTokens::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DeviceTokens::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum DeviceTokens {
    Table,
    Id,
    UserId,
    Token,
    Platform,
    IsActive,
    RegisteredAt,
    LastSeenAt,
}
