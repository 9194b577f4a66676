//! Database migrations

pub use sea_orm_migration::prelude::*;

mod m20250401_000001_create_users;
mod m20250401_000002_create_api_tokens;
mod m20250401_000003_create_access_settings;
mod m20250401_000004_create_ui_restrictions;
mod m20250401_000005_create_device_tokens;

pub struct Migrator;

impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250401_000001_create_users::Migration),
            Box::new(m20250401_000002_create_api_tokens::Migration),
            Box::new(m20250401_000003_create_access_settings::Migration),
            Box::new(m20250401_000004_create_ui_restrictions::Migration),
            Box::new(m20250401_000005_create_device_tokens::Migration),
        ]
    }
}
