//! Push notification device token entity

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "device_tokens")]
pub struct Model {
    /// UUID
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Console account the device belongs to
    pub user_id: String,

    /// Opaque token issued by the browser push provider
    pub token: String,

    /// "web" | "android" | "ios"
    pub platform: String,

    pub is_active: bool,

    pub registered_at: DateTime<Utc>,
    pub last_seen_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
