//! Per-admin access settings entity

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::AccessSetting;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "access_settings")]
pub struct Model {
    /// Admin user id the row applies to
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,

    pub username: String,

    /// Service partition the row applies to, empty = all
    pub service: String,

    pub can_modify: bool,

    /// JSON array of tab names
    pub restricted_tabs: String,

    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn to_domain(&self) -> AccessSetting {
        AccessSetting {
            user_id: self.user_id.clone(),
            username: self.username.clone(),
            service: self.service.clone(),
            can_modify: self.can_modify,
            restricted_tabs: serde_json::from_str(&self.restricted_tabs).unwrap_or_default(),
        }
    }
}
