//! UI restriction rule entity

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::{RestrictionType, UiRestriction};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ui_restrictions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Console element the rule targets (DOM id)
    pub element_id: String,

    /// "blur" | "hide" | "disable"
    pub restriction_type: String,

    /// JSON array of admin user ids
    pub user_ids: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn to_domain(&self) -> UiRestriction {
        UiRestriction {
            id: self.id,
            element_id: self.element_id.clone(),
            // unknown types degrade to the most conservative rendering
            restriction_type: RestrictionType::parse(&self.restriction_type)
                .unwrap_or(RestrictionType::Hide),
            user_ids: serde_json::from_str(&self.user_ids).unwrap_or_default(),
        }
    }
}
