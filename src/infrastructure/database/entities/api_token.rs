//! API token entity
//!
//! Hashed bearer tokens the bot process uses against this API.
//! Only the hash is stored; the full token is shown once at creation.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "api_tokens")]
pub struct Model {
    /// UUID
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Operator-facing label ("production bot")
    pub name: String,

    /// Display prefix, e.g. "ssa_1a2b3c4d..."
    pub prefix: String,

    /// SHA-256 of the full token, hex-encoded
    #[sea_orm(unique)]
    pub token_hash: String,

    /// Console account the token acts as, if any
    pub user_id: Option<String>,

    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_used_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
