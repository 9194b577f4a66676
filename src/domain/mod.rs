//! Domain layer: business entities, types and traits

pub mod access;
pub mod admin_config;
pub mod copy;
pub mod credential;
pub mod error;
pub mod referral;
pub mod slot;
pub mod store;
pub mod transaction;

pub use access::{AccessPolicy, AccessSetting, RestrictionType, UiRestriction};
pub use admin_config::{AdminConfig, AdminTier};
pub use copy::BotCopy;
pub use credential::Credential;
pub use error::{DomainError, DomainResult};
pub use referral::{ReferralSettings, ReferralStat};
pub use slot::Slot;
pub use store::{Document, DocumentChange, DocumentStore};
pub use transaction::{Transaction, TransactionState};
