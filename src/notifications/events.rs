//! Notification events
//!
//! Defines all event types that can be broadcasted to console clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What happened to a CRUD entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    Created,
    Updated,
    Deleted,
}

/// Event types for notifications
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Event {
    /// Slot created/updated/deleted
    SlotChanged(EntityChangedEvent),
    /// Credential created/updated/deleted
    CredentialChanged(EntityChangedEvent),
    /// Transaction approved by an admin
    TransactionApproved(TransactionEvent),
    /// Transaction hidden or unhidden
    TransactionHidden(TransactionEvent),
    /// Transaction window closed (published once per transaction)
    TransactionExpired(TransactionEvent),
    /// Bulk expired-transaction cleanup finished
    BulkCleanupCompleted(BulkCleanupEvent),
    /// Bot UI copy edited
    CopyUpdated(ServiceEvent),
    /// Referral settings edited
    ReferralSettingsUpdated(ServiceEvent),
    /// Admin tier lists edited
    AdminConfigUpdated(AdminConfigEvent),
    /// Access-settings row written or deleted
    AccessSettingsChanged(AccessSettingsEvent),
    /// UI-restriction rule written or deleted
    UiRestrictionChanged(UiRestrictionEvent),
    /// Error occurred
    Error(ErrorEvent),
}

impl Event {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::SlotChanged(_) => "slot_changed",
            Event::CredentialChanged(_) => "credential_changed",
            Event::TransactionApproved(_) => "transaction_approved",
            Event::TransactionHidden(_) => "transaction_hidden",
            Event::TransactionExpired(_) => "transaction_expired",
            Event::BulkCleanupCompleted(_) => "bulk_cleanup_completed",
            Event::CopyUpdated(_) => "copy_updated",
            Event::ReferralSettingsUpdated(_) => "referral_settings_updated",
            Event::AdminConfigUpdated(_) => "admin_config_updated",
            Event::AccessSettingsChanged(_) => "access_settings_changed",
            Event::UiRestrictionChanged(_) => "ui_restriction_changed",
            Event::Error(_) => "error",
        }
    }

    /// Get the service partition if applicable
    pub fn service(&self) -> Option<&str> {
        match self {
            Event::SlotChanged(e) => Some(&e.service),
            Event::CredentialChanged(e) => Some(&e.service),
            Event::TransactionApproved(e) => Some(&e.service),
            Event::TransactionHidden(e) => Some(&e.service),
            Event::TransactionExpired(e) => Some(&e.service),
            Event::BulkCleanupCompleted(e) => Some(&e.service),
            Event::CopyUpdated(e) => Some(&e.service),
            Event::ReferralSettingsUpdated(e) => Some(&e.service),
            Event::AdminConfigUpdated(_) => None,
            Event::AccessSettingsChanged(_) => None,
            Event::UiRestrictionChanged(_) => None,
            Event::Error(e) => e.service.as_deref(),
        }
    }
}

/// Slot or credential change event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityChangedEvent {
    pub service: String,
    pub entity_id: String,
    pub action: ChangeAction,
    pub timestamp: DateTime<Utc>,
}

/// Transaction lifecycle event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionEvent {
    pub service: String,
    pub transaction_id: String,
    pub slot_id: String,
    pub user_id: String,
    pub end_time: Option<DateTime<Utc>>,
    pub timestamp: DateTime<Utc>,
}

/// Aggregate result of a bulk cleanup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkCleanupEvent {
    pub service: String,
    pub hidden: usize,
    pub failed: usize,
    pub timestamp: DateTime<Utc>,
}

/// Per-partition document edited
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceEvent {
    pub service: String,
    pub timestamp: DateTime<Utc>,
}

/// Admin tier lists edited
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfigEvent {
    pub timestamp: DateTime<Utc>,
}

/// Access-settings row changed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessSettingsEvent {
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
}

/// UI-restriction rule changed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiRestrictionEvent {
    pub element_id: String,
    pub timestamp: DateTime<Utc>,
}

/// Error event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEvent {
    pub service: Option<String>,
    pub error_type: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Wrapper for sending events with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: Event,
}

impl EventMessage {
    pub fn new(event: Event) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event,
        }
    }
}
