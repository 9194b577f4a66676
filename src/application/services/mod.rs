//! Panel services
//!
//! One service per console panel, all working through the document-store
//! primitives plus the event bus. Document encoding is JSON via serde.

pub mod access_control;
pub mod admin_directory;
pub mod copy;
pub mod credentials;
pub mod expiry_monitor;
pub mod referrals;
pub mod slots;
pub mod transactions;

pub use access_control::AccessControlService;
pub use admin_directory::AdminDirectory;
pub use copy::CopyService;
pub use credentials::CredentialService;
pub use expiry_monitor::{ExpiryMonitor, ExpiryMonitorConfig, StatusSnapshot};
pub use referrals::ReferralService;
pub use slots::SlotService;
pub use transactions::{BulkOutcome, TransactionFilter, TransactionService};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::{Document, DomainError, DomainResult};

/// Decode a stored document into a typed record
pub(crate) fn decode<T: DeserializeOwned>(doc: Document) -> DomainResult<T> {
    serde_json::from_value(doc)
        .map_err(|e| DomainError::Validation(format!("Malformed document: {}", e)))
}

/// Encode a typed record for storage
pub(crate) fn encode<T: Serialize>(value: &T) -> DomainResult<Document> {
    serde_json::to_value(value)
        .map_err(|e| DomainError::Validation(format!("Serialization error: {}", e)))
}
