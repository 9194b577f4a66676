//! Path-addressed document store abstraction
//!
//! The bot data (slots, credentials, transactions, copy, referrals) lives
//! in hierarchical JSON documents keyed by slash-separated paths, one
//! partition per service tag. The trait mirrors the remote primitives the
//! console panels rely on: fetch / set / update / remove / list / listen.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

use super::error::DomainResult;

/// A stored document is plain JSON
pub type Document = serde_json::Value;

/// Change pushed to listeners whenever a path is written or removed.
/// `value` is `None` for removals.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentChange {
    pub path: String,
    pub value: Option<Document>,
    pub timestamp: DateTime<Utc>,
}

impl DocumentChange {
    /// Whether the change happened at `path` or somewhere below it
    pub fn is_under(&self, prefix: &str) -> bool {
        self.path == prefix
            || self
                .path
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

/// Storage primitives for one document partition
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read the document at `path`, if any
    async fn fetch(&self, path: &str) -> DomainResult<Option<Document>>;

    /// Create or overwrite the document at `path`
    async fn set(&self, path: &str, value: Document) -> DomainResult<()>;

    /// Shallow-merge `fields` into the existing document at `path`.
    /// Fails with NotFound when nothing is stored there.
    async fn update(
        &self,
        path: &str,
        fields: serde_json::Map<String, Document>,
    ) -> DomainResult<()>;

    /// Remove the document at `path` (no-op when absent)
    async fn remove(&self, path: &str) -> DomainResult<()>;

    /// List direct children of `prefix` as (key, document) pairs,
    /// ordered by key
    async fn list(&self, prefix: &str) -> DomainResult<Vec<(String, Document)>>;

    /// Subscribe to every change in this partition
    fn listen(&self) -> broadcast::Receiver<DocumentChange>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_prefix_match() {
        let change = DocumentChange {
            path: "slots/abc".to_string(),
            value: None,
            timestamp: Utc::now(),
        };
        assert!(change.is_under("slots"));
        assert!(change.is_under("slots/abc"));
        assert!(!change.is_under("slot"));
        assert!(!change.is_under("credentials"));
    }
}
