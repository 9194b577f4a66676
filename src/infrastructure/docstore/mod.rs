//! Document store partitions
//!
//! One independent partition per configured service tag, plus a global
//! partition for admin-wide documents (admin config). Panels select a
//! partition by the service tag in the URL.

pub mod memory;

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::config::DocstoreConfig;
use crate::domain::{DocumentStore, DomainError, DomainResult};

pub use memory::MemoryDocumentStore;

/// All configured partitions
pub struct ServiceRegistry {
    partitions: HashMap<String, Arc<dyn DocumentStore>>,
    global: Arc<dyn DocumentStore>,
    tags: Vec<String>,
}

impl ServiceRegistry {
    pub fn new(config: &DocstoreConfig) -> Self {
        let mut partitions: HashMap<String, Arc<dyn DocumentStore>> = HashMap::new();
        for tag in &config.services {
            partitions.insert(
                tag.clone(),
                Arc::new(MemoryDocumentStore::new(tag.clone())) as Arc<dyn DocumentStore>,
            );
        }
        info!(
            "Document store initialized with {} service partitions: {}",
            config.services.len(),
            config.services.join(", ")
        );

        Self {
            partitions,
            global: Arc::new(MemoryDocumentStore::new("global")),
            tags: config.services.clone(),
        }
    }

    /// Partition for a service tag
    pub fn partition(&self, service: &str) -> DomainResult<Arc<dyn DocumentStore>> {
        self.partitions
            .get(service)
            .cloned()
            .ok_or_else(|| DomainError::UnknownService(service.to_string()))
    }

    /// Admin-wide partition (admin config lives here)
    pub fn global(&self) -> Arc<dyn DocumentStore> {
        self.global.clone()
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}

/// Shared registry handle
pub type SharedServiceRegistry = Arc<ServiceRegistry>;

pub fn create_service_registry(config: &DocstoreConfig) -> SharedServiceRegistry {
    Arc::new(ServiceRegistry::new(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_service_is_rejected() {
        let registry = ServiceRegistry::new(&DocstoreConfig::default());
        assert!(registry.partition("netflix").is_ok());
        assert!(matches!(
            registry.partition("disney"),
            Err(DomainError::UnknownService(_))
        ));
    }

    #[tokio::test]
    async fn test_partitions_are_independent() {
        let registry = ServiceRegistry::new(&DocstoreConfig::default());
        let netflix = registry.partition("netflix").unwrap();
        let spotify = registry.partition("spotify").unwrap();

        netflix
            .set("slots/a", serde_json::json!({"name": "A"}))
            .await
            .unwrap();
        assert!(spotify.fetch("slots/a").await.unwrap().is_none());
    }
}
