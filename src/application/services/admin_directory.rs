//! Admin tier directory
//!
//! Caches the two admin id lists from the global partition and answers
//! tier lookups for the guards.

use chrono::Utc;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::domain::{AdminConfig, AdminTier, DocumentStore, DomainResult};
use crate::notifications::events::{AdminConfigEvent, Event};
use crate::notifications::SharedEventBus;
use crate::shared::shutdown::ShutdownSignal;

use super::{decode, encode};

const ADMIN_CONFIG_PATH: &str = "admin_config";

pub struct AdminDirectory {
    store: Arc<dyn DocumentStore>,
    event_bus: SharedEventBus,
    cache: RwLock<AdminConfig>,
}

impl AdminDirectory {
    pub fn new(store: Arc<dyn DocumentStore>, event_bus: SharedEventBus) -> Self {
        Self {
            store,
            event_bus,
            cache: RwLock::new(AdminConfig::default()),
        }
    }

    /// Load the lists from the store (empty lists when unset)
    pub async fn load(&self) -> DomainResult<()> {
        let config = match self.store.fetch(ADMIN_CONFIG_PATH).await? {
            Some(doc) => decode(doc)?,
            None => AdminConfig::default(),
        };
        let mut cache = self.cache.write().await;
        *cache = config;
        info!(
            "Admin directory loaded: {} superior, {} inferior",
            cache.superior_admins.len(),
            cache.inferior_admins.len()
        );
        Ok(())
    }

    pub async fn get(&self) -> AdminConfig {
        self.cache.read().await.clone()
    }

    pub async fn update(&self, config: AdminConfig) -> DomainResult<AdminConfig> {
        self.store.set(ADMIN_CONFIG_PATH, encode(&config)?).await?;
        {
            let mut cache = self.cache.write().await;
            *cache = config.clone();
        }
        self.event_bus.publish(Event::AdminConfigUpdated(AdminConfigEvent {
            timestamp: Utc::now(),
        }));
        Ok(config)
    }

    pub async fn tier_for(&self, user_id: &str) -> AdminTier {
        self.cache.read().await.tier_for(user_id)
    }

    pub async fn is_superior(&self, user_id: &str) -> bool {
        self.cache.read().await.is_superior(user_id)
    }

    /// Follow live store changes so a write from another process (the
    /// bot, a second console instance) lands in the cache too.
    pub fn start(self: &Arc<Self>, shutdown: ShutdownSignal) {
        let directory = Arc::clone(self);
        let mut changes = directory.store.listen();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    change = changes.recv() => {
                        match change {
                            Ok(change) if change.is_under(ADMIN_CONFIG_PATH) => {
                                if let Err(e) = directory.load().await {
                                    warn!("Admin directory reload failed: {}", e);
                                }
                            }
                            Ok(_) => {}
                            Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => {
                                // catch up with one full reload
                                if let Err(e) = directory.load().await {
                                    warn!("Admin directory reload failed: {}", e);
                                }
                            }
                            Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                        }
                    }
                    _ = shutdown.notified().wait() => break,
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::docstore::MemoryDocumentStore;
    use crate::notifications::create_event_bus;

    fn directory() -> AdminDirectory {
        AdminDirectory::new(
            Arc::new(MemoryDocumentStore::new("global")),
            create_event_bus(),
        )
    }

    #[tokio::test]
    async fn test_missing_document_means_no_admins() {
        let dir = directory();
        dir.load().await.unwrap();
        assert_eq!(dir.tier_for("anyone").await, AdminTier::Unknown);
    }

    #[tokio::test]
    async fn test_update_refreshes_cache_and_store() {
        let dir = directory();
        dir.load().await.unwrap();

        dir.update(AdminConfig {
            superior_admins: vec!["boss".to_string()],
            inferior_admins: vec![],
        })
        .await
        .unwrap();

        assert!(dir.is_superior("boss").await);

        // a fresh load from the same store sees the write
        dir.load().await.unwrap();
        assert!(dir.is_superior("boss").await);
    }
}
