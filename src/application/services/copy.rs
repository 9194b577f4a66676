//! Bot UI copy panel service

use chrono::Utc;

use crate::domain::{BotCopy, DomainResult};
use crate::infrastructure::docstore::SharedServiceRegistry;
use crate::notifications::events::{Event, ServiceEvent};
use crate::notifications::SharedEventBus;

use super::{decode, encode};

const COPY_PATH: &str = "copy";

pub struct CopyService {
    registry: SharedServiceRegistry,
    event_bus: SharedEventBus,
}

impl CopyService {
    pub fn new(registry: SharedServiceRegistry, event_bus: SharedEventBus) -> Self {
        Self {
            registry,
            event_bus,
        }
    }

    /// Stored copy, or the defaults when the panel was never saved
    pub async fn get(&self, service: &str) -> DomainResult<BotCopy> {
        let store = self.registry.partition(service)?;
        match store.fetch(COPY_PATH).await? {
            Some(doc) => decode(doc),
            None => Ok(BotCopy::default()),
        }
    }

    pub async fn update(&self, service: &str, copy: BotCopy) -> DomainResult<BotCopy> {
        let store = self.registry.partition(service)?;
        store.set(COPY_PATH, encode(&copy)?).await?;
        self.event_bus.publish(Event::CopyUpdated(ServiceEvent {
            service: service.to_string(),
            timestamp: Utc::now(),
        }));
        Ok(copy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DocstoreConfig;
    use crate::infrastructure::docstore::create_service_registry;
    use crate::notifications::create_event_bus;

    #[tokio::test]
    async fn test_defaults_until_saved() {
        let service = CopyService::new(
            create_service_registry(&DocstoreConfig::default()),
            create_event_bus(),
        );

        let copy = service.get("netflix").await.unwrap();
        assert_eq!(copy, BotCopy::default());

        let mut edited = copy;
        edited.welcome = "Hello!".to_string();
        service.update("netflix", edited.clone()).await.unwrap();

        assert_eq!(service.get("netflix").await.unwrap(), edited);
        // other partitions keep their own copy
        assert_eq!(service.get("spotify").await.unwrap(), BotCopy::default());
    }
}
