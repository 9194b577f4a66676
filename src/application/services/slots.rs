//! Slot panel service

use chrono::Utc;
use tracing::info;

use crate::domain::{DomainError, DomainResult, Slot};
use crate::infrastructure::docstore::SharedServiceRegistry;
use crate::notifications::events::{ChangeAction, EntityChangedEvent, Event};
use crate::notifications::SharedEventBus;

use super::{decode, encode};

const SLOTS_PREFIX: &str = "slots";

fn slot_path(id: &str) -> String {
    format!("{}/{}", SLOTS_PREFIX, id)
}

pub struct SlotService {
    registry: SharedServiceRegistry,
    event_bus: SharedEventBus,
}

impl SlotService {
    pub fn new(registry: SharedServiceRegistry, event_bus: SharedEventBus) -> Self {
        Self {
            registry,
            event_bus,
        }
    }

    fn publish(&self, service: &str, slot_id: &str, action: ChangeAction) {
        self.event_bus.publish(Event::SlotChanged(EntityChangedEvent {
            service: service.to_string(),
            entity_id: slot_id.to_string(),
            action,
            timestamp: Utc::now(),
        }));
    }

    pub async fn list(&self, service: &str) -> DomainResult<Vec<Slot>> {
        let store = self.registry.partition(service)?;
        let items = store.list(SLOTS_PREFIX).await?;
        items.into_iter().map(|(_, doc)| decode(doc)).collect()
    }

    pub async fn get(&self, service: &str, id: &str) -> DomainResult<Option<Slot>> {
        let store = self.registry.partition(service)?;
        match store.fetch(&slot_path(id)).await? {
            Some(doc) => Ok(Some(decode(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn create(&self, service: &str, mut slot: Slot) -> DomainResult<Slot> {
        let store = self.registry.partition(service)?;
        let path = slot_path(&slot.id);

        if store.fetch(&path).await?.is_some() {
            return Err(DomainError::Conflict(format!("Slot {} already exists", slot.id)));
        }

        let now = Utc::now();
        slot.created_at = now;
        slot.updated_at = now;

        store.set(&path, encode(&slot)?).await?;
        info!("[{}] Slot {} created", service, slot.id);
        self.publish(service, &slot.id, ChangeAction::Created);
        Ok(slot)
    }

    pub async fn update(&self, service: &str, mut slot: Slot) -> DomainResult<Slot> {
        let store = self.registry.partition(service)?;
        let path = slot_path(&slot.id);

        let existing: Slot = match store.fetch(&path).await? {
            Some(doc) => decode(doc)?,
            None => return Err(DomainError::not_found("slot", "id", slot.id.clone())),
        };

        slot.created_at = existing.created_at;
        slot.updated_at = Utc::now();

        store.set(&path, encode(&slot)?).await?;
        self.publish(service, &slot.id, ChangeAction::Updated);
        Ok(slot)
    }

    pub async fn set_enabled(&self, service: &str, id: &str, enabled: bool) -> DomainResult<Slot> {
        let mut slot = self
            .get(service, id)
            .await?
            .ok_or_else(|| DomainError::not_found("slot", "id", id))?;
        slot.enabled = enabled;
        self.update(service, slot).await
    }

    pub async fn delete(&self, service: &str, id: &str) -> DomainResult<()> {
        let store = self.registry.partition(service)?;
        let path = slot_path(id);

        if store.fetch(&path).await?.is_none() {
            return Err(DomainError::not_found("slot", "id", id));
        }

        store.remove(&path).await?;
        info!("[{}] Slot {} deleted", service, id);
        self.publish(service, id, ChangeAction::Deleted);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DocstoreConfig;
    use crate::infrastructure::docstore::create_service_registry;
    use crate::notifications::create_event_bus;

    fn service() -> SlotService {
        SlotService::new(
            create_service_registry(&DocstoreConfig::default()),
            create_event_bus(),
        )
    }

    #[tokio::test]
    async fn test_create_get_delete() {
        let slots = service();
        let slot = Slot::new("s1", "1 Month");

        let created = slots.create("netflix", slot.clone()).await.unwrap();
        assert_eq!(created.id, "s1");

        let fetched = slots.get("netflix", "s1").await.unwrap().unwrap();
        assert_eq!(fetched.name, "1 Month");

        // same id in another partition is independent
        assert!(slots.get("spotify", "s1").await.unwrap().is_none());

        slots.delete("netflix", "s1").await.unwrap();
        assert!(slots.get("netflix", "s1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_create_conflicts() {
        let slots = service();
        slots.create("netflix", Slot::new("s1", "A")).await.unwrap();
        let err = slots.create("netflix", Slot::new("s1", "B")).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_set_enabled() {
        let slots = service();
        slots.create("netflix", Slot::new("s1", "A")).await.unwrap();
        let updated = slots.set_enabled("netflix", "s1", false).await.unwrap();
        assert!(!updated.enabled);
    }

    #[tokio::test]
    async fn test_unknown_service_rejected() {
        let slots = service();
        assert!(matches!(
            slots.list("disney").await.unwrap_err(),
            DomainError::UnknownService(_)
        ));
    }
}
