//! Credential panel service

use chrono::Utc;
use tracing::info;

use crate::domain::{Credential, DomainError, DomainResult};
use crate::infrastructure::docstore::SharedServiceRegistry;
use crate::notifications::events::{ChangeAction, EntityChangedEvent, Event};
use crate::notifications::SharedEventBus;

use super::{decode, encode};

const CREDENTIALS_PREFIX: &str = "credentials";

fn credential_path(id: &str) -> String {
    format!("{}/{}", CREDENTIALS_PREFIX, id)
}

pub struct CredentialService {
    registry: SharedServiceRegistry,
    event_bus: SharedEventBus,
}

impl CredentialService {
    pub fn new(registry: SharedServiceRegistry, event_bus: SharedEventBus) -> Self {
        Self {
            registry,
            event_bus,
        }
    }

    fn publish(&self, service: &str, credential_id: &str, action: ChangeAction) {
        self.event_bus
            .publish(Event::CredentialChanged(EntityChangedEvent {
                service: service.to_string(),
                entity_id: credential_id.to_string(),
                action,
                timestamp: Utc::now(),
            }));
    }

    pub async fn list(&self, service: &str) -> DomainResult<Vec<Credential>> {
        let store = self.registry.partition(service)?;
        let items = store.list(CREDENTIALS_PREFIX).await?;
        items.into_iter().map(|(_, doc)| decode(doc)).collect()
    }

    /// Credentials sold under one slot
    pub async fn list_for_slot(&self, service: &str, slot_id: &str) -> DomainResult<Vec<Credential>> {
        Ok(self
            .list(service)
            .await?
            .into_iter()
            .filter(|c| c.belongs_to_slot == slot_id)
            .collect())
    }

    pub async fn get(&self, service: &str, id: &str) -> DomainResult<Option<Credential>> {
        let store = self.registry.partition(service)?;
        match store.fetch(&credential_path(id)).await? {
            Some(doc) => Ok(Some(decode(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn create(&self, service: &str, mut credential: Credential) -> DomainResult<Credential> {
        let store = self.registry.partition(service)?;
        let path = credential_path(&credential.id);

        if store.fetch(&path).await?.is_some() {
            return Err(DomainError::Conflict(format!(
                "Credential {} already exists",
                credential.id
            )));
        }

        let now = Utc::now();
        credential.created_at = now;
        credential.updated_at = now;

        store.set(&path, encode(&credential)?).await?;
        info!("[{}] Credential {} created", service, credential.id);
        self.publish(service, &credential.id, ChangeAction::Created);
        Ok(credential)
    }

    pub async fn update(&self, service: &str, mut credential: Credential) -> DomainResult<Credential> {
        let store = self.registry.partition(service)?;
        let path = credential_path(&credential.id);

        let existing: Credential = match store.fetch(&path).await? {
            Some(doc) => decode(doc)?,
            None => {
                return Err(DomainError::not_found(
                    "credential",
                    "id",
                    credential.id.clone(),
                ))
            }
        };

        credential.created_at = existing.created_at;
        credential.updated_at = Utc::now();

        store.set(&path, encode(&credential)?).await?;
        self.publish(service, &credential.id, ChangeAction::Updated);
        Ok(credential)
    }

    pub async fn delete(&self, service: &str, id: &str) -> DomainResult<()> {
        let store = self.registry.partition(service)?;
        let path = credential_path(id);

        if store.fetch(&path).await?.is_none() {
            return Err(DomainError::not_found("credential", "id", id));
        }

        store.remove(&path).await?;
        info!("[{}] Credential {} deleted", service, id);
        self.publish(service, id, ChangeAction::Deleted);
        Ok(())
    }

    pub async fn set_locked(&self, service: &str, id: &str, locked: bool) -> DomainResult<Credential> {
        let mut credential = self
            .get(service, id)
            .await?
            .ok_or_else(|| DomainError::not_found("credential", "id", id))?;
        credential.locked = locked;
        self.update(service, credential).await
    }

    /// Zero the usage counter (after rotating the upstream password)
    pub async fn reset_usage(&self, service: &str, id: &str) -> DomainResult<Credential> {
        let mut credential = self
            .get(service, id)
            .await?
            .ok_or_else(|| DomainError::not_found("credential", "id", id))?;
        credential.usage_count = 0;
        self.update(service, credential).await
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DocstoreConfig;
    use crate::infrastructure::docstore::create_service_registry;
    use crate::notifications::create_event_bus;

    fn service() -> CredentialService {
        CredentialService::new(
            create_service_registry(&DocstoreConfig::default()),
            create_event_bus(),
        )
    }

    fn credential(id: &str, slot: &str, max_usage: u32) -> Credential {
        let now = Utc::now();
        Credential {
            id: id.to_string(),
            email: format!("{}@example.com", id),
            password: "pw".to_string(),
            secret: None,
            expiry_date: None,
            locked: false,
            max_usage,
            usage_count: 0,
            belongs_to_slot: slot.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_list_for_slot_filters() {
        let credentials = service();
        credentials.create("netflix", credential("c1", "s1", 2)).await.unwrap();
        credentials.create("netflix", credential("c2", "s2", 2)).await.unwrap();

        let for_s1 = credentials.list_for_slot("netflix", "s1").await.unwrap();
        assert_eq!(for_s1.len(), 1);
        assert_eq!(for_s1[0].id, "c1");
    }

    #[tokio::test]
    async fn test_lock_and_reset_usage() {
        let credentials = service();
        let mut c = credential("c1", "s1", 3);
        c.usage_count = 2;
        credentials.create("netflix", c).await.unwrap();

        let locked = credentials.set_locked("netflix", "c1", true).await.unwrap();
        assert!(locked.locked);

        let reset = credentials.reset_usage("netflix", "c1").await.unwrap();
        assert_eq!(reset.usage_count, 0);
    }
}
