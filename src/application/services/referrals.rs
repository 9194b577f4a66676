//! Referral panel service

use chrono::Utc;

use crate::domain::{DomainResult, ReferralSettings, ReferralStat};
use crate::infrastructure::docstore::SharedServiceRegistry;
use crate::notifications::events::{Event, ServiceEvent};
use crate::notifications::SharedEventBus;

use super::{decode, encode};

const SETTINGS_PATH: &str = "referrals/settings";
const USERS_PREFIX: &str = "referrals/users";

pub struct ReferralService {
    registry: SharedServiceRegistry,
    event_bus: SharedEventBus,
}

impl ReferralService {
    pub fn new(registry: SharedServiceRegistry, event_bus: SharedEventBus) -> Self {
        Self {
            registry,
            event_bus,
        }
    }

    pub async fn settings(&self, service: &str) -> DomainResult<ReferralSettings> {
        let store = self.registry.partition(service)?;
        match store.fetch(SETTINGS_PATH).await? {
            Some(doc) => decode(doc),
            None => Ok(ReferralSettings::default()),
        }
    }

    pub async fn update_settings(
        &self,
        service: &str,
        settings: ReferralSettings,
    ) -> DomainResult<ReferralSettings> {
        let store = self.registry.partition(service)?;
        store.set(SETTINGS_PATH, encode(&settings)?).await?;
        self.event_bus
            .publish(Event::ReferralSettingsUpdated(ServiceEvent {
                service: service.to_string(),
                timestamp: Utc::now(),
            }));
        Ok(settings)
    }

    pub async fn list_stats(&self, service: &str) -> DomainResult<Vec<ReferralStat>> {
        let store = self.registry.partition(service)?;
        let items = store.list(USERS_PREFIX).await?;
        items.into_iter().map(|(_, doc)| decode(doc)).collect()
    }

    pub async fn stat_for(&self, service: &str, user_id: &str) -> DomainResult<Option<ReferralStat>> {
        let store = self.registry.partition(service)?;
        match store.fetch(&format!("{}/{}", USERS_PREFIX, user_id)).await? {
            Some(doc) => Ok(Some(decode(doc)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DocstoreConfig;
    use crate::infrastructure::docstore::create_service_registry;
    use crate::notifications::create_event_bus;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_settings_roundtrip_and_stats() {
        let referrals = ReferralService::new(
            create_service_registry(&DocstoreConfig::default()),
            create_event_bus(),
        );

        assert!(!referrals.settings("netflix").await.unwrap().enabled);

        let settings = ReferralSettings {
            enabled: true,
            bonus_amount: Decimal::new(150, 2),
            min_withdrawal: Decimal::from(10),
        };
        referrals
            .update_settings("netflix", settings.clone())
            .await
            .unwrap();
        assert_eq!(referrals.settings("netflix").await.unwrap(), settings);

        assert!(referrals.list_stats("netflix").await.unwrap().is_empty());
        assert!(referrals
            .stat_for("netflix", "u1")
            .await
            .unwrap()
            .is_none());
    }
}
