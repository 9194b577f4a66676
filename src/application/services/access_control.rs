//! Access-control context
//!
//! Keeps an in-memory index of access-settings and UI-restriction rows
//! and resolves a flat per-admin policy from it. The index is rebuilt
//! from the database on every change event for the two tables, so
//! guards never touch the database on the request path.

use std::collections::HashMap;
use std::sync::Arc;

use log::{info, warn};
use sea_orm::{DatabaseConnection, EntityTrait};
use tokio::sync::RwLock;

use crate::domain::{AccessPolicy, AccessSetting, DomainResult, UiRestriction};
use crate::infrastructure::database::entities::{access_setting, ui_restriction};
use crate::infrastructure::database::db_error_to_domain;
use crate::notifications::events::Event;
use crate::notifications::SharedEventBus;
use crate::shared::shutdown::ShutdownSignal;
use crate::shared::utills::retry::{retry_with_backoff, RetryConfig};

#[derive(Default)]
struct AccessIndex {
    settings: HashMap<String, AccessSetting>,
    restrictions: Vec<UiRestriction>,
}

pub struct AccessControlService {
    db: DatabaseConnection,
    event_bus: SharedEventBus,
    index: RwLock<AccessIndex>,
}

impl AccessControlService {
    pub fn new(db: DatabaseConnection, event_bus: SharedEventBus) -> Self {
        Self {
            db,
            event_bus,
            index: RwLock::new(AccessIndex::default()),
        }
    }

    /// Rebuild the index from both tables
    pub async fn reload(&self) -> DomainResult<()> {
        let settings = access_setting::Entity::find()
            .all(&self.db)
            .await
            .map_err(db_error_to_domain)?;
        let restrictions = ui_restriction::Entity::find()
            .all(&self.db)
            .await
            .map_err(db_error_to_domain)?;

        let mut index = self.index.write().await;
        index.settings = settings
            .iter()
            .map(|row| (row.user_id.clone(), row.to_domain()))
            .collect();
        index.restrictions = restrictions.iter().map(|row| row.to_domain()).collect();

        info!(
            "Access index reloaded: {} settings, {} restriction rules",
            index.settings.len(),
            index.restrictions.len()
        );
        Ok(())
    }

    /// Resolve the policy for one admin. Admins without a settings row
    /// are unrestricted.
    pub async fn policy_for(&self, user_id: &str) -> AccessPolicy {
        let index = self.index.read().await;
        AccessPolicy::resolve(user_id, index.settings.get(user_id), &index.restrictions)
    }

    /// Subscribe to change events and keep the index fresh
    pub fn start(self: &Arc<Self>, shutdown: ShutdownSignal) {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            let mut subscriber = service.event_bus.subscribe();
            loop {
                tokio::select! {
                    msg = subscriber.recv() => {
                        match msg {
                            Some(msg) => {
                                let relevant = matches!(
                                    msg.event,
                                    Event::AccessSettingsChanged(_) | Event::UiRestrictionChanged(_)
                                );
                                if relevant {
                                    let result = retry_with_backoff(
                                        RetryConfig::default(),
                                        || service.reload(),
                                        |e| e.is_transient(),
                                        "access_index_reload",
                                    )
                                    .await;
                                    if let Err(e) = result {
                                        warn!("Access index reload failed: {}", e);
                                    }
                                }
                            }
                            None => break,
                        }
                    }
                    _ = shutdown.notified().wait() => {
                        info!("Access index watcher shutting down");
                        break;
                    }
                }
            }
        });
    }
}
