//! Push notification dispatch
//!
//! Forwards expiry and approval events to registered devices. The actual
//! delivery provider is script-injected on the console side and reached
//! through the `PushGateway` trait; it becomes ready asynchronously, so
//! the dispatcher polls readiness with a bounded retry before consuming
//! events. Per-device failures are tallied, never retried.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::domain::DomainResult;
use crate::infrastructure::database::entities::device_token;
use crate::shared::shutdown::ShutdownSignal;
use crate::shared::utills::datetime::format_optional;
use crate::shared::utills::retry::{retry_with_backoff, RetryConfig};

use super::event_bus::SharedEventBus;
use super::events::Event;

/// Delivery provider seam
#[async_trait]
pub trait PushGateway: Send + Sync {
    /// Whether the provider finished its asynchronous initialization
    fn is_ready(&self) -> bool;

    /// Deliver one notification to one device
    async fn send(&self, device_token: &str, title: &str, body: &str) -> DomainResult<()>;
}

/// Gateway that logs deliveries instead of calling a provider.
/// Stands in wherever no real provider is configured.
pub struct LogPushGateway {
    ready: AtomicBool,
}

impl LogPushGateway {
    pub fn new() -> Self {
        Self {
            ready: AtomicBool::new(true),
        }
    }

    /// A gateway that only becomes ready after `mark_ready`
    pub fn pending() -> Self {
        Self {
            ready: AtomicBool::new(false),
        }
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
    }
}

impl Default for LogPushGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PushGateway for LogPushGateway {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn send(&self, device_token: &str, title: &str, body: &str) -> DomainResult<()> {
        info!(
            "push [{}…] {}: {}",
            &device_token[..device_token.len().min(8)],
            title,
            body
        );
        Ok(())
    }
}

/// Background push dispatcher
pub struct PushDispatcher {
    db: DatabaseConnection,
    gateway: Arc<dyn PushGateway>,
    event_bus: SharedEventBus,
}

impl PushDispatcher {
    pub fn new(
        db: DatabaseConnection,
        gateway: Arc<dyn PushGateway>,
        event_bus: SharedEventBus,
    ) -> Self {
        Self {
            db,
            gateway,
            event_bus,
        }
    }

    /// Start the dispatcher background task
    pub fn start(self: Arc<Self>, shutdown: ShutdownSignal) {
        tokio::spawn(async move {
            if let Err(e) = self.wait_gateway_ready().await {
                warn!("Push gateway never became ready, dispatcher disabled: {}", e);
                return;
            }
            info!("🔔 Push dispatcher started");

            let mut subscriber = self.event_bus.subscribe();
            loop {
                tokio::select! {
                    msg = subscriber.recv() => {
                        match msg {
                            Some(msg) => self.dispatch(&msg.event).await,
                            None => break,
                        }
                    }
                    _ = shutdown.notified().wait() => {
                        info!("🔔 Push dispatcher shutting down");
                        break;
                    }
                }
            }
        });
    }

    /// Poll the gateway until it reports ready (the provider loads
    /// asynchronously on the console side).
    async fn wait_gateway_ready(&self) -> Result<(), String> {
        let gateway = self.gateway.clone();
        retry_with_backoff(
            RetryConfig {
                max_attempts: 10,
                initial_delay: Duration::from_millis(500),
                backoff_multiplier: 1.0,
                max_delay: Duration::from_millis(500),
            },
            move || {
                let gateway = gateway.clone();
                async move {
                    if gateway.is_ready() {
                        Ok(())
                    } else {
                        Err("push gateway not ready".to_string())
                    }
                }
            },
            |_| true,
            "push_gateway_ready",
        )
        .await
    }

    /// Forward one event to every active device, tallying failures
    async fn dispatch(&self, event: &Event) {
        let Some((title, body)) = notification_content(event) else {
            return;
        };

        let devices = match device_token::Entity::find()
            .filter(device_token::Column::IsActive.eq(true))
            .all(&self.db)
            .await
        {
            Ok(devices) => devices,
            Err(e) => {
                warn!("Failed to load device tokens: {}", e);
                return;
            }
        };

        if devices.is_empty() {
            debug!("No active devices for push: {}", title);
            return;
        }

        let mut sent = 0usize;
        let mut failed = 0usize;
        for device in &devices {
            match self.gateway.send(&device.token, &title, &body).await {
                Ok(()) => sent += 1,
                Err(e) => {
                    failed += 1;
                    debug!("Push to device {} failed: {}", device.id, e);
                }
            }
        }

        info!(
            "Push '{}' delivered: {} sent, {} failed of {} devices",
            title,
            sent,
            failed,
            devices.len()
        );
    }
}

/// Which events produce a push, and with what text
fn notification_content(event: &Event) -> Option<(String, String)> {
    match event {
        Event::TransactionExpired(e) => Some((
            format!("[{}] Subscription expired", e.service),
            format!(
                "Transaction {} for user {} expired at {}",
                e.transaction_id,
                e.user_id,
                format_optional(e.end_time)
            ),
        )),
        Event::TransactionApproved(e) => Some((
            format!("[{}] Purchase approved", e.service),
            format!(
                "Transaction {} approved for user {}, active until {}",
                e.transaction_id,
                e.user_id,
                format_optional(e.end_time)
            ),
        )),
        Event::Error(e) => Some((
            "Console error".to_string(),
            format!("{}: {}", e.error_type, e.message),
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::events::{ChangeAction, EntityChangedEvent, TransactionEvent};
    use chrono::Utc;

    #[test]
    fn test_only_selected_events_push() {
        let expired = Event::TransactionExpired(TransactionEvent {
            service: "netflix".to_string(),
            transaction_id: "t1".to_string(),
            slot_id: "s1".to_string(),
            user_id: "u1".to_string(),
            end_time: None,
            timestamp: Utc::now(),
        });
        assert!(notification_content(&expired).is_some());

        let crud = Event::SlotChanged(EntityChangedEvent {
            service: "netflix".to_string(),
            entity_id: "s1".to_string(),
            action: ChangeAction::Updated,
            timestamp: Utc::now(),
        });
        assert!(notification_content(&crud).is_none());
    }

    #[tokio::test]
    async fn test_log_gateway_readiness() {
        let gateway = LogPushGateway::pending();
        assert!(!gateway.is_ready());
        gateway.mark_ready();
        assert!(gateway.is_ready());
        gateway.send("device-token-123", "t", "b").await.unwrap();
    }
}
