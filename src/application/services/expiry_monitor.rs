//! Expiry Monitor Service
//!
//! Runs in the background and sweeps every service partition, publishing
//! one expiry notification per transaction whose window has closed.
//! Classification itself is stateless (wall-clock comparison at read
//! time); the monitor only remembers which transactions it already
//! announced so the console is not re-toasted on every sweep.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use log::{debug, info, warn};
use tokio::sync::RwLock;

use crate::domain::{DomainResult, Transaction, TransactionState};
use crate::infrastructure::docstore::SharedServiceRegistry;
use crate::notifications::events::{Event, TransactionEvent};
use crate::notifications::SharedEventBus;
use crate::shared::shutdown::ShutdownSignal;

use super::decode;

const TRANSACTIONS_PREFIX: &str = "transactions";

/// Configuration for expiry monitoring
#[derive(Debug, Clone)]
pub struct ExpiryMonitorConfig {
    /// How often to sweep the partitions (in seconds)
    pub check_interval_secs: u64,
    /// Rolling window for the expired panel (in hours)
    pub display_window_hours: i64,
}

impl Default for ExpiryMonitorConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: 60,
            display_window_hours: 24,
        }
    }
}

/// What the status panel shows for one partition
#[derive(Debug, Clone)]
pub struct StatusSnapshot {
    /// Open subscription windows
    pub active: Vec<Transaction>,
    /// Windows closed within the display window
    pub expired: Vec<Transaction>,
    /// Paid but not yet approved
    pub pending: usize,
    /// Hidden transactions on record
    pub hidden: usize,
    /// Expiries already announced for this partition
    pub notified: usize,
}

/// Expiry Monitor Service
pub struct ExpiryMonitor {
    registry: SharedServiceRegistry,
    event_bus: SharedEventBus,
    config: ExpiryMonitorConfig,
    /// "{service}/{transaction_id}" keys already announced
    notified: Arc<DashMap<String, ()>>,
    /// Running state
    running: Arc<RwLock<bool>>,
}

fn dedup_key(service: &str, transaction_id: &str) -> String {
    format!("{}/{}", service, transaction_id)
}

impl ExpiryMonitor {
    pub fn new(registry: SharedServiceRegistry, event_bus: SharedEventBus) -> Self {
        Self {
            registry,
            event_bus,
            config: ExpiryMonitorConfig::default(),
            notified: Arc::new(DashMap::new()),
            running: Arc::new(RwLock::new(false)),
        }
    }

    pub fn with_config(mut self, config: ExpiryMonitorConfig) -> Self {
        self.config = config;
        self
    }

    /// Start the expiry monitor background task
    pub fn start(&self, shutdown: ShutdownSignal) {
        let registry = self.registry.clone();
        let event_bus = self.event_bus.clone();
        let notified = self.notified.clone();
        let config = self.config.clone();
        let running = self.running.clone();

        tokio::spawn(async move {
            {
                let mut r = running.write().await;
                *r = true;
            }

            info!(
                "⏰ Expiry monitor started (check interval: {}s, display window: {}h)",
                config.check_interval_secs, config.display_window_hours
            );

            let mut interval = tokio::time::interval(Duration::from_secs(config.check_interval_secs));

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        if let Err(e) = sweep_partitions(&registry, &event_bus, &notified).await {
                            warn!("Expiry sweep error: {}", e);
                        }
                    }
                    _ = shutdown.notified().wait() => {
                        info!("⏰ Expiry monitor shutting down");
                        break;
                    }
                }
            }

            {
                let mut r = running.write().await;
                *r = false;
            }

            info!("⏰ Expiry monitor stopped");
        });
    }

    /// Check if the monitor is running
    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }

    /// Run one sweep immediately (also used by tests)
    pub async fn sweep(&self) -> DomainResult<usize> {
        sweep_partitions(&self.registry, &self.event_bus, &self.notified).await
    }

    /// Whether an expiry notification already went out
    pub fn already_notified(&self, service: &str, transaction_id: &str) -> bool {
        self.notified.contains_key(&dedup_key(service, transaction_id))
    }

    /// Status panel data for one partition, classified against the clock
    pub async fn status_snapshot(&self, service: &str) -> DomainResult<StatusSnapshot> {
        let store = self.registry.partition(service)?;
        let items = store.list(TRANSACTIONS_PREFIX).await?;
        let now = Utc::now();
        let window = chrono::Duration::hours(self.config.display_window_hours);

        let mut snapshot = StatusSnapshot {
            active: Vec::new(),
            expired: Vec::new(),
            pending: 0,
            hidden: 0,
            notified: 0,
        };

        for (_, doc) in items {
            let tx: Transaction = decode(doc)?;
            if tx.hidden {
                snapshot.hidden += 1;
                continue;
            }
            match tx.state_at(now) {
                TransactionState::Pending => snapshot.pending += 1,
                TransactionState::Active => snapshot.active.push(tx),
                TransactionState::Expired => {
                    if tx.in_display_window(now, window) {
                        snapshot.expired.push(tx);
                    }
                }
            }
        }

        let prefix = format!("{}/", service);
        snapshot.notified = self
            .notified
            .iter()
            .filter(|entry| entry.key().starts_with(&prefix))
            .count();

        Ok(snapshot)
    }
}

/// Sweep all partitions, announcing newly expired transactions once
async fn sweep_partitions(
    registry: &SharedServiceRegistry,
    event_bus: &SharedEventBus,
    notified: &Arc<DashMap<String, ()>>,
) -> DomainResult<usize> {
    let now = Utc::now();
    let mut announced = 0usize;

    for service in registry.tags() {
        let store = registry.partition(service)?;
        let items = store.list(TRANSACTIONS_PREFIX).await?;
        debug!("[{}] Sweeping {} transactions", service, items.len());

        for (_, doc) in items {
            let tx: Transaction = decode(doc)?;
            if tx.hidden || !tx.is_expired_at(now) {
                continue;
            }

            let key = dedup_key(service, &tx.id);
            if notified.contains_key(&key) {
                continue;
            }
            notified.insert(key, ());
            announced += 1;

            info!(
                "[{}] Transaction {} expired (window closed at {:?})",
                service, tx.id, tx.end_time
            );
            event_bus.publish(Event::TransactionExpired(TransactionEvent {
                service: service.clone(),
                transaction_id: tx.id.clone(),
                slot_id: tx.slot_id.clone(),
                user_id: tx.user_id.clone(),
                end_time: tx.end_time,
                timestamp: Utc::now(),
            }));
        }
    }

    Ok(announced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DocstoreConfig;
    use crate::infrastructure::docstore::create_service_registry;
    use crate::notifications::create_event_bus;
    use chrono::Duration as ChronoDuration;

    async fn seed_tx(
        registry: &SharedServiceRegistry,
        service: &str,
        id: &str,
        end_offset_hours: i64,
        hidden: bool,
    ) {
        let now = Utc::now();
        let mut tx = Transaction::new(id, "s1", "u1");
        tx.start_time = Some(now - ChronoDuration::hours(48));
        tx.end_time = Some(now + ChronoDuration::hours(end_offset_hours));
        tx.approved_at = tx.start_time;
        tx.hidden = hidden;
        let store = registry.partition(service).unwrap();
        store
            .set(
                &format!("transactions/{}", id),
                serde_json::to_value(&tx).unwrap(),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_sweep_announces_each_expiry_once() {
        let registry = create_service_registry(&DocstoreConfig::default());
        let bus = create_event_bus();
        let monitor = ExpiryMonitor::new(registry.clone(), bus.clone());
        let mut subscriber = bus.subscribe();

        seed_tx(&registry, "netflix", "t1", -1, false).await;
        seed_tx(&registry, "netflix", "t2", 1, false).await;
        seed_tx(&registry, "netflix", "t3", -1, true).await; // hidden: silent

        let announced = monitor.sweep().await.unwrap();
        assert_eq!(announced, 1);
        assert!(monitor.already_notified("netflix", "t1"));
        assert!(!monitor.already_notified("netflix", "t2"));

        let msg = subscriber.recv().await.unwrap();
        assert_eq!(msg.event.event_type(), "transaction_expired");

        // second sweep announces nothing new
        let announced = monitor.sweep().await.unwrap();
        assert_eq!(announced, 0);
    }

    #[tokio::test]
    async fn test_snapshot_applies_display_window() {
        let registry = create_service_registry(&DocstoreConfig::default());
        let monitor = ExpiryMonitor::new(registry.clone(), create_event_bus());

        seed_tx(&registry, "netflix", "recent", -1, false).await;
        seed_tx(&registry, "netflix", "stale", -30, false).await; // beyond 24h
        seed_tx(&registry, "netflix", "open", 5, false).await;
        seed_tx(&registry, "netflix", "gone", -1, true).await;

        let snapshot = monitor.status_snapshot("netflix").await.unwrap();
        assert_eq!(snapshot.active.len(), 1);
        assert_eq!(snapshot.expired.len(), 1);
        assert_eq!(snapshot.expired[0].id, "recent");
        assert_eq!(snapshot.hidden, 1);
    }

    #[tokio::test]
    async fn test_partitions_swept_independently() {
        let registry = create_service_registry(&DocstoreConfig::default());
        let monitor = ExpiryMonitor::new(registry.clone(), create_event_bus());

        seed_tx(&registry, "netflix", "t1", -1, false).await;
        seed_tx(&registry, "spotify", "t1", -1, false).await;

        let announced = monitor.sweep().await.unwrap();
        assert_eq!(announced, 2);
        assert!(monitor.already_notified("netflix", "t1"));
        assert!(monitor.already_notified("spotify", "t1"));
    }
}
