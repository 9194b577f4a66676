//! Transaction panel service
//!
//! Approval assigns a credential and opens the subscription window.
//! Bulk cleanup hides expired transactions and releases their
//! credentials; the two writes per item are independent path updates, so
//! an item can partially fail — failures are tallied, not rolled back.

use chrono::Utc;
use futures_util::future::join_all;
use tracing::{info, warn};

use crate::domain::{Credential, DomainError, DomainResult, Slot, Transaction, TransactionState};
use crate::infrastructure::docstore::SharedServiceRegistry;
use crate::notifications::events::{BulkCleanupEvent, Event, TransactionEvent};
use crate::notifications::SharedEventBus;

use super::{decode, encode};

const TRANSACTIONS_PREFIX: &str = "transactions";
const CREDENTIALS_PREFIX: &str = "credentials";
const SLOTS_PREFIX: &str = "slots";

fn transaction_path(id: &str) -> String {
    format!("{}/{}", TRANSACTIONS_PREFIX, id)
}

/// List filter for the transactions panel
#[derive(Debug, Default, Clone)]
pub struct TransactionFilter {
    pub state: Option<TransactionState>,
    pub include_hidden: bool,
}

/// Aggregate result of a bulk cleanup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkOutcome {
    /// Expired transactions considered
    pub total: usize,
    /// Successfully hidden
    pub hidden: usize,
    /// Items where at least one write failed
    pub failed: usize,
}

pub struct TransactionService {
    registry: SharedServiceRegistry,
    event_bus: SharedEventBus,
}

impl TransactionService {
    pub fn new(registry: SharedServiceRegistry, event_bus: SharedEventBus) -> Self {
        Self {
            registry,
            event_bus,
        }
    }

    fn transaction_event(service: &str, tx: &Transaction) -> TransactionEvent {
        TransactionEvent {
            service: service.to_string(),
            transaction_id: tx.id.clone(),
            slot_id: tx.slot_id.clone(),
            user_id: tx.user_id.clone(),
            end_time: tx.end_time,
            timestamp: Utc::now(),
        }
    }

    pub async fn list(
        &self,
        service: &str,
        filter: &TransactionFilter,
    ) -> DomainResult<Vec<Transaction>> {
        let store = self.registry.partition(service)?;
        let items = store.list(TRANSACTIONS_PREFIX).await?;
        let now = Utc::now();

        let mut transactions = Vec::with_capacity(items.len());
        for (_, doc) in items {
            let tx: Transaction = decode(doc)?;
            if tx.hidden && !filter.include_hidden {
                continue;
            }
            if let Some(state) = filter.state {
                if tx.state_at(now) != state {
                    continue;
                }
            }
            transactions.push(tx);
        }
        Ok(transactions)
    }

    pub async fn get(&self, service: &str, id: &str) -> DomainResult<Option<Transaction>> {
        let store = self.registry.partition(service)?;
        match store.fetch(&transaction_path(id)).await? {
            Some(doc) => Ok(Some(decode(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn create(&self, service: &str, transaction: Transaction) -> DomainResult<Transaction> {
        let store = self.registry.partition(service)?;
        let path = transaction_path(&transaction.id);

        if store.fetch(&path).await?.is_some() {
            return Err(DomainError::Conflict(format!(
                "Transaction {} already exists",
                transaction.id
            )));
        }

        store.set(&path, encode(&transaction)?).await?;
        info!("[{}] Transaction {} created", service, transaction.id);
        Ok(transaction)
    }

    /// Approve a payment: assign a credential (given or auto-picked),
    /// bump its usage counter and open the subscription window.
    /// Credential and transaction are written separately — no cross-path
    /// atomicity.
    pub async fn approve(
        &self,
        service: &str,
        id: &str,
        credential_id: Option<&str>,
    ) -> DomainResult<Transaction> {
        let store = self.registry.partition(service)?;

        let mut tx: Transaction = match store.fetch(&transaction_path(id)).await? {
            Some(doc) => decode(doc)?,
            None => return Err(DomainError::not_found("transaction", "id", id)),
        };
        if tx.is_approved() {
            return Err(DomainError::Conflict(format!(
                "Transaction {} is already approved",
                id
            )));
        }

        let slot: Slot = match store.fetch(&format!("{}/{}", SLOTS_PREFIX, tx.slot_id)).await? {
            Some(doc) => decode(doc)?,
            None => return Err(DomainError::not_found("slot", "id", tx.slot_id.clone())),
        };

        let now = Utc::now();

        let mut credential: Credential = match credential_id {
            Some(cid) => {
                let doc = store
                    .fetch(&format!("{}/{}", CREDENTIALS_PREFIX, cid))
                    .await?
                    .ok_or_else(|| DomainError::not_found("credential", "id", cid))?;
                let credential: Credential = decode(doc)?;
                if !credential.has_capacity() {
                    return Err(DomainError::CredentialExhausted(credential.id));
                }
                if !credential.is_assignable_at(now) {
                    return Err(DomainError::Validation(format!(
                        "Credential {} is locked or expired",
                        credential.id
                    )));
                }
                credential
            }
            None => {
                let items = store.list(CREDENTIALS_PREFIX).await?;
                let mut picked = None;
                for (_, doc) in items {
                    let credential: Credential = decode(doc)?;
                    if credential.belongs_to_slot == tx.slot_id && credential.is_assignable_at(now) {
                        picked = Some(credential);
                        break;
                    }
                }
                picked.ok_or_else(|| {
                    DomainError::Validation(format!(
                        "No assignable credential for slot {}",
                        tx.slot_id
                    ))
                })?
            }
        };

        credential.usage_count += 1;
        credential.updated_at = now;
        store
            .set(
                &format!("{}/{}", CREDENTIALS_PREFIX, credential.id),
                encode(&credential)?,
            )
            .await?;

        tx.approved_at = Some(now);
        tx.start_time = Some(now);
        tx.end_time = Some(slot.subscription_end(now));
        tx.assign_to = Some(credential.id.clone());
        store.set(&transaction_path(id), encode(&tx)?).await?;

        info!(
            "[{}] Transaction {} approved, credential {} assigned until {:?}",
            service, id, credential.id, tx.end_time
        );
        self.event_bus
            .publish(Event::TransactionApproved(Self::transaction_event(service, &tx)));
        Ok(tx)
    }

    pub async fn set_hidden(&self, service: &str, id: &str, hidden: bool) -> DomainResult<Transaction> {
        let store = self.registry.partition(service)?;

        let mut tx: Transaction = match store.fetch(&transaction_path(id)).await? {
            Some(doc) => decode(doc)?,
            None => return Err(DomainError::not_found("transaction", "id", id)),
        };

        tx.hidden = hidden;
        store.set(&transaction_path(id), encode(&tx)?).await?;
        self.event_bus
            .publish(Event::TransactionHidden(Self::transaction_event(service, &tx)));
        Ok(tx)
    }

    /// Hide every expired transaction and release its credential.
    /// Per-item failures are tallied and reported as one aggregate.
    pub async fn clear_expired(&self, service: &str) -> DomainResult<BulkOutcome> {
        let now = Utc::now();
        let expired: Vec<Transaction> = self
            .list(service, &TransactionFilter::default())
            .await?
            .into_iter()
            .filter(|tx| tx.is_expired_at(now))
            .collect();

        let results = join_all(
            expired
                .iter()
                .map(|tx| self.hide_and_release(service, tx.clone())),
        )
        .await;

        let total = results.len();
        let hidden = results.iter().filter(|r| r.is_ok()).count();
        let failed = total - hidden;

        if failed > 0 {
            warn!(
                "[{}] Bulk cleanup finished with errors: {}/{} items failed",
                service, failed, total
            );
        } else {
            info!("[{}] Bulk cleanup hid {} expired transactions", service, hidden);
        }

        self.event_bus
            .publish(Event::BulkCleanupCompleted(BulkCleanupEvent {
                service: service.to_string(),
                hidden,
                failed,
                timestamp: Utc::now(),
            }));

        Ok(BulkOutcome {
            total,
            hidden,
            failed,
        })
    }

    /// One cleanup item: hide the transaction, then decrement the
    /// assigned credential's usage counter.
    async fn hide_and_release(&self, service: &str, mut tx: Transaction) -> DomainResult<()> {
        let store = self.registry.partition(service)?;

        tx.hidden = true;
        store.set(&transaction_path(&tx.id), encode(&tx)?).await?;

        if let Some(credential_id) = tx.assign_to.as_deref() {
            let path = format!("{}/{}", CREDENTIALS_PREFIX, credential_id);
            let doc = store
                .fetch(&path)
                .await?
                .ok_or_else(|| DomainError::not_found("credential", "id", credential_id))?;
            let mut credential: Credential = decode(doc)?;
            credential.usage_count = credential.usage_count.saturating_sub(1);
            credential.updated_at = Utc::now();
            store.set(&path, encode(&credential)?).await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DocstoreConfig;
    use crate::infrastructure::docstore::{create_service_registry, SharedServiceRegistry};
    use crate::notifications::create_event_bus;
    use chrono::Duration;

    fn setup() -> (SharedServiceRegistry, TransactionService) {
        let registry = create_service_registry(&DocstoreConfig::default());
        let service = TransactionService::new(registry.clone(), create_event_bus());
        (registry, service)
    }

    async fn seed_slot(registry: &SharedServiceRegistry, id: &str, duration_hours: i64) {
        let mut slot = Slot::new(id, id);
        slot.duration_hours = duration_hours;
        let store = registry.partition("netflix").unwrap();
        store
            .set(&format!("slots/{}", id), serde_json::to_value(&slot).unwrap())
            .await
            .unwrap();
    }

    async fn seed_credential(registry: &SharedServiceRegistry, id: &str, slot: &str, max_usage: u32) {
        let now = Utc::now();
        let credential = Credential {
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
        };
        let store = registry.partition("netflix").unwrap();
        store
            .set(
                &format!("credentials/{}", id),
                serde_json::to_value(&credential).unwrap(),
            )
            .await
            .unwrap();
    }

    async fn fetch_credential(registry: &SharedServiceRegistry, id: &str) -> Credential {
        let store = registry.partition("netflix").unwrap();
        serde_json::from_value(
            store
                .fetch(&format!("credentials/{}", id))
                .await
                .unwrap()
                .unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_approve_assigns_credential_and_window() {
        let (registry, transactions) = setup();
        seed_slot(&registry, "s1", 720).await;
        seed_credential(&registry, "c1", "s1", 2).await;

        transactions
            .create("netflix", Transaction::new("t1", "s1", "u1"))
            .await
            .unwrap();

        let approved = transactions.approve("netflix", "t1", None).await.unwrap();
        assert_eq!(approved.assign_to.as_deref(), Some("c1"));
        assert!(approved.is_approved());

        let window = approved.end_time.unwrap() - approved.start_time.unwrap();
        assert_eq!(window, Duration::hours(720));

        let credential = fetch_credential(&registry, "c1").await;
        assert_eq!(credential.usage_count, 1);
    }

    #[tokio::test]
    async fn test_approve_twice_conflicts() {
        let (registry, transactions) = setup();
        seed_slot(&registry, "s1", 24).await;
        seed_credential(&registry, "c1", "s1", 2).await;
        transactions
            .create("netflix", Transaction::new("t1", "s1", "u1"))
            .await
            .unwrap();

        transactions.approve("netflix", "t1", None).await.unwrap();
        let err = transactions.approve("netflix", "t1", None).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_approve_without_capacity_fails() {
        let (registry, transactions) = setup();
        seed_slot(&registry, "s1", 24).await;
        seed_credential(&registry, "c1", "s1", 1).await;

        transactions
            .create("netflix", Transaction::new("t1", "s1", "u1"))
            .await
            .unwrap();
        transactions
            .create("netflix", Transaction::new("t2", "s1", "u2"))
            .await
            .unwrap();

        transactions.approve("netflix", "t1", None).await.unwrap();
        let err = transactions
            .approve("netflix", "t2", Some("c1"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::CredentialExhausted(_)));
    }

    #[tokio::test]
    async fn test_clear_expired_tally_and_release() {
        let (registry, transactions) = setup();
        seed_slot(&registry, "s1", 24).await;
        seed_credential(&registry, "c1", "s1", 5).await;

        let now = Utc::now();
        let store = registry.partition("netflix").unwrap();

        // two expired (one with a dangling credential), one active
        for (id, credential, offset_hours) in [
            ("t1", Some("c1"), -2i64),
            ("t2", Some("ghost"), -3),
            ("t3", Some("c1"), 2),
        ] {
            let mut tx = Transaction::new(id, "s1", "u1");
            tx.start_time = Some(now - Duration::hours(24));
            tx.end_time = Some(now + Duration::hours(offset_hours));
            tx.approved_at = tx.start_time;
            tx.assign_to = credential.map(String::from);
            store
                .set(
                    &format!("transactions/{}", id),
                    serde_json::to_value(&tx).unwrap(),
                )
                .await
                .unwrap();
        }
        // both expired transactions hold the credential
        let mut credential = fetch_credential(&registry, "c1").await;
        credential.usage_count = 2;
        store
            .set(
                "credentials/c1",
                serde_json::to_value(&credential).unwrap(),
            )
            .await
            .unwrap();

        let outcome = transactions.clear_expired("netflix").await.unwrap();
        assert_eq!(outcome.total, 2);
        assert_eq!(outcome.hidden, 1);
        assert_eq!(outcome.failed, 1); // ghost credential

        // released one seat
        let credential = fetch_credential(&registry, "c1").await;
        assert_eq!(credential.usage_count, 1);

        // active transaction untouched
        let active = transactions.get("netflix", "t3").await.unwrap().unwrap();
        assert!(!active.hidden);
    }

    #[tokio::test]
    async fn test_list_filters_state_and_hidden() {
        let (registry, transactions) = setup();
        let now = Utc::now();
        let store = registry.partition("netflix").unwrap();

        let mut active = Transaction::new("t1", "s1", "u1");
        active.end_time = Some(now + Duration::hours(1));
        let mut expired = Transaction::new("t2", "s1", "u1");
        expired.end_time = Some(now - Duration::hours(1));
        let mut hidden = Transaction::new("t3", "s1", "u1");
        hidden.hidden = true;

        for tx in [&active, &expired, &hidden] {
            store
                .set(
                    &format!("transactions/{}", tx.id),
                    serde_json::to_value(tx).unwrap(),
                )
                .await
                .unwrap();
        }

        let visible = transactions
            .list("netflix", &TransactionFilter::default())
            .await
            .unwrap();
        assert_eq!(visible.len(), 2);

        let only_active = transactions
            .list(
                "netflix",
                &TransactionFilter {
                    state: Some(TransactionState::Active),
                    include_hidden: false,
                },
            )
            .await
            .unwrap();
        assert_eq!(only_active.len(), 1);
        assert_eq!(only_active[0].id, "t1");

        let all = transactions
            .list(
                "netflix",
                &TransactionFilter {
                    state: None,
                    include_hidden: true,
                },
            )
            .await
            .unwrap();
        assert_eq!(all.len(), 3);
    }
}
