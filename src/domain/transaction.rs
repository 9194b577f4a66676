//! Purchase transaction and its wall-clock classification
//!
//! There is no stored state machine: a transaction is classified
//! active/expired by comparing `end_time` against the clock at read time,
//! and the expired list is further trimmed to a rolling display window.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A purchase of a slot by a bot user. Stored at `transactions/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,

    /// Slot that was purchased
    pub slot_id: String,

    /// Bot user who paid
    pub user_id: String,

    /// Subscription window, set on approval
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,

    /// When an admin approved the payment
    pub approved_at: Option<DateTime<Utc>>,

    /// Credential handed to the buyer
    pub assign_to: Option<String>,

    /// Hidden transactions are kept but dropped from every panel
    #[serde(default)]
    pub hidden: bool,

    pub created_at: DateTime<Utc>,
}

/// Classification recomputed on every read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionState {
    /// Paid but not yet approved (no subscription window)
    Pending,
    /// Subscription window still open
    Active,
    /// Window closed
    Expired,
}

impl Transaction {
    pub fn new(id: impl Into<String>, slot_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            slot_id: slot_id.into(),
            user_id: user_id.into(),
            start_time: None,
            end_time: None,
            approved_at: None,
            assign_to: None,
            hidden: false,
            created_at: Utc::now(),
        }
    }

    /// Classify against `now`. A window ending exactly at `now` is expired.
    pub fn state_at(&self, now: DateTime<Utc>) -> TransactionState {
        match self.end_time {
            None => TransactionState::Pending,
            Some(end) if end > now => TransactionState::Active,
            Some(_) => TransactionState::Expired,
        }
    }

    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.state_at(now) == TransactionState::Active
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.state_at(now) == TransactionState::Expired
    }

    /// Whether an expired transaction still belongs in the expired panel:
    /// only windows closed within the last `window` are shown.
    pub fn in_display_window(&self, now: DateTime<Utc>, window: Duration) -> bool {
        match self.end_time {
            Some(end) if end <= now => now - end <= window,
            _ => false,
        }
    }

    pub fn is_approved(&self) -> bool {
        self.approved_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx_ending_at(end: DateTime<Utc>) -> Transaction {
        let mut tx = Transaction::new("t1", "s1", "u1");
        tx.start_time = Some(end - Duration::hours(720));
        tx.end_time = Some(end);
        tx.approved_at = tx.start_time;
        tx
    }

    #[test]
    fn test_no_window_is_pending() {
        let tx = Transaction::new("t1", "s1", "u1");
        assert_eq!(tx.state_at(Utc::now()), TransactionState::Pending);
    }

    #[test]
    fn test_end_in_future_is_active() {
        let now = Utc::now();
        let tx = tx_ending_at(now + Duration::seconds(1));
        assert_eq!(tx.state_at(now), TransactionState::Active);
    }

    #[test]
    fn test_end_exactly_now_is_expired() {
        let now = Utc::now();
        let tx = tx_ending_at(now);
        assert_eq!(tx.state_at(now), TransactionState::Expired);
    }

    #[test]
    fn test_display_window_inclusive_at_24h() {
        let now = Utc::now();
        let window = Duration::hours(24);

        let tx = tx_ending_at(now - Duration::hours(24));
        assert!(tx.in_display_window(now, window));
    }

    #[test]
    fn test_display_window_excludes_24h_plus_1s() {
        let now = Utc::now();
        let window = Duration::hours(24);

        let tx = tx_ending_at(now - Duration::hours(24) - Duration::seconds(1));
        assert!(tx.is_expired_at(now));
        assert!(!tx.in_display_window(now, window));
    }

    #[test]
    fn test_active_never_in_display_window() {
        let now = Utc::now();
        let tx = tx_ending_at(now + Duration::hours(1));
        assert!(!tx.in_display_window(now, Duration::hours(24)));
    }
}
