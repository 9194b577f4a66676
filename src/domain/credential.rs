//! Shared login credential

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A shared login assigned to a slot, with usage and lock tracking.
/// Stored at `credentials/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub id: String,

    pub email: String,
    pub password: String,

    /// Extra secret the account needs (profile PIN, 2FA seed), optional
    #[serde(default)]
    pub secret: Option<String>,

    /// When the upstream account itself expires
    pub expiry_date: Option<DateTime<Utc>>,

    /// Locked credentials are never handed out
    #[serde(default)]
    pub locked: bool,

    /// How many buyers may share this login at once
    pub max_usage: u32,

    /// How many buyers currently hold it
    #[serde(default)]
    pub usage_count: u32,

    /// Slot this credential is sold under
    pub belongs_to_slot: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Credential {
    /// Whether the upstream account has expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date.is_some_and(|d| d <= now)
    }

    pub fn has_capacity(&self) -> bool {
        self.usage_count < self.max_usage
    }

    /// Whether this credential may be assigned to a new buyer
    pub fn is_assignable_at(&self, now: DateTime<Utc>) -> bool {
        !self.locked && self.has_capacity() && !self.is_expired_at(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential() -> Credential {
        let now = Utc::now();
        Credential {
            id: "c1".to_string(),
            email: "shared@example.com".to_string(),
            password: "pw".to_string(),
            secret: None,
            expiry_date: None,
            locked: false,
            max_usage: 2,
            usage_count: 0,
            belongs_to_slot: "s1".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_capacity() {
        let mut c = credential();
        assert!(c.has_capacity());
        c.usage_count = 2;
        assert!(!c.has_capacity());
        assert!(!c.is_assignable_at(Utc::now()));
    }

    #[test]
    fn test_locked_never_assignable() {
        let mut c = credential();
        c.locked = true;
        assert!(!c.is_assignable_at(Utc::now()));
    }

    #[test]
    fn test_expiry_boundary() {
        let mut c = credential();
        let now = Utc::now();
        c.expiry_date = Some(now);
        // expiring exactly now counts as expired
        assert!(c.is_expired_at(now));
        c.expiry_date = Some(now + chrono::Duration::seconds(1));
        assert!(!c.is_expired_at(now));
    }
}
