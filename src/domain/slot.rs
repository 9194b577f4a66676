//! Subscription slot (purchasable plan)

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A purchasable subscription plan. Stored at `slots/{id}`, keyed by an
/// arbitrary string id chosen by the console.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub id: String,

    /// Display name shown in the bot (e.g. "1 Month / 1 Screen")
    pub name: String,

    /// Subscription duration granted on purchase
    pub duration_hours: i64,

    /// Price the buyer must pay
    pub required_amount: Decimal,

    /// Disabled slots are kept but not sold
    pub enabled: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Slot {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            duration_hours: 0,
            required_amount: Decimal::ZERO,
            enabled: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// End of a subscription window started at `start`
    pub fn subscription_end(&self, start: DateTime<Utc>) -> DateTime<Utc> {
        start + chrono::Duration::hours(self.duration_hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_end() {
        let mut slot = Slot::new("s1", "1 Month");
        slot.duration_hours = 720;
        let start = Utc::now();
        assert_eq!(slot.subscription_end(start), start + chrono::Duration::hours(720));
    }
}
