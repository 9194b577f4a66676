//! Referral program records

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Program-wide knobs, stored at `referrals/settings` per partition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferralSettings {
    pub enabled: bool,
    /// Bonus credited to the referrer per approved purchase
    pub bonus_amount: Decimal,
    /// Balance required before a payout may be requested
    pub min_withdrawal: Decimal,
}

impl Default for ReferralSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            bonus_amount: Decimal::ZERO,
            min_withdrawal: Decimal::ZERO,
        }
    }
}

/// Per-user counters, stored at `referrals/users/{user_id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferralStat {
    pub user_id: String,
    #[serde(default)]
    pub referred_by: Option<String>,
    #[serde(default)]
    pub invited_count: u32,
    #[serde(default)]
    pub bonus_balance: Decimal,
}

impl ReferralStat {
    pub fn can_withdraw(&self, settings: &ReferralSettings) -> bool {
        settings.enabled
            && self.bonus_balance >= settings.min_withdrawal
            && self.bonus_balance > Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_withdrawal_threshold() {
        let settings = ReferralSettings {
            enabled: true,
            bonus_amount: Decimal::new(150, 2),
            min_withdrawal: Decimal::from(10),
        };
        let mut stat = ReferralStat {
            user_id: "u1".to_string(),
            referred_by: None,
            invited_count: 3,
            bonus_balance: Decimal::new(450, 2),
        };
        assert!(!stat.can_withdraw(&settings));
        stat.bonus_balance = Decimal::from(10);
        assert!(stat.can_withdraw(&settings));
    }

    #[test]
    fn test_disabled_program_blocks_withdrawal() {
        let settings = ReferralSettings::default();
        let stat = ReferralStat {
            user_id: "u1".to_string(),
            referred_by: None,
            invited_count: 0,
            bonus_balance: Decimal::from(100),
        };
        assert!(!stat.can_withdraw(&settings));
    }
}
