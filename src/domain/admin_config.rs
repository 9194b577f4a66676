//! Admin tiers
//!
//! Two flat id lists stored at `admin_config` in the global partition.
//! Superior admins bypass every restriction and own the permission
//! panels; inferior admins are regular console users.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdminConfig {
    #[serde(default)]
    pub superior_admins: Vec<String>,
    #[serde(default)]
    pub inferior_admins: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminTier {
    Superior,
    Inferior,
    /// Not listed in either group
    Unknown,
}

impl AdminConfig {
    pub fn tier_for(&self, user_id: &str) -> AdminTier {
        if self.superior_admins.iter().any(|id| id == user_id) {
            AdminTier::Superior
        } else if self.inferior_admins.iter().any(|id| id == user_id) {
            AdminTier::Inferior
        } else {
            AdminTier::Unknown
        }
    }

    pub fn is_superior(&self, user_id: &str) -> bool {
        self.tier_for(user_id) == AdminTier::Superior
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_lookup() {
        let cfg = AdminConfig {
            superior_admins: vec!["boss".to_string()],
            inferior_admins: vec!["helper".to_string()],
        };
        assert_eq!(cfg.tier_for("boss"), AdminTier::Superior);
        assert_eq!(cfg.tier_for("helper"), AdminTier::Inferior);
        assert_eq!(cfg.tier_for("nobody"), AdminTier::Unknown);
        assert!(cfg.is_superior("boss"));
        assert!(!cfg.is_superior("helper"));
    }

    #[test]
    fn test_superior_wins_when_listed_twice() {
        let cfg = AdminConfig {
            superior_admins: vec!["both".to_string()],
            inferior_admins: vec!["both".to_string()],
        };
        assert_eq!(cfg.tier_for("both"), AdminTier::Superior);
    }
}
