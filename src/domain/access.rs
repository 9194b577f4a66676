//! Per-admin access control
//!
//! Flat per-user lookup: an access-settings row restricts tabs and edits,
//! UI-restriction rows blur/hide/disable individual console elements.
//! An admin with no settings row is unrestricted.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Per-admin permission row (relational `access_settings` table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessSetting {
    pub user_id: String,
    pub username: String,
    /// Service partition this row applies to, empty = all
    #[serde(default)]
    pub service: String,
    pub can_modify: bool,
    #[serde(default)]
    pub restricted_tabs: Vec<String>,
}

/// How a restricted element is rendered for the affected admins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestrictionType {
    Blur,
    Hide,
    Disable,
}

impl RestrictionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blur => "blur",
            Self::Hide => "hide",
            Self::Disable => "disable",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "blur" => Some(Self::Blur),
            "hide" => Some(Self::Hide),
            "disable" => Some(Self::Disable),
            _ => None,
        }
    }
}

/// Element-level rule (relational `ui_restrictions` table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiRestriction {
    pub id: i64,
    pub element_id: String,
    pub restriction_type: RestrictionType,
    /// Admins the rule applies to
    #[serde(default)]
    pub user_ids: Vec<String>,
}

impl UiRestriction {
    pub fn applies_to(&self, user_id: &str) -> bool {
        self.user_ids.iter().any(|id| id == user_id)
    }
}

/// Resolved view of what one admin may see and do.
/// Recomputed from the raw rows on every settings change.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessPolicy {
    pub can_modify: bool,
    pub restricted_tabs: Vec<String>,
    /// element id -> how to render it
    pub elements: HashMap<String, RestrictionType>,
}

impl AccessPolicy {
    /// Default for admins with no settings row
    pub fn unrestricted() -> Self {
        Self {
            can_modify: true,
            restricted_tabs: Vec::new(),
            elements: HashMap::new(),
        }
    }

    /// Resolve the policy for one admin from the raw rows
    pub fn resolve(
        user_id: &str,
        setting: Option<&AccessSetting>,
        restrictions: &[UiRestriction],
    ) -> Self {
        let mut policy = match setting {
            Some(s) => Self {
                can_modify: s.can_modify,
                restricted_tabs: s.restricted_tabs.clone(),
                elements: HashMap::new(),
            },
            None => Self::unrestricted(),
        };

        for rule in restrictions.iter().filter(|r| r.applies_to(user_id)) {
            policy
                .elements
                .insert(rule.element_id.clone(), rule.restriction_type);
        }

        policy
    }

    pub fn is_tab_restricted(&self, tab: &str) -> bool {
        self.restricted_tabs.iter().any(|t| t == tab)
    }

    pub fn element_restriction(&self, element_id: &str) -> Option<RestrictionType> {
        self.elements.get(element_id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn restriction(id: i64, element: &str, kind: RestrictionType, users: &[&str]) -> UiRestriction {
        UiRestriction {
            id,
            element_id: element.to_string(),
            restriction_type: kind,
            user_ids: users.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_no_settings_row_defaults_to_unrestricted() {
        let policy = AccessPolicy::resolve("u1", None, &[]);
        assert!(policy.can_modify);
        assert!(!policy.is_tab_restricted("transactions"));
        assert!(policy.elements.is_empty());
    }

    #[test]
    fn test_restricted_tabs() {
        let setting = AccessSetting {
            user_id: "u1".to_string(),
            username: "helper".to_string(),
            service: String::new(),
            can_modify: false,
            restricted_tabs: vec!["credentials".to_string(), "referrals".to_string()],
        };
        let policy = AccessPolicy::resolve("u1", Some(&setting), &[]);
        assert!(!policy.can_modify);
        assert!(policy.is_tab_restricted("credentials"));
        assert!(!policy.is_tab_restricted("slots"));
    }

    #[test]
    fn test_element_rules_filter_by_user() {
        let rules = vec![
            restriction(1, "btn-delete", RestrictionType::Hide, &["u1"]),
            restriction(2, "col-password", RestrictionType::Blur, &["u2"]),
        ];
        let policy = AccessPolicy::resolve("u1", None, &rules);
        assert_eq!(
            policy.element_restriction("btn-delete"),
            Some(RestrictionType::Hide)
        );
        assert_eq!(policy.element_restriction("col-password"), None);
    }

    #[test]
    fn test_restriction_type_parse() {
        assert_eq!(RestrictionType::parse("blur"), Some(RestrictionType::Blur));
        assert_eq!(RestrictionType::parse("hide"), Some(RestrictionType::Hide));
        assert_eq!(
            RestrictionType::parse("disable"),
            Some(RestrictionType::Disable)
        );
        assert_eq!(RestrictionType::parse("shrink"), None);
    }
}
