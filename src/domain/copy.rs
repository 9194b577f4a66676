//! Bot UI copy
//!
//! Editable text blocks the bot sends to buyers. One document per
//! service partition at `copy`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotCopy {
    pub welcome: String,
    pub help: String,
    pub payment_instructions: String,
    pub support_contact: String,
}

impl Default for BotCopy {
    fn default() -> Self {
        Self {
            welcome: "Welcome! Pick a plan to get started.".to_string(),
            help: "Use the menu below to browse plans and manage your subscription.".to_string(),
            payment_instructions: "Send the exact amount and attach the receipt.".to_string(),
            support_contact: "@support".to_string(),
        }
    }
}
