//! User profiles

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::validate::{Validate, Violations};
use super::{Document, FiscalCode, VersionedDocument};

/// Channel a user can block for a given service
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockedInboxOrChannel {
    Email,
    Inbox,
    Webhook,
}

/// A user profile, keyed by fiscal code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProfile {
    pub fiscal_code: FiscalCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_tos_version: Option<u32>,
    pub is_email_enabled: bool,
    pub is_email_validated: bool,
    pub is_inbox_enabled: bool,
    pub is_webhook_enabled: bool,
    /// Service id to blocked channels
    #[serde(default)]
    pub blocked_inbox_or_channels: BTreeMap<String, BTreeSet<BlockedInboxOrChannel>>,
}

impl Document for NewProfile {
    const COLLECTION: &'static str = "profiles";
    const ENTITY: &'static str = "profile";

    fn partition_key(&self) -> &str {
        self.fiscal_code.as_str()
    }
}

impl VersionedDocument for NewProfile {
    fn model_id(&self) -> &str {
        self.fiscal_code.as_str()
    }
}

impl Validate for NewProfile {
    fn validate(&self, v: &mut Violations) {
        if let Some(email) = &self.email {
            v.email("email", email);
        }
        for service_id in self.blocked_inbox_or_channels.keys() {
            v.non_empty("blockedInboxOrChannels", service_id);
        }
    }
}
