//! Messages, their content and their processing status

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validate::{Validate, Violations};
use super::{Document, FiscalCode, Identified, VersionedDocument};

/// Blob container holding message contents
pub const MESSAGE_CONTENT_CONTAINER: &str = "message-content";

pub const MIN_TIME_TO_LIVE_SECONDS: u32 = 3600;
pub const MAX_TIME_TO_LIVE_SECONDS: u32 = 604_800;

/// A message addressed to a user; its content is stored separately
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    pub id: String,
    pub indexed_id: String,
    pub fiscal_code: FiscalCode,
    pub created_at: DateTime<Utc>,
    pub sender_service_id: String,
    pub sender_user_id: String,
    #[serde(default)]
    pub is_pending: bool,
    pub time_to_live_seconds: u32,
}

impl NewMessage {
    /// Name of the blob holding this message's content
    pub fn content_blob_name(&self) -> String {
        format!("{}.json", self.id)
    }
}

impl Document for NewMessage {
    const COLLECTION: &'static str = "messages";
    const ENTITY: &'static str = "message";

    fn partition_key(&self) -> &str {
        self.fiscal_code.as_str()
    }
}

impl Identified for NewMessage {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Validate for NewMessage {
    fn validate(&self, v: &mut Violations) {
        v.non_empty("id", &self.id);
        v.non_empty("indexedId", &self.indexed_id);
        v.non_empty("senderServiceId", &self.sender_service_id);
        v.non_empty("senderUserId", &self.sender_user_id);
        v.in_range(
            "timeToLiveSeconds",
            self.time_to_live_seconds,
            MIN_TIME_TO_LIVE_SECONDS,
            MAX_TIME_TO_LIVE_SECONDS,
        );
    }
}

/// Subject and markdown body of a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageContent {
    pub subject: String,
    pub markdown: String,
}

impl Validate for MessageContent {
    fn validate(&self, v: &mut Violations) {
        v.char_length("subject", &self.subject, 10, 120);
        v.char_length("markdown", &self.markdown, 80, 10_000);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageStatusValue {
    Accepted,
    Failed,
    Processed,
    Rejected,
    Throttled,
}

impl MessageStatusValue {
    pub const ALL: [Self; 5] = [
        Self::Accepted,
        Self::Failed,
        Self::Processed,
        Self::Rejected,
        Self::Throttled,
    ];
}

/// Processing status of a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessageStatus {
    pub message_id: String,
    pub status: MessageStatusValue,
    pub updated_at: DateTime<Utc>,
}

impl Document for NewMessageStatus {
    const COLLECTION: &'static str = "message-status";
    const ENTITY: &'static str = "message status";

    fn partition_key(&self) -> &str {
        &self.message_id
    }
}

impl VersionedDocument for NewMessageStatus {
    fn model_id(&self) -> &str {
        &self.message_id
    }
}

impl Validate for NewMessageStatus {
    fn validate(&self, v: &mut Violations) {
        v.non_empty("messageId", &self.message_id);
    }
}
