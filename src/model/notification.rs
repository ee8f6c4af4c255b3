//! Notifications of a message and their delivery status

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validate::{Validate, Violations};
use super::{Document, FiscalCode, Identified, VersionedDocument};

/// Delivery channel of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationChannel {
    Email,
    Webhook,
}

impl NotificationChannel {
    pub const ALL: [Self; 2] = [Self::Email, Self::Webhook];
}

/// Where the email address of a notification comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationAddressSource {
    ProfileAddress,
    DefaultAddress,
    UserAddress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailNotification {
    pub address_source: NotificationAddressSource,
    pub to_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookNotification {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NotificationChannels {
    #[serde(rename = "EMAIL", default, skip_serializing_if = "Option::is_none")]
    pub email: Option<EmailNotification>,
    #[serde(rename = "WEBHOOK", default, skip_serializing_if = "Option::is_none")]
    pub webhook: Option<WebhookNotification>,
}

impl Validate for NotificationChannels {
    fn validate(&self, v: &mut Violations) {
        if let Some(email) = &self.email {
            v.email("EMAIL.toAddress", &email.to_address);
        }
        if let Some(webhook) = &self.webhook {
            v.http_url("WEBHOOK.url", &webhook.url);
        }
    }
}

/// A notification of one message over one or more channels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    pub id: String,
    pub fiscal_code: FiscalCode,
    pub message_id: String,
    pub channels: NotificationChannels,
}

impl Document for NewNotification {
    const COLLECTION: &'static str = "notifications";
    const ENTITY: &'static str = "notification";

    fn partition_key(&self) -> &str {
        &self.message_id
    }
}

impl Identified for NewNotification {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Validate for NewNotification {
    fn validate(&self, v: &mut Violations) {
        v.non_empty("id", &self.id);
        v.non_empty("messageId", &self.message_id);
        v.nested("channels", &self.channels);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationChannelStatusValue {
    Sent,
    Throttled,
    Expired,
    Failed,
}

impl NotificationChannelStatusValue {
    pub const ALL: [Self; 4] = [Self::Expired, Self::Failed, Self::Throttled, Self::Sent];
}

/// Delivery status of a notification on one channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotificationStatus {
    pub status_id: String,
    pub notification_id: String,
    pub message_id: String,
    pub channel: NotificationChannel,
    pub status: NotificationChannelStatusValue,
    pub updated_at: DateTime<Utc>,
}

impl Document for NewNotificationStatus {
    const COLLECTION: &'static str = "notification-status";
    const ENTITY: &'static str = "notification status";

    fn partition_key(&self) -> &str {
        &self.notification_id
    }
}

impl VersionedDocument for NewNotificationStatus {
    fn model_id(&self) -> &str {
        &self.status_id
    }
}

impl Validate for NewNotificationStatus {
    fn validate(&self, v: &mut Violations) {
        v.non_empty("statusId", &self.status_id);
        v.non_empty("notificationId", &self.notification_id);
        v.non_empty("messageId", &self.message_id);
    }
}
