//! Population of the seeded collections
//!
//! Profiles are created first; every message then fans out to its content
//! blob, a message status, a notification and a notification status, each
//! written strictly after the record it references. Services, message
//! statuses and notification statuses are stored twice: created, then bumped
//! to a second version with the same content.

use std::collections::BTreeSet;
use std::fmt;

use rand::Rng;
use serde_json::json;
use tracing::{debug, info};

use crate::config::{SeedSettings, ServiceSlot};
use crate::error::Error;
use crate::fixtures::FixtureFactory;
use crate::model::{
    FiscalCode, Model, NewMessage, NewMessageStatus, NewNotification, NewNotificationStatus, NewProfile,
    NewService, ServiceMetadata, ServiceScope, SpecialServiceCategory, Versioned, VersionedModel,
    MESSAGE_CONTENT_CONTAINER,
};
use crate::store::{BlobStore, DocumentStore};

/// Number of entities written by a run, versions not counted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub services: usize,
    pub profiles: usize,
    pub messages: usize,
    pub message_contents: usize,
    pub message_statuses: usize,
    pub notifications: usize,
    pub notification_statuses: usize,
}

impl fmt::Display for SeedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} services, {} profiles, {} messages ({} contents, {} statuses), {} notifications ({} statuses)",
            self.services,
            self.profiles,
            self.messages,
            self.message_contents,
            self.message_statuses,
            self.notifications,
            self.notification_statuses
        )
    }
}

/// Everything written for a single message
#[derive(Debug, Clone)]
pub struct SeededMessage {
    pub message: NewMessage,
    pub status: Versioned<NewMessageStatus>,
    pub notification: NewNotification,
    pub notification_status: Versioned<NewNotificationStatus>,
}

/// Writes fixtures through the document and blob stores
pub struct Seeder<'s, D: ?Sized, B: ?Sized, R> {
    documents: &'s D,
    blobs: &'s B,
    factory: FixtureFactory<R>,
}

impl<'s, D, B, R> Seeder<'s, D, B, R>
where
    D: DocumentStore + ?Sized,
    B: BlobStore + ?Sized,
    R: Rng,
{
    pub fn new(documents: &'s D, blobs: &'s B, factory: FixtureFactory<R>) -> Self {
        Self {
            documents,
            blobs,
            factory,
        }
    }

    /// Create a service and bump it to a second version
    ///
    /// A slot without an id gets a plain fixture. A slot with an id also
    /// carries the authorized recipients, and the special slot additionally
    /// carries national scope and the special category.
    pub async fn seed_service(
        &mut self,
        slot: &ServiceSlot,
        special: bool,
        recipients: &BTreeSet<FiscalCode>,
    ) -> Result<Versioned<NewService>, Error> {
        let mut overrides = slot.overrides();
        if slot.id.is_some() {
            overrides["authorizedRecipients"] = json!(recipients);
            if special {
                overrides["serviceMetadata"] = json!(ServiceMetadata {
                    scope: ServiceScope::National,
                    category: Some(SpecialServiceCategory::Special),
                });
            }
        }
        let service = self.factory.service(overrides)?;

        let model = VersionedModel::<D, NewService>::new(self.documents);
        let created = model.create(service).await?;
        let updated = model.bump_version(&created).await?;
        info!(service_id = %updated.entity.service_id, special, "service seeded");
        Ok(updated)
    }

    /// Seed the primary and the special service
    pub async fn seed_services(&mut self, settings: &SeedSettings, report: &mut SeedReport) -> Result<(), Error> {
        self.seed_service(&settings.primary_service, false, &settings.authorized_recipients)
            .await?;
        report.services += 1;
        self.seed_service(&settings.special_service, true, &settings.authorized_recipients)
            .await?;
        report.services += 1;
        Ok(())
    }

    pub async fn seed_user(&mut self) -> Result<NewProfile, Error> {
        let profile = self.factory.profile(json!({}))?;
        let stored = VersionedModel::<D, NewProfile>::new(self.documents)
            .create(profile)
            .await?;
        debug!(fiscal_code = %stored.entity.fiscal_code, "profile seeded");
        Ok(stored.entity)
    }

    /// Create a message for `fiscal_code` and every record hanging off it
    pub async fn seed_message(&mut self, fiscal_code: &FiscalCode) -> Result<SeededMessage, Error> {
        let message = self.factory.message(json!({ "fiscalCode": fiscal_code }))?;
        let message = Model::<D, NewMessage>::new(self.documents).create(&message).await?;

        let content = self.factory.message_content(json!({}))?;
        self.blobs
            .put_blob(
                MESSAGE_CONTENT_CONTAINER,
                &message.content_blob_name(),
                "application/json",
                serde_json::to_vec(&content)?,
            )
            .await
            .map_err(|e| Error::persistence(format!("store content of message {}", message.id), e))?;

        let status = self.factory.message_status(json!({ "messageId": message.id }))?;
        let statuses = VersionedModel::<D, NewMessageStatus>::new(self.documents);
        let status = statuses.create(status).await?;
        let status = statuses.bump_version(&status).await?;

        let notification = self.factory.notification(json!({
            "fiscalCode": fiscal_code,
            "messageId": message.id,
        }))?;
        let notification = Model::<D, NewNotification>::new(self.documents)
            .create(&notification)
            .await?;

        let notification_status = self.factory.notification_status(json!({
            "messageId": message.id,
            "notificationId": notification.id,
        }))?;
        let notification_statuses = VersionedModel::<D, NewNotificationStatus>::new(self.documents);
        let notification_status = notification_statuses.create(notification_status).await?;
        let notification_status = notification_statuses.bump_version(&notification_status).await?;

        debug!(message_id = %message.id, "message seeded");
        Ok(SeededMessage {
            message,
            status,
            notification,
            notification_status,
        })
    }

    /// Create `users` profiles with `messages_per_user` messages each
    pub async fn seed_users_and_messages(
        &mut self,
        users: usize,
        messages_per_user: usize,
        report: &mut SeedReport,
    ) -> Result<(), Error> {
        for _ in 0..users {
            let profile = self.seed_user().await?;
            report.profiles += 1;

            for _ in 0..messages_per_user {
                self.seed_message(&profile.fiscal_code).await?;
                report.messages += 1;
                report.message_contents += 1;
                report.message_statuses += 1;
                report.notifications += 1;
                report.notification_statuses += 1;
            }
            info!(fiscal_code = %profile.fiscal_code, messages = messages_per_user, "user seeded");
        }
        Ok(())
    }
}
