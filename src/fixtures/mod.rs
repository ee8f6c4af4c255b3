//! Random fixture records
//!
//! Every builder generates a complete default payload, merges the caller's
//! overrides over it and decodes the result through the entity schema, so a
//! bad override surfaces as a [`DecodeReport`] naming the offending field.

mod words;

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::model::{
    decode, DecodeReport, FiscalCode, MessageContent, MessageStatusValue, NewMessage, NewMessageStatus,
    NewNotification, NewNotificationStatus, NewProfile, NewService, NotificationChannel,
    NotificationChannelStatusValue,
};

/// Endpoint the notification fixtures point their webhook at
pub const WEBHOOK_URL: &str = "https://app-backend.io.italia.it/api/v1/notify?token=secret";

const SECONDS_PER_YEAR: i64 = 365 * 24 * 60 * 60;

/// Generate a fiscal code that can never belong to a real person
///
/// The shape follows the real grammar (6 letters, then digits spliced with
/// the fixed letters `A`, `Y` and `X`) but the place code starts with `Y`,
/// which no municipality or foreign state uses.
pub fn fake_fiscal_code<R: Rng + ?Sized>(rng: &mut R) -> FiscalCode {
    let letters = std::array::from_fn(|_| char::from(rng.gen_range(b'A'..=b'Z')));
    let digits = std::array::from_fn(|_| char::from(rng.gen_range(b'0'..=b'9')));
    FiscalCode::synthetic(letters, digits)
}

/// Overlay the keys of `overrides` on `defaults`
///
/// `null` keeps the defaults untouched. A non-object override replaces the
/// payload entirely and is left to the decoder to reject.
pub fn merge(defaults: Value, overrides: Value) -> Value {
    match (defaults, overrides) {
        (defaults, Value::Null) => defaults,
        (Value::Object(mut base), Value::Object(extra)) => {
            base.extend(extra);
            Value::Object(base)
        }
        (_, overrides) => overrides,
    }
}

/// Builds randomized, schema-valid entities
pub struct FixtureFactory<R = StdRng> {
    rng: R,
}

impl FixtureFactory<StdRng> {
    /// A factory seeded from the operating system
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// A reproducible factory
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> FixtureFactory<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn fiscal_code(&mut self) -> FiscalCode {
        fake_fiscal_code(&mut self.rng)
    }

    /// A fresh time-ordered identifier
    pub fn id(&mut self) -> String {
        Uuid::now_v7().to_string()
    }

    pub fn service(&mut self, overrides: Value) -> Result<NewService, DecodeReport> {
        let defaults = json!({
            "authorizedCIDRs": [],
            "authorizedRecipients": [],
            "departmentName": self.words(2),
            "isVisible": true,
            "maxAllowedPaymentAmount": self.rng.gen_range(1..=10_000u64),
            "organizationFiscalCode": self.digits(11),
            "organizationName": self.company_name(),
            "requireSecureChannels": self.rng.gen_bool(0.5),
            "serviceId": self.id(),
            "serviceName": self.catch_phrase(),
        });
        decode("service", merge(defaults, overrides))
    }

    pub fn profile(&mut self, overrides: Value) -> Result<NewProfile, DecodeReport> {
        let blocked_id = self.id();
        let blocked = if self.rng.gen_bool(0.5) { "WEBHOOK" } else { "EMAIL" };
        let defaults = json!({
            "acceptedTosVersion": self.rng.gen_range(0..=2u32),
            "blockedInboxOrChannels": { blocked_id: [blocked] },
            "email": self.email(),
            "fiscalCode": self.fiscal_code(),
            "isEmailEnabled": self.rng.gen_bool(0.5),
            "isEmailValidated": self.rng.gen_bool(0.5),
            "isInboxEnabled": self.rng.gen_bool(0.5),
            "isWebhookEnabled": self.rng.gen_bool(0.5),
        });
        decode("profile", merge(defaults, overrides))
    }

    pub fn message(&mut self, overrides: Value) -> Result<NewMessage, DecodeReport> {
        let defaults = json!({
            "createdAt": self.past_date(),
            "fiscalCode": self.fiscal_code(),
            "id": self.id(),
            "indexedId": self.id(),
            "isPending": self.rng.gen_bool(0.5),
            "senderServiceId": self.word(),
            "senderUserId": self.word(),
            "timeToLiveSeconds": self.rng.gen_range(3600..=10_000u32),
        });
        decode("message", merge(defaults, overrides))
    }

    pub fn message_content(&mut self, overrides: Value) -> Result<MessageContent, DecodeReport> {
        let defaults = json!({
            "markdown": self.lorem(100),
            "subject": self.lorem(5),
        });
        decode("message content", merge(defaults, overrides))
    }

    pub fn message_status(&mut self, overrides: Value) -> Result<NewMessageStatus, DecodeReport> {
        let defaults = json!({
            "messageId": self.id(),
            "status": self.pick(&MessageStatusValue::ALL),
            "updatedAt": self.past_date(),
        });
        decode("message status", merge(defaults, overrides))
    }

    pub fn notification(&mut self, overrides: Value) -> Result<NewNotification, DecodeReport> {
        let defaults = json!({
            "channels": {
                "EMAIL": {
                    "addressSource": "PROFILE_ADDRESS",
                    "toAddress": self.email(),
                },
                "WEBHOOK": { "url": WEBHOOK_URL },
            },
            "fiscalCode": self.fiscal_code(),
            "id": self.id(),
            "messageId": self.id(),
        });
        decode("notification", merge(defaults, overrides))
    }

    pub fn notification_status(&mut self, overrides: Value) -> Result<NewNotificationStatus, DecodeReport> {
        let defaults = json!({
            "channel": self.pick(&NotificationChannel::ALL),
            "messageId": self.id(),
            "notificationId": self.id(),
            "status": self.pick(&NotificationChannelStatusValue::ALL),
            "statusId": self.id(),
            "updatedAt": self.past_date(),
        });
        decode("notification status", merge(defaults, overrides))
    }

    fn pick<T: Copy>(&mut self, values: &[T]) -> T {
        values[self.rng.gen_range(0..values.len())]
    }

    fn word(&mut self) -> &'static str {
        self.pick(words::WORDS)
    }

    fn words(&mut self, count: usize) -> String {
        (0..count).map(|_| self.word()).collect::<Vec<_>>().join(" ")
    }

    fn lorem(&mut self, count: usize) -> String {
        (0..count)
            .map(|_| self.pick(words::LOREM))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn digits(&mut self, count: usize) -> String {
        (0..count)
            .map(|_| char::from(self.rng.gen_range(b'0'..=b'9')))
            .collect()
    }

    fn company_name(&mut self) -> String {
        let name = self.pick(words::LAST_NAMES);
        let mut chars = name.chars();
        let capitalized: String = chars
            .next()
            .map(|c| c.to_ascii_uppercase())
            .into_iter()
            .chain(chars)
            .collect();
        format!("{} {}", capitalized, self.pick(words::COMPANY_SUFFIXES))
    }

    fn catch_phrase(&mut self) -> String {
        format!(
            "{} {} {}",
            self.pick(words::BUZZ_VERBS),
            self.pick(words::BUZZ_ADJECTIVES),
            self.pick(words::BUZZ_NOUNS)
        )
    }

    fn email(&mut self) -> String {
        format!(
            "{}.{}{}@{}",
            self.pick(words::FIRST_NAMES),
            self.pick(words::LAST_NAMES),
            self.rng.gen_range(0..100),
            self.pick(words::EMAIL_DOMAINS)
        )
    }

    fn past_date(&mut self) -> DateTime<Utc> {
        Utc::now() - Duration::seconds(self.rng.gen_range(1..=SECONDS_PER_YEAR))
    }
}
