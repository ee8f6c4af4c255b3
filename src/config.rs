//! Configuration read from the environment and the command line

use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use serde_json::{json, Value};
use tracing::warn;

use crate::error::Error;
use crate::model::FiscalCode;

pub const COSMOSDB_KEY: &str = "COSMOSDB_KEY";
pub const COSMOSDB_URI: &str = "COSMOSDB_URI";
pub const COSMOSDB_NAME: &str = "COSMOSDB_NAME";
pub const STORAGE_CONNECTION_STRING: &str = "STORAGE_CONNECTION_STRING";
pub const REQ_SERVICE_ID: &str = "REQ_SERVICE_ID";
pub const REQ_SPECIAL_SERVICE_ID: &str = "REQ_SPECIAL_SERVICE_ID";
pub const AUTHORIZED_RECIPIENTS: &str = "AUTHORIZED_RECIPIENTS";

/// Where the database and the storage account live
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub cosmos_key: String,
    pub cosmos_uri: String,
    pub database_name: String,
    pub storage_connection_string: String,
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("cosmos_key", &"<redacted>")
            .field("cosmos_uri", &self.cosmos_uri)
            .field("database_name", &self.database_name)
            .field("storage_connection_string", &"<redacted>")
            .finish()
    }
}

impl ConnectionSettings {
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            non_empty(lookup(name)).ok_or_else(|| Error::config(format!("{} is not set", name)))
        };

        Ok(Self {
            cosmos_key: required(COSMOSDB_KEY)?,
            cosmos_uri: required(COSMOSDB_URI)?,
            database_name: required(COSMOSDB_NAME)?,
            storage_connection_string: required(STORAGE_CONNECTION_STRING)?,
        })
    }
}

/// A service created with a requested id, or a random one when unset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceSlot {
    pub id: Option<String>,
}

impl ServiceSlot {
    pub fn new(id: Option<String>) -> Self {
        Self { id: non_empty(id) }
    }

    /// Fixture overrides pinning the service id, when one is requested
    pub fn overrides(&self) -> Value {
        match &self.id {
            Some(id) => json!({ "serviceId": id }),
            None => json!({}),
        }
    }
}

/// Optional values shaping the seeded services
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedSettings {
    pub primary_service: ServiceSlot,
    pub special_service: ServiceSlot,
    pub authorized_recipients: BTreeSet<FiscalCode>,
}

impl SeedSettings {
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            primary_service: ServiceSlot::new(lookup(REQ_SERVICE_ID)),
            special_service: ServiceSlot::new(lookup(REQ_SPECIAL_SERVICE_ID)),
            authorized_recipients: lookup(AUTHORIZED_RECIPIENTS)
                .map(|list| parse_recipients(&list))
                .unwrap_or_default(),
        }
    }
}

/// Parse a comma separated list of fiscal codes, dropping invalid entries
pub fn parse_recipients(list: &str) -> BTreeSet<FiscalCode> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| match FiscalCode::parse(entry) {
            Ok(code) => Some(code),
            Err(err) => {
                warn!(%err, "ignoring authorized recipient");
                None
            }
        })
        .collect()
}

/// Everything read from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub connection: ConnectionSettings,
    pub seed: SeedSettings,
}

impl Settings {
    /// Read the process environment
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            connection: ConnectionSettings::from_lookup(&lookup)?,
            seed: SeedSettings::from_lookup(&lookup),
        })
    }
}

/// Knobs of a seeding run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedOptions {
    /// Number of profiles to create
    pub users: usize,

    /// Number of messages per profile
    pub messages_per_user: usize,

    /// Timeout of every HTTP request
    pub request_timeout: Duration,

    /// Accept self-signed certificates, as served by the emulators
    pub accept_invalid_certs: bool,

    /// Attach the inbox composite index to the message collections
    pub composite_index: bool,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            users: 10,
            messages_per_user: 10,
            request_timeout: Duration::from_secs(30),
            accept_invalid_certs: false,
            composite_index: true,
        }
    }
}

impl SeedOptions {
    pub fn with_users(mut self, value: usize) -> Self {
        self.users = value;
        self
    }

    pub fn with_messages_per_user(mut self, value: usize) -> Self {
        self.messages_per_user = value;
        self
    }

    pub fn with_request_timeout(mut self, value: Duration) -> Self {
        self.request_timeout = value;
        self
    }

    pub fn with_accept_invalid_certs(mut self, value: bool) -> Self {
        self.accept_invalid_certs = value;
        self
    }

    pub fn with_composite_index(mut self, value: bool) -> Self {
        self.composite_index = value;
        self
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
