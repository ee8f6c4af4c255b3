//! Development environment seeding
//!
//! Provisions a Cosmos DB database with its collections plus the blob
//! containers, queues and tables of an Azure Storage account (or their local
//! emulators), then fills the collections with synthetic services, profiles,
//! messages and notifications.

pub mod config;
pub mod cosmos;
pub mod error;
pub mod fetch;
pub mod fixtures;
pub mod model;
pub mod pipeline;
pub mod provision;
pub mod seed;
pub mod storage;
pub mod store;
pub mod topology;

use reqwest::Client;

use crate::config::{ConnectionSettings, SeedOptions};
use crate::cosmos::{CosmosClient, DatabaseClient};
use crate::error::Error;
use crate::pipeline::Pipeline;
use crate::provision::Provisioner;
use crate::storage::{BlobServiceClient, QueueServiceClient, StorageAccount, TableServiceClient};

/// Long-lived handles on every service a run talks to
pub struct DevEnvironment {
    /// HTTP client shared by every service client
    pub http_client: Client,
    pub cosmos: CosmosClient,
    /// The database being seeded
    pub database: DatabaseClient,
    pub blobs: BlobServiceClient,
    pub queues: QueueServiceClient,
    pub tables: TableServiceClient,
}

impl DevEnvironment {
    /// Build the clients for the configured database and storage account
    ///
    /// No request is sent; a malformed key, URI or connection string fails
    /// here.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use devseed::{DevEnvironment, config::{SeedOptions, Settings}};
    ///
    /// let settings = Settings::from_env()?;
    /// let env = DevEnvironment::connect(&settings.connection, &SeedOptions::default())?;
    /// # Ok::<(), devseed::error::Error>(())
    /// ```
    pub fn connect(settings: &ConnectionSettings, options: &SeedOptions) -> Result<Self, Error> {
        let http_client = Client::builder()
            .timeout(options.request_timeout)
            .danger_accept_invalid_certs(options.accept_invalid_certs)
            .build()?;

        let cosmos = CosmosClient::new(&settings.cosmos_uri, &settings.cosmos_key, http_client.clone())?;
        let database = cosmos.database(&settings.database_name);

        let account = StorageAccount::from_connection_string(&settings.storage_connection_string)?;
        tracing::debug!(?account, "storage account");

        Ok(Self {
            blobs: BlobServiceClient::new(&account, http_client.clone())?,
            queues: QueueServiceClient::new(&account, http_client.clone())?,
            tables: TableServiceClient::new(&account, http_client.clone())?,
            http_client,
            cosmos,
            database,
        })
    }

    pub fn provisioner(&self) -> Provisioner<'_> {
        Provisioner::new(self)
    }

    /// A run provisioning this environment and seeding its database
    pub fn pipeline<'a>(
        &'a self,
        settings: &'a config::SeedSettings,
        options: &'a SeedOptions,
    ) -> Pipeline<'a, DatabaseClient, BlobServiceClient> {
        Pipeline::new(&self.database, &self.blobs, settings, options).with_provisioner(self.provisioner())
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::config::{SeedOptions, SeedSettings, Settings};
    pub use crate::error::Error;
    pub use crate::fixtures::FixtureFactory;
    pub use crate::pipeline::{Pipeline, PipelineError, Stage};
    pub use crate::seed::SeedReport;
    pub use crate::store::MemoryStore;
    pub use crate::DevEnvironment;
}
