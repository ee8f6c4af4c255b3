//! Idempotent creation of the database, collections and storage resources
//!
//! Every `ensure_*` call succeeds when the resource already exists. Within a
//! group the calls run concurrently and the first failure wins.

use futures::future::try_join_all;
use tracing::info;

use crate::cosmos::{CollectionDefinition, CosmosClient, DatabaseClient};
use crate::error::Error;
use crate::storage::{BlobServiceClient, QueueServiceClient, TableServiceClient};
use crate::DevEnvironment;

/// Ensures the storage topology exists
pub struct Provisioner<'a> {
    cosmos: &'a CosmosClient,
    database: &'a DatabaseClient,
    blobs: &'a BlobServiceClient,
    queues: &'a QueueServiceClient,
    tables: &'a TableServiceClient,
}

impl<'a> Provisioner<'a> {
    pub fn new(env: &'a DevEnvironment) -> Self {
        Self {
            cosmos: &env.cosmos,
            database: &env.database,
            blobs: &env.blobs,
            queues: &env.queues,
            tables: &env.tables,
        }
    }

    pub async fn ensure_database(&self) -> Result<bool, Error> {
        let name = self.database.id();
        let created = self
            .cosmos
            .create_database_if_not_exists(name)
            .await
            .map_err(|e| Error::provision(format!("database {}", name), e))?;
        info!(database = name, created, "database ready");
        Ok(created)
    }

    pub async fn ensure_collection(&self, definition: &CollectionDefinition) -> Result<bool, Error> {
        let created = self
            .database
            .create_collection_if_not_exists(definition)
            .await
            .map_err(|e| Error::provision(format!("collection {}", definition.id), e))?;
        info!(collection = %definition.id, created, "collection ready");
        Ok(created)
    }

    pub async fn ensure_container(&self, name: &str) -> Result<bool, Error> {
        let created = self
            .blobs
            .create_container_if_not_exists(name)
            .await
            .map_err(|e| Error::provision(format!("container {}", name), e))?;
        info!(container = name, created, "container ready");
        Ok(created)
    }

    pub async fn ensure_queue(&self, name: &str) -> Result<bool, Error> {
        let created = self
            .queues
            .create_queue_if_not_exists(name)
            .await
            .map_err(|e| Error::provision(format!("queue {}", name), e))?;
        info!(queue = name, created, "queue ready");
        Ok(created)
    }

    pub async fn ensure_table(&self, name: &str) -> Result<bool, Error> {
        let created = self
            .tables
            .create_table_if_not_exists(name)
            .await
            .map_err(|e| Error::provision(format!("table {}", name), e))?;
        info!(table = name, created, "table ready");
        Ok(created)
    }

    /// Ensure every collection, returning how many were newly created
    pub async fn ensure_collections(&self, definitions: &[CollectionDefinition]) -> Result<usize, Error> {
        let created = try_join_all(definitions.iter().map(|d| self.ensure_collection(d))).await?;
        Ok(count_created(&created))
    }

    pub async fn ensure_containers(&self, names: &[String]) -> Result<usize, Error> {
        let created = try_join_all(names.iter().map(|name| self.ensure_container(name))).await?;
        Ok(count_created(&created))
    }

    pub async fn ensure_queues(&self, names: &[String]) -> Result<usize, Error> {
        let created = try_join_all(names.iter().map(|name| self.ensure_queue(name))).await?;
        Ok(count_created(&created))
    }

    pub async fn ensure_tables(&self, names: &[String]) -> Result<usize, Error> {
        let created = try_join_all(names.iter().map(|name| self.ensure_table(name))).await?;
        Ok(count_created(&created))
    }
}

fn count_created(results: &[bool]) -> usize {
    results.iter().filter(|created| **created).count()
}
