//! Cosmos DB operations through the SQL REST API

mod auth;
mod types;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::error::Error;
use crate::fetch::Fetch;
use crate::store::DocumentStore;

pub use auth::{http_date, resource_of, MasterKeySigner, API_VERSION};
pub use types::*;

/// Client for a Cosmos DB account (or the local emulator)
#[derive(Clone)]
pub struct CosmosClient {
    /// The account endpoint, without trailing slash
    endpoint: String,

    /// Request signer holding the master key
    signer: MasterKeySigner,

    /// HTTP client
    client: Client,
}

/// Client for a single database of the account
#[derive(Clone)]
pub struct DatabaseClient {
    cosmos: CosmosClient,
    id: String,
}

impl CosmosClient {
    /// Create a new CosmosClient
    pub fn new(endpoint: &str, master_key: &str, client: Client) -> Result<Self, Error> {
        let endpoint = url::Url::parse(endpoint)?;
        Ok(Self {
            endpoint: endpoint.as_str().trim_end_matches('/').to_string(),
            signer: MasterKeySigner::new(master_key)?,
            client,
        })
    }

    /// Get the URL for a resource path
    fn get_url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    /// Get a client for a specific database
    pub fn database(&self, id: &str) -> DatabaseClient {
        DatabaseClient {
            cosmos: self.clone(),
            id: id.to_string(),
        }
    }

    /// Create a database unless it exists
    ///
    /// Returns whether the database was newly created.
    pub async fn create_database_if_not_exists(&self, id: &str) -> Result<bool, Error> {
        let url = self.get_url("/dbs");

        Fetch::post(&self.client, &url)
            .header("Accept", "application/json")?
            .json(&DatabaseDefinition { id })?
            .execute_create(&self.signer)
            .await
    }
}

impl DatabaseClient {
    /// The database id
    pub fn id(&self) -> &str {
        &self.id
    }

    fn collection_url(&self, collection: &str) -> String {
        self.cosmos
            .get_url(&format!("/dbs/{}/colls/{}", self.id, collection))
    }

    /// Create a collection unless it exists
    ///
    /// Returns whether the collection was newly created.
    pub async fn create_collection_if_not_exists(&self, definition: &CollectionDefinition) -> Result<bool, Error> {
        definition.validate().map_err(Error::InvalidDefinition)?;
        let url = self.cosmos.get_url(&format!("/dbs/{}/colls", self.id));

        Fetch::post(&self.cosmos.client, &url)
            .header("Accept", "application/json")?
            .json(definition)?
            .execute_create(&self.cosmos.signer)
            .await
    }

    /// Create a document in a collection
    ///
    /// A document with the same id in the same partition is rejected with
    /// 409 Conflict.
    pub async fn create_document(&self, collection: &str, partition_key: &str, document: &Value) -> Result<Value, Error> {
        let url = format!("{}/docs", self.collection_url(collection));

        Fetch::post(&self.cosmos.client, &url)
            .header("Accept", "application/json")?
            .header("x-ms-documentdb-partitionkey", &partition_key_header(partition_key)?)?
            .json(document)?
            .execute(&self.cosmos.signer)
            .await
    }

    /// Read a document by id, `None` when it does not exist
    pub async fn read_document(&self, collection: &str, partition_key: &str, id: &str) -> Result<Option<Value>, Error> {
        let url = format!("{}/docs/{}", self.collection_url(collection), id);

        let result = Fetch::get(&self.cosmos.client, &url)
            .header("Accept", "application/json")?
            .header("x-ms-documentdb-partitionkey", &partition_key_header(partition_key)?)?
            .execute::<Value>(&self.cosmos.signer)
            .await;

        match result {
            Ok(document) => Ok(Some(document)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }
}

/// Partition key header value: a JSON array holding the key
fn partition_key_header(partition_key: &str) -> Result<String, Error> {
    Ok(serde_json::to_string(&[partition_key])?)
}

#[async_trait]
impl DocumentStore for DatabaseClient {
    async fn create_document(&self, collection: &str, partition_key: &str, document: Value) -> Result<Value, Error> {
        DatabaseClient::create_document(self, collection, partition_key, &document).await
    }

    async fn read_document(&self, collection: &str, partition_key: &str, id: &str) -> Result<Option<Value>, Error> {
        DatabaseClient::read_document(self, collection, partition_key, id).await
    }
}
