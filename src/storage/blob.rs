//! Blob service: containers and block blobs

use async_trait::async_trait;
use reqwest::Client;

use crate::error::Error;
use crate::fetch::Fetch;
use crate::store::BlobStore;

use super::auth::{SharedKeyScheme, SharedKeySigner};
use super::StorageAccount;

/// Client for the Blob service of a storage account
#[derive(Clone)]
pub struct BlobServiceClient {
    endpoint: String,
    signer: SharedKeySigner,
    client: Client,
}

impl BlobServiceClient {
    /// Create a new BlobServiceClient
    pub fn new(account: &StorageAccount, client: Client) -> Result<Self, Error> {
        Ok(Self {
            endpoint: account.blob_endpoint.clone(),
            signer: SharedKeySigner::new(&account.account_name, &account.account_key, SharedKeyScheme::BlobQueue)?,
            client,
        })
    }

    /// Create a container unless it exists
    ///
    /// Returns whether the container was newly created.
    pub async fn create_container_if_not_exists(&self, container: &str) -> Result<bool, Error> {
        let url = format!("{}/{}", self.endpoint, container);

        Fetch::put(&self.client, &url)
            .query("restype", "container")
            .execute_create(&self.signer)
            .await
    }

    /// Upload a block blob, replacing any previous content
    pub async fn upload(&self, container: &str, name: &str, content_type: &str, body: Vec<u8>) -> Result<(), Error> {
        let url = format!("{}/{}/{}", self.endpoint, container, name);

        Fetch::put(&self.client, &url)
            .header("x-ms-blob-type", "BlockBlob")?
            .body(body, content_type)?
            .execute_empty(&self.signer)
            .await
    }
}

#[async_trait]
impl BlobStore for BlobServiceClient {
    async fn put_blob(&self, container: &str, name: &str, content_type: &str, body: Vec<u8>) -> Result<(), Error> {
        self.upload(container, name, content_type, body).await
    }
}
