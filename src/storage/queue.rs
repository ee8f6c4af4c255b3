//! Queue service

use reqwest::Client;

use crate::error::Error;
use crate::fetch::Fetch;

use super::auth::{SharedKeyScheme, SharedKeySigner};
use super::StorageAccount;

/// Client for the Queue service of a storage account
#[derive(Clone)]
pub struct QueueServiceClient {
    endpoint: String,
    signer: SharedKeySigner,
    client: Client,
}

impl QueueServiceClient {
    /// Create a new QueueServiceClient
    pub fn new(account: &StorageAccount, client: Client) -> Result<Self, Error> {
        Ok(Self {
            endpoint: account.queue_endpoint.clone(),
            signer: SharedKeySigner::new(&account.account_name, &account.account_key, SharedKeyScheme::BlobQueue)?,
            client,
        })
    }

    /// Create a queue unless it exists
    ///
    /// The service answers 204 (same metadata) or 409 for existing queues;
    /// both count as "already exists".
    pub async fn create_queue_if_not_exists(&self, queue: &str) -> Result<bool, Error> {
        let url = format!("{}/{}", self.endpoint, queue);

        Fetch::put(&self.client, &url)
            .execute_create(&self.signer)
            .await
    }
}
