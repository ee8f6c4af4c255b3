//! Table service

use reqwest::Client;
use serde::Serialize;

use crate::error::Error;
use crate::fetch::Fetch;

use super::auth::{SharedKeyScheme, SharedKeySigner};
use super::StorageAccount;

#[derive(Serialize)]
struct TableDefinition<'a> {
    #[serde(rename = "TableName")]
    table_name: &'a str,
}

/// Client for the Table service of a storage account
#[derive(Clone)]
pub struct TableServiceClient {
    endpoint: String,
    signer: SharedKeySigner,
    client: Client,
}

impl TableServiceClient {
    /// Create a new TableServiceClient
    pub fn new(account: &StorageAccount, client: Client) -> Result<Self, Error> {
        Ok(Self {
            endpoint: account.table_endpoint.clone(),
            signer: SharedKeySigner::new(&account.account_name, &account.account_key, SharedKeyScheme::Table)?,
            client,
        })
    }

    /// Create a table unless it exists
    ///
    /// `409 TableAlreadyExists` counts as success.
    pub async fn create_table_if_not_exists(&self, table: &str) -> Result<bool, Error> {
        let url = format!("{}/Tables", self.endpoint);

        Fetch::post(&self.client, &url)
            .header("Accept", "application/json;odata=nometadata")?
            .header("DataServiceVersion", "3.0;NetFx")?
            .header("MaxDataServiceVersion", "3.0;NetFx")?
            .json(&TableDefinition { table_name: table })?
            .execute_create(&self.signer)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_create_table_if_not_exists() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/devstoreaccount1/Tables"))
            .and(body_json(json!({ "TableName": "ValidationTokens" })))
            .and(header("DataServiceVersion", "3.0;NetFx"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "TableName": "ValidationTokens" })))
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/devstoreaccount1/Tables"))
            .and(body_json(json!({ "TableName": "uniqueEmails" })))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "odata.error": { "code": "TableAlreadyExists" }
            })))
            .mount(&mock_server)
            .await;

        let account = StorageAccount {
            table_endpoint: format!("{}/devstoreaccount1", mock_server.uri()),
            ..StorageAccount::development()
        };
        let tables = TableServiceClient::new(&account, Client::new()).unwrap();

        assert!(tables.create_table_if_not_exists("ValidationTokens").await.unwrap());
        assert!(!tables.create_table_if_not_exists("uniqueEmails").await.unwrap());
    }
}
