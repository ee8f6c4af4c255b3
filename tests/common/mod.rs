#![allow(dead_code)]

use devseed::config::{ConnectionSettings, SeedOptions};
use devseed::storage::{DEV_ACCOUNT_KEY, DEV_ACCOUNT_NAME};
use devseed::DevEnvironment;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Well-known key of the Cosmos DB emulator
pub const COSMOS_KEY: &str =
    "C2y6yDjf5/R+ob0N8A7Cgv30VRDJIWEHLM+4QDU5DE2nQ9nDuVTqobD4b8mGGyPMbIZnqyMsEcaGQy67XIw/Jw==";

pub const DATABASE: &str = "devdb";

/// One mock server per emulated endpoint
pub struct Emulators {
    pub cosmos: MockServer,
    pub blob: MockServer,
    pub queue: MockServer,
    pub table: MockServer,
}

impl Emulators {
    pub async fn start() -> Self {
        Self {
            cosmos: MockServer::start().await,
            blob: MockServer::start().await,
            queue: MockServer::start().await,
            table: MockServer::start().await,
        }
    }

    pub fn settings(&self) -> ConnectionSettings {
        self.settings_with_storage_key(DEV_ACCOUNT_KEY)
    }

    pub fn settings_with_storage_key(&self, key: &str) -> ConnectionSettings {
        ConnectionSettings {
            cosmos_key: COSMOS_KEY.to_string(),
            cosmos_uri: self.cosmos.uri(),
            database_name: DATABASE.to_string(),
            storage_connection_string: format!(
                "DefaultEndpointsProtocol=http;AccountName={account};AccountKey={key};\
                 BlobEndpoint={blob}/{account};QueueEndpoint={queue}/{account};TableEndpoint={table}/{account};",
                account = DEV_ACCOUNT_NAME,
                key = key,
                blob = self.blob.uri(),
                queue = self.queue.uri(),
                table = self.table.uri(),
            ),
        }
    }

    pub fn connect(&self, options: &SeedOptions) -> DevEnvironment {
        DevEnvironment::connect(&self.settings(), options).unwrap()
    }

    /// Answer every create-if-not-exists call with 201
    pub async fn accept_provisioning(&self) {
        Mock::given(method("POST"))
            .and(path("/dbs"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&self.cosmos)
            .await;
        Mock::given(method("POST"))
            .and(path(format!("/dbs/{}/colls", DATABASE)))
            .respond_with(ResponseTemplate::new(201))
            .mount(&self.cosmos)
            .await;
        Mock::given(method("PUT"))
            .and(path_regex(r"^/devstoreaccount1/[^/]+$"))
            .and(query_param("restype", "container"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&self.blob)
            .await;
        Mock::given(method("PUT"))
            .and(path_regex(r"^/devstoreaccount1/[^/]+$"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&self.queue)
            .await;
        Mock::given(method("POST"))
            .and(path("/devstoreaccount1/Tables"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&self.table)
            .await;
    }

    /// Store documents of `collection`, expecting exactly `times` writes
    pub async fn expect_documents(&self, collection: &str, times: u64) {
        Mock::given(method("POST"))
            .and(path(format!("/dbs/{}/colls/{}/docs", DATABASE, collection)))
            .respond_with(echo_created)
            .expect(times)
            .named(format!("{} documents", collection))
            .mount(&self.cosmos)
            .await;
    }
}

/// Echo the request body back, as the service returns the stored document
pub fn echo_created(req: &Request) -> ResponseTemplate {
    ResponseTemplate::new(201).set_body_bytes(req.body.clone())
}
