//! Storage account connection strings

use std::fmt;

use crate::error::Error;

/// Account name of the local storage emulator
pub const DEV_ACCOUNT_NAME: &str = "devstoreaccount1";

/// Well-known key of the local storage emulator
pub const DEV_ACCOUNT_KEY: &str =
    "Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==";

/// Account credentials and service endpoints parsed from a connection string
#[derive(Clone, PartialEq, Eq)]
pub struct StorageAccount {
    pub account_name: String,
    pub account_key: String,
    pub blob_endpoint: String,
    pub queue_endpoint: String,
    pub table_endpoint: String,
}

impl fmt::Debug for StorageAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageAccount")
            .field("account_name", &self.account_name)
            .field("account_key", &"<redacted>")
            .field("blob_endpoint", &self.blob_endpoint)
            .field("queue_endpoint", &self.queue_endpoint)
            .field("table_endpoint", &self.table_endpoint)
            .finish()
    }
}

impl StorageAccount {
    /// The local emulator account
    pub fn development() -> Self {
        Self {
            account_name: DEV_ACCOUNT_NAME.to_string(),
            account_key: DEV_ACCOUNT_KEY.to_string(),
            blob_endpoint: format!("http://127.0.0.1:10000/{}", DEV_ACCOUNT_NAME),
            queue_endpoint: format!("http://127.0.0.1:10001/{}", DEV_ACCOUNT_NAME),
            table_endpoint: format!("http://127.0.0.1:10002/{}", DEV_ACCOUNT_NAME),
        }
    }

    /// Parse a `Key=Value;Key=Value` connection string
    ///
    /// Explicit `*Endpoint` entries win over endpoints derived from
    /// `DefaultEndpointsProtocol`, `AccountName` and `EndpointSuffix`.
    pub fn from_connection_string(connection_string: &str) -> Result<Self, Error> {
        let mut protocol = "https".to_string();
        let mut suffix = "core.windows.net".to_string();
        let mut account_name = None;
        let mut account_key = None;
        let mut blob_endpoint = None;
        let mut queue_endpoint = None;
        let mut table_endpoint = None;
        let mut development = false;

        for pair in connection_string.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| Error::config("malformed storage connection string: expected Key=Value entries"))?;
            let value = value.trim().to_string();
            match key.trim().to_ascii_lowercase().as_str() {
                "usedevelopmentstorage" => development = value.eq_ignore_ascii_case("true"),
                "defaultendpointsprotocol" => protocol = value,
                "endpointsuffix" => suffix = value,
                "accountname" => account_name = Some(value),
                "accountkey" => account_key = Some(value),
                "blobendpoint" => blob_endpoint = Some(value),
                "queueendpoint" => queue_endpoint = Some(value),
                "tableendpoint" => table_endpoint = Some(value),
                _ => {}
            }
        }

        if development {
            return Ok(Self::development());
        }

        let account_name = account_name
            .filter(|n| !n.is_empty())
            .ok_or_else(|| Error::config("storage connection string has no AccountName"))?;
        let account_key = account_key
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::config("storage connection string has no AccountKey"))?;

        let derived = |service: &str| format!("{}://{}.{}.{}", protocol, account_name, service, suffix);

        let account = Self {
            blob_endpoint: trim_endpoint(blob_endpoint.unwrap_or_else(|| derived("blob"))),
            queue_endpoint: trim_endpoint(queue_endpoint.unwrap_or_else(|| derived("queue"))),
            table_endpoint: trim_endpoint(table_endpoint.unwrap_or_else(|| derived("table"))),
            account_name,
            account_key,
        };

        for endpoint in [&account.blob_endpoint, &account.queue_endpoint, &account.table_endpoint] {
            url::Url::parse(endpoint)
                .map_err(|e| Error::config(format!("invalid storage endpoint {}: {}", endpoint, e)))?;
        }

        Ok(account)
    }
}

fn trim_endpoint(endpoint: String) -> String {
    endpoint.trim_end_matches('/').to_string()
}
