//! Shared Key request signing for the Blob, Queue and Table services

use std::collections::BTreeMap;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::{header::HeaderValue, Request};
use sha2::Sha256;

use crate::cosmos::http_date;
use crate::error::Error;
use crate::fetch::Signer;

/// Storage REST API version sent with every request
pub const STORAGE_API_VERSION: &str = "2020-10-02";

/// String-to-sign layout, which differs between services
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharedKeyScheme {
    /// Blob and Queue services
    BlobQueue,

    /// Table service
    Table,
}

/// Signs requests with the storage account key
#[derive(Clone)]
pub struct SharedKeySigner {
    account: String,
    key: Arc<[u8]>,
    scheme: SharedKeyScheme,
}

impl SharedKeySigner {
    /// Create a signer from the base64 encoded account key
    pub fn new(account: &str, account_key: &str, scheme: SharedKeyScheme) -> Result<Self, Error> {
        let key = BASE64
            .decode(account_key.trim())
            .map_err(|e| Error::credentials(format!("storage account key is not valid base64: {}", e)))?;
        Ok(Self {
            account: account.to_string(),
            key: key.into(),
            scheme,
        })
    }

    /// Build the string-to-sign for a request carrying its `x-ms-*` headers
    pub fn string_to_sign(&self, request: &Request) -> String {
        match self.scheme {
            SharedKeyScheme::BlobQueue => self.blob_queue_string(request),
            SharedKeyScheme::Table => self.table_string(request),
        }
    }

    fn blob_queue_string(&self, request: &Request) -> String {
        let content_length = request
            .body()
            .and_then(|body| body.as_bytes())
            .map(|bytes| bytes.len())
            .filter(|len| *len > 0)
            .map(|len| len.to_string())
            .unwrap_or_default();

        let standard = [
            request.method().as_str().to_string(),
            header(request, "content-encoding"),
            header(request, "content-language"),
            content_length,
            header(request, "content-md5"),
            header(request, "content-type"),
            header(request, "date"),
            header(request, "if-modified-since"),
            header(request, "if-match"),
            header(request, "if-none-match"),
            header(request, "if-unmodified-since"),
            header(request, "range"),
        ];

        let mut canonical_headers: Vec<(&str, String)> = request
            .headers()
            .iter()
            .filter(|(name, _)| name.as_str().starts_with("x-ms-"))
            .map(|(name, value)| (name.as_str(), value.to_str().unwrap_or_default().trim().to_string()))
            .collect();
        canonical_headers.sort();
        let canonical_headers: String = canonical_headers
            .into_iter()
            .map(|(name, value)| format!("{}:{}\n", name, value))
            .collect();

        let mut resource = format!("/{}{}", self.account, request.url().path());
        let mut params: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, value) in request.url().query_pairs() {
            params
                .entry(name.to_lowercase())
                .or_default()
                .push(value.into_owned());
        }
        for (name, mut values) in params {
            values.sort();
            resource.push_str(&format!("\n{}:{}", name, values.join(",")));
        }

        format!("{}\n{}{}", standard.join("\n"), canonical_headers, resource)
    }

    fn table_string(&self, request: &Request) -> String {
        let mut resource = format!("/{}{}", self.account, request.url().path());
        if let Some((_, comp)) = request.url().query_pairs().find(|(name, _)| name == "comp") {
            resource.push_str(&format!("?comp={}", comp));
        }

        format!(
            "{}\n{}\n{}\n{}\n{}",
            request.method().as_str(),
            header(request, "content-md5"),
            header(request, "content-type"),
            header(request, "x-ms-date"),
            resource
        )
    }

    /// Base64 HMAC-SHA256 of the string-to-sign
    pub fn signature(&self, string_to_sign: &str) -> Result<String, Error> {
        let mut mac = Hmac::<Sha256>::new_from_slice(&self.key)
            .map_err(|e| Error::credentials(format!("unusable storage account key: {}", e)))?;
        mac.update(string_to_sign.as_bytes());
        Ok(BASE64.encode(mac.finalize().into_bytes()))
    }
}

impl Signer for SharedKeySigner {
    fn sign(&self, request: &mut Request) -> Result<(), Error> {
        let date = http_date(Utc::now());
        let headers = request.headers_mut();
        headers.insert("x-ms-date", header_value(&date)?);
        headers.insert("x-ms-version", HeaderValue::from_static(STORAGE_API_VERSION));

        let signature = self.signature(&self.string_to_sign(request))?;
        let authorization = format!("SharedKey {}:{}", self.account, signature);
        request
            .headers_mut()
            .insert("authorization", header_value(&authorization)?);
        Ok(())
    }
}

fn header(request: &Request, name: &str) -> String {
    request
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn header_value(value: &str) -> Result<HeaderValue, Error> {
    HeaderValue::from_str(value).map_err(|e| Error::credentials(format!("invalid header value: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{DEV_ACCOUNT_KEY, DEV_ACCOUNT_NAME};
    use reqwest::Client;

    const DATE: &str = "Thu, 01 Jan 2026 00:00:00 GMT";

    fn signer(scheme: SharedKeyScheme) -> SharedKeySigner {
        SharedKeySigner::new(DEV_ACCOUNT_NAME, DEV_ACCOUNT_KEY, scheme).unwrap()
    }

    #[test]
    fn test_create_container_string_to_sign() {
        let request = Client::new()
            .put("http://127.0.0.1:10000/devstoreaccount1/message-content?restype=container")
            .header("x-ms-date", DATE)
            .header("x-ms-version", STORAGE_API_VERSION)
            .build()
            .unwrap();

        let signer = signer(SharedKeyScheme::BlobQueue);
        let string_to_sign = signer.string_to_sign(&request);
        assert_eq!(
            string_to_sign,
            "PUT\n\n\n\n\n\n\n\n\n\n\n\n\
             x-ms-date:Thu, 01 Jan 2026 00:00:00 GMT\n\
             x-ms-version:2020-10-02\n\
             /devstoreaccount1/devstoreaccount1/message-content\n\
             restype:container"
        );
        assert_eq!(
            signer.signature(&string_to_sign).unwrap(),
            "df/XqTg0jQXzhWOVmrzt2xRyxrK/WGAx4n1IOEn9CPc="
        );
    }

    #[test]
    fn test_put_blob_string_to_sign() {
        let request = Client::new()
            .put("http://127.0.0.1:10000/devstoreaccount1/message-content/01J.json")
            .header("content-type", "application/json")
            .header("x-ms-blob-type", "BlockBlob")
            .header("x-ms-version", STORAGE_API_VERSION)
            .header("x-ms-date", DATE)
            .body(r#"{"subject":"x"}"#)
            .build()
            .unwrap();

        let signer = signer(SharedKeyScheme::BlobQueue);
        let string_to_sign = signer.string_to_sign(&request);
        assert!(string_to_sign.starts_with("PUT\n\n\n15\n\napplication/json\n"));
        assert_eq!(
            signer.signature(&string_to_sign).unwrap(),
            "a/OBP2/oKj8/u39GfyjsA5lN66cLCCU1cyvPcWnGXh8="
        );
    }

    #[test]
    fn test_create_table_string_to_sign() {
        let request = Client::new()
            .post("http://127.0.0.1:10002/devstoreaccount1/Tables")
            .header("content-type", "application/json")
            .header("x-ms-date", DATE)
            .build()
            .unwrap();

        let signer = signer(SharedKeyScheme::Table);
        let string_to_sign = signer.string_to_sign(&request);
        assert_eq!(
            string_to_sign,
            "POST\n\napplication/json\nThu, 01 Jan 2026 00:00:00 GMT\n/devstoreaccount1/devstoreaccount1/Tables"
        );
        assert_eq!(
            signer.signature(&string_to_sign).unwrap(),
            "tGh19lYdEivMf2DOyUXB1wqFW10zPeIdtA7QlLcL/0Q="
        );
    }

    #[test]
    fn test_sign_sets_authorization() {
        let mut request = Client::new()
            .put("http://127.0.0.1:10001/devstoreaccount1/spidmsgitems")
            .build()
            .unwrap();

        signer(SharedKeyScheme::BlobQueue).sign(&mut request).unwrap();

        let authorization = request.headers()["authorization"].to_str().unwrap();
        assert!(authorization.starts_with("SharedKey devstoreaccount1:"));
        assert!(request.headers().contains_key("x-ms-date"));
        assert_eq!(request.headers()["x-ms-version"], STORAGE_API_VERSION);
    }
}
