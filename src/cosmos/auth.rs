//! Master key request signing

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::{header::HeaderValue, Method, Request};
use sha2::Sha256;

use crate::error::Error;
use crate::fetch::Signer;

/// REST API version sent with every request
pub const API_VERSION: &str = "2018-12-31";

/// Signs requests with the account master key
#[derive(Clone)]
pub struct MasterKeySigner {
    key: Arc<[u8]>,
}

impl MasterKeySigner {
    /// Create a signer from the base64 encoded master key
    pub fn new(master_key: &str) -> Result<Self, Error> {
        let key = BASE64
            .decode(master_key.trim())
            .map_err(|e| Error::credentials(format!("Cosmos DB key is not valid base64: {}", e)))?;
        if key.is_empty() {
            return Err(Error::credentials("Cosmos DB key is empty"));
        }
        Ok(Self { key: key.into() })
    }

    /// Compute the `authorization` header value
    pub fn authorization_token(
        &self,
        verb: &Method,
        resource_type: &str,
        resource_link: &str,
        date: &str,
    ) -> Result<String, Error> {
        let payload = format!(
            "{}\n{}\n{}\n{}\n\n",
            verb.as_str().to_lowercase(),
            resource_type.to_lowercase(),
            resource_link,
            date.to_lowercase()
        );
        let mut mac = Hmac::<Sha256>::new_from_slice(&self.key)
            .map_err(|e| Error::credentials(format!("unusable Cosmos DB key: {}", e)))?;
        mac.update(payload.as_bytes());
        let signature = BASE64.encode(mac.finalize().into_bytes());

        Ok(urlencoding::encode(&format!("type=master&ver=1.0&sig={}", signature)).into_owned())
    }
}

impl Signer for MasterKeySigner {
    fn sign(&self, request: &mut Request) -> Result<(), Error> {
        let date = http_date(Utc::now());
        let (resource_type, resource_link) = resource_of(request.url().path());
        let token = self.authorization_token(request.method(), &resource_type, &resource_link, &date)?;

        let headers = request.headers_mut();
        headers.insert("x-ms-date", header_value(&date)?);
        headers.insert("x-ms-version", HeaderValue::from_static(API_VERSION));
        headers.insert("authorization", header_value(&token)?);
        Ok(())
    }
}

fn header_value(value: &str) -> Result<HeaderValue, Error> {
    HeaderValue::from_str(value).map_err(|e| Error::credentials(format!("invalid header value: {}", e)))
}

/// RFC 1123 date as expected by `x-ms-date`
pub fn http_date(now: DateTime<Utc>) -> String {
    now.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Resource type and resource link addressed by a request path
///
/// Feeds (`/dbs`, `/dbs/{db}/colls`) are typed by their last segment and
/// linked to their parent; items (`/dbs/{db}`) are typed by their parent feed
/// and linked to themselves.
pub fn resource_of(path: &str) -> (String, String) {
    let segments: Vec<String> = path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| {
            urlencoding::decode(s)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| s.to_string())
        })
        .collect();

    match segments.len() {
        0 => (String::new(), String::new()),
        n if n % 2 == 1 => (segments[n - 1].clone(), segments[..n - 1].join("/")),
        n => (segments[n - 2].clone(), segments.join("/")),
    }
}
