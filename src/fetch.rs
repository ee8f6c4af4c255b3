//! HTTP request abstraction shared by the Cosmos DB and Storage clients
//!
//! Every REST surface the seeder talks to authenticates by signing the final
//! request (method, URL, headers, body length), so requests are built into a
//! [`reqwest::Request`] first and handed to a [`Signer`] right before sending.

use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Client, Method, Request, Response, StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};
use url::Url;

use crate::error::Error;

/// Adds authentication headers to a fully built request
pub trait Signer: Send + Sync {
    /// Sign the request in place
    fn sign(&self, request: &mut Request) -> Result<(), Error>;
}

/// Helper for building and executing signed HTTP requests
pub struct FetchBuilder<'a> {
    client: &'a Client,
    url: String,
    method: Method,
    headers: HeaderMap,
    query_params: Vec<(String, String)>,
    body: Option<Vec<u8>>,
}

impl<'a> FetchBuilder<'a> {
    /// Create a new FetchBuilder
    pub fn new(client: &'a Client, url: &str, method: Method) -> Self {
        Self {
            client,
            url: url.to_string(),
            method,
            headers: HeaderMap::new(),
            query_params: Vec::new(),
            body: None,
        }
    }

    /// Add a header to the request
    ///
    /// Names or values that are not valid HTTP tokens are rejected.
    pub fn header(mut self, name: &str, value: &str) -> Result<Self, Error> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::config(format!("invalid header name {}: {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| Error::config(format!("invalid value for header {}: {}", name, e)))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Append a query parameter to the request
    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query_params.push((key.to_string(), value.to_string()));
        self
    }

    /// Add a JSON body to the request
    pub fn json<T: Serialize + ?Sized>(self, body: &T) -> Result<Self, Error> {
        let json = serde_json::to_vec(body)?;
        self.body(json, "application/json")
    }

    /// Add a raw body with the given content type
    pub fn body(mut self, body: Vec<u8>, content_type: &str) -> Result<Self, Error> {
        self.body = Some(body);
        self.header("Content-Type", content_type)
    }

    /// Build the request
    fn build(&self) -> Result<Request, Error> {
        let mut url = Url::parse(&self.url)?;

        if !self.query_params.is_empty() {
            let mut query_pairs = url.query_pairs_mut();
            for (key, value) in &self.query_params {
                query_pairs.append_pair(key, value);
            }
        }

        let mut req = self.client.request(self.method.clone(), url);
        req = req.headers(self.headers.clone());

        if let Some(body) = &self.body {
            req = req.body(body.clone());
        }

        Ok(req.build()?)
    }

    /// Sign and send the request, returning the raw response
    pub async fn execute_raw(&self, signer: &dyn Signer) -> Result<Response, Error> {
        let mut req = self.build()?;
        signer.sign(&mut req)?;
        tracing::trace!(method = %req.method(), url = %req.url(), "sending request");
        let response = self.client.execute(req).await?;
        Ok(response)
    }

    /// Execute the request and parse the response as JSON
    pub async fn execute<T: DeserializeOwned>(&self, signer: &dyn Signer) -> Result<T, Error> {
        let response = self.execute_raw(signer).await?;
        let response = error_for_status(response).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Execute the request and discard a successful response body
    pub async fn execute_empty(&self, signer: &dyn Signer) -> Result<(), Error> {
        let response = self.execute_raw(signer).await?;
        error_for_status(response).await?;
        Ok(())
    }

    /// Execute a create-if-not-exists request
    ///
    /// Returns `true` when the resource was created and `false` when the
    /// service reports it already exists (409, or 204 for queues).
    pub async fn execute_create(&self, signer: &dyn Signer) -> Result<bool, Error> {
        let response = self.execute_raw(signer).await?;
        match response.status() {
            StatusCode::CONFLICT | StatusCode::NO_CONTENT => Ok(false),
            status if status.is_success() => Ok(true),
            _ => error_for_status(response).await.map(|_| false),
        }
    }
}

/// Turn a non-success response into [`Error::Api`] carrying the body text
pub(crate) async fn error_for_status(response: Response) -> Result<Response, Error> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let message = response.text().await?;
    Err(Error::Api { status, message })
}

/// Helper for creating HTTP requests
pub struct Fetch;

impl Fetch {
    /// Create a GET request
    pub fn get<'a>(client: &'a Client, url: &str) -> FetchBuilder<'a> {
        FetchBuilder::new(client, url, Method::GET)
    }

    /// Create a POST request
    pub fn post<'a>(client: &'a Client, url: &str) -> FetchBuilder<'a> {
        FetchBuilder::new(client, url, Method::POST)
    }

    /// Create a PUT request
    pub fn put<'a>(client: &'a Client, url: &str) -> FetchBuilder<'a> {
        FetchBuilder::new(client, url, Method::PUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct StaticSigner;

    impl Signer for StaticSigner {
        fn sign(&self, request: &mut Request) -> Result<(), Error> {
            request
                .headers_mut()
                .insert("authorization", HeaderValue::from_static("signed"));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_execute_create_maps_conflict_to_existing() {
        let mock_server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/things/a"))
            .and(header("authorization", "signed"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&mock_server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/things/b"))
            .respond_with(ResponseTemplate::new(409).set_body_string("already there"))
            .mount(&mock_server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/things/c"))
            .respond_with(ResponseTemplate::new(403).set_body_string("bad signature"))
            .mount(&mock_server)
            .await;

        let client = Client::new();
        let base = mock_server.uri();

        let created = Fetch::put(&client, &format!("{}/things/a", base))
            .execute_create(&StaticSigner)
            .await;
        assert!(created.unwrap());

        let existing = Fetch::put(&client, &format!("{}/things/b", base))
            .execute_create(&StaticSigner)
            .await;
        assert!(!existing.unwrap());

        let rejected = Fetch::put(&client, &format!("{}/things/c", base))
            .execute_create(&StaticSigner)
            .await;
        match rejected {
            Err(Error::Api { status, message }) => {
                assert_eq!(status, StatusCode::FORBIDDEN);
                assert_eq!(message, "bad signature");
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_execute_sends_query_and_json_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/echo"))
            .and(query_param("restype", "container"))
            .and(header("content-type", "application/json"))
            .respond_with(|req: &wiremock::Request| {
                ResponseTemplate::new(200).set_body_bytes(req.body.clone())
            })
            .mount(&mock_server)
            .await;

        let client = Client::new();
        let echoed: serde_json::Value = Fetch::post(&client, &format!("{}/echo", mock_server.uri()))
            .query("restype", "container")
            .json(&serde_json::json!({ "id": "abc" }))
            .unwrap()
            .execute(&StaticSigner)
            .await
            .unwrap();

        assert_eq!(echoed["id"], "abc");
    }

    #[test]
    fn test_invalid_header_value_is_rejected() {
        let client = Client::new();
        let result = Fetch::get(&client, "http://localhost/").header("x-ms-date", "bad\nvalue");
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
