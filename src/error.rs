//! Error handling for the seeding utility

use std::fmt;
use reqwest::StatusCode;
use thiserror::Error;

use crate::model::DecodeReport;

/// Unified error type for provisioning and seeding
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP related errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Missing or malformed configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Account keys that cannot be used for request signing
    #[error("Invalid credentials: {0}")]
    Credentials(String),

    /// A resource definition the backing service would reject
    #[error("Invalid resource definition: {0}")]
    InvalidDefinition(String),

    /// Non-success response returned by the emulator or the cloud service
    #[error("Request failed with status {status}: {message}")]
    Api {
        status: StatusCode,
        message: String,
    },

    /// A create-if-not-exists call rejected for a reason other than "already exists"
    #[error("Cannot create {resource}: {source}")]
    Provision {
        resource: String,
        #[source]
        source: Box<Error>,
    },

    /// A fixture payload did not satisfy its schema
    #[error(transparent)]
    Decode(#[from] DecodeReport),

    /// A create, update or store call rejected by the backing store
    #[error("Cannot {operation}: {source}")]
    Persistence {
        operation: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a new configuration error
    pub fn config<T: fmt::Display>(msg: T) -> Self {
        Error::Config(msg.to_string())
    }

    /// Create a new credentials error
    pub fn credentials<T: fmt::Display>(msg: T) -> Self {
        Error::Credentials(msg.to_string())
    }

    /// Wrap an error raised while provisioning the named resource
    pub fn provision<T: fmt::Display>(resource: T, source: Error) -> Self {
        Error::Provision {
            resource: resource.to_string(),
            source: Box::new(source),
        }
    }

    /// Wrap an error raised while persisting a fixture
    pub fn persistence<T: fmt::Display>(operation: T, source: Error) -> Self {
        Error::Persistence {
            operation: operation.to_string(),
            source: Box::new(source),
        }
    }

    /// HTTP status of the underlying API failure, if any
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Http(err) => err.status(),
            Error::Provision { source, .. } | Error::Persistence { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Whether the service answered 409 Conflict
    pub fn is_conflict(&self) -> bool {
        self.status() == Some(StatusCode::CONFLICT)
    }

    /// Whether the service answered 404 Not Found
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}
