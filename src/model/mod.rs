//! Seeded entities and the models persisting them
//!
//! Plain documents (messages, notifications) are written once under their own
//! id. Versioned documents (services, profiles, message and notification
//! statuses) are append-only: every version is a separate document whose id is
//! the model id followed by the zero-padded version number.

mod fiscal_code;
mod message;
mod notification;
mod profile;
mod service;
mod validate;

use std::marker::PhantomData;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;
use crate::store::DocumentStore;

pub use fiscal_code::{FiscalCode, InvalidFiscalCode};
pub use message::*;
pub use notification::*;
pub use profile::*;
pub use service::*;
pub use validate::{decode, DecodeReport, FieldError, Validate, Violations};

/// An entity stored as a JSON document
pub trait Document: Serialize + DeserializeOwned + Send + Sync {
    /// Collection the entity lives in
    const COLLECTION: &'static str;

    /// Human readable entity name used in error messages
    const ENTITY: &'static str;

    /// Value of the collection's partition key field
    fn partition_key(&self) -> &str;
}

/// A document written once under its own id
pub trait Identified: Document {
    fn id(&self) -> &str;
}

/// A document stored as a sequence of versions
pub trait VersionedDocument: Document + Clone {
    /// Id shared by every version of the entity
    fn model_id(&self) -> &str;
}

/// Id of a given version of a versioned entity
pub fn versioned_id(model_id: &str, version: u64) -> String {
    format!("{}-{:016}", model_id, version)
}

/// A stored version of an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Versioned<T> {
    pub id: String,
    pub version: u64,
    #[serde(flatten)]
    pub entity: T,
}

impl<T: VersionedDocument> Versioned<T> {
    fn new(entity: T, version: u64) -> Self {
        Self {
            id: versioned_id(entity.model_id(), version),
            version,
            entity,
        }
    }
}

/// Persists plain documents of type `T`
pub struct Model<'s, S: ?Sized, T> {
    store: &'s S,
    _entity: PhantomData<fn() -> T>,
}

impl<'s, S, T> Model<'s, S, T>
where
    S: DocumentStore + ?Sized,
    T: Identified,
{
    pub fn new(store: &'s S) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    /// Create the document, failing if its id is taken
    pub async fn create(&self, entity: &T) -> Result<T, Error> {
        let document = serde_json::to_value(entity)?;
        let stored = self
            .store
            .create_document(T::COLLECTION, entity.partition_key(), document)
            .await
            .map_err(|e| Error::persistence(format!("create {}", T::ENTITY), e))?;
        tracing::debug!(collection = T::COLLECTION, id = entity.id(), "document created");
        Ok(serde_json::from_value(stored)?)
    }

    pub async fn find(&self, id: &str, partition_key: &str) -> Result<Option<T>, Error> {
        let found = self
            .store
            .read_document(T::COLLECTION, partition_key, id)
            .await
            .map_err(|e| Error::persistence(format!("read {}", T::ENTITY), e))?;
        found.map(from_document).transpose()
    }
}

/// Persists versioned documents of type `T`
pub struct VersionedModel<'s, S: ?Sized, T> {
    store: &'s S,
    _entity: PhantomData<fn() -> T>,
}

impl<'s, S, T> VersionedModel<'s, S, T>
where
    S: DocumentStore + ?Sized,
    T: VersionedDocument,
{
    pub fn new(store: &'s S) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    async fn write(&self, version: Versioned<T>, operation: &str) -> Result<Versioned<T>, Error> {
        let partition_key = version.entity.partition_key().to_string();
        let document = serde_json::to_value(&version)?;
        let stored = self
            .store
            .create_document(T::COLLECTION, &partition_key, document)
            .await
            .map_err(|e| Error::persistence(format!("{} {}", operation, T::ENTITY), e))?;
        tracing::debug!(collection = T::COLLECTION, id = %version.id, version = version.version, "version stored");
        from_document(stored)
    }

    /// Store the first version of an entity
    pub async fn create(&self, entity: T) -> Result<Versioned<T>, Error> {
        self.write(Versioned::new(entity, 0), "create").await
    }

    /// Store the next version with the same content
    ///
    /// The previous version stays in place; the store rejects the write if the
    /// next version already exists.
    pub async fn bump_version(&self, current: &Versioned<T>) -> Result<Versioned<T>, Error> {
        self.write(Versioned::new(current.entity.clone(), current.version + 1), "update")
            .await
    }

    /// Read a given version of an entity
    pub async fn find_version(
        &self,
        model_id: &str,
        partition_key: &str,
        version: u64,
    ) -> Result<Option<Versioned<T>>, Error> {
        let found = self
            .store
            .read_document(T::COLLECTION, partition_key, &versioned_id(model_id, version))
            .await
            .map_err(|e| Error::persistence(format!("read {}", T::ENTITY), e))?;
        found.map(from_document).transpose()
    }
}

fn from_document<D: DeserializeOwned>(document: Value) -> Result<D, Error> {
    Ok(serde_json::from_value(document)?)
}
